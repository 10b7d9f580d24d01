use serde::{Deserialize, Serialize};

/// Account record as held by the account store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserData {
    pub name: String,
    pub email: String,
    pub place: String,
    /// Argon2id PHC string
    pub password_hash: String,
}

/// Store key for an email address.
///
/// The account store does not allow `.` in keys, so every dot becomes a comma.
pub fn account_key(email: &str) -> String {
    email.trim().replace('.', ",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_key() {
        assert_eq!(account_key("jane.doe@mail.example.com"), "jane,doe@mail,example,com");
        assert_eq!(account_key("  a@b.c "), "a@b,c");
    }
}
