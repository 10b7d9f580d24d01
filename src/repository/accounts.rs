//! Account registration and login against a key-value account store.

use anyhow::Result;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;
use tracing::info;

use crate::model::{account_key, UserData};

const MIN_PASSWORD_LEN: usize = 6;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[A-Za-z0-9+._%\-]{1,256}@[A-Za-z0-9][A-Za-z0-9\-]{0,64}(\.[A-Za-z0-9][A-Za-z0-9\-]{0,25})+$",
    )
    .expect("email pattern is valid")
});

/// Remote key-value store holding one record per account
#[allow(async_fn_in_trait)]
pub trait AccountStore {
    async fn get_account(&self, key: &str) -> Result<Option<UserData>>;

    async fn put_account(&self, key: &str, user: &UserData) -> Result<()>;
}

/// A rejected form field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn join_fields(errors: &[FieldError]) -> String {
    errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("{}", join_fields(.0))]
    Invalid(Vec<FieldError>),

    #[error("account not found")]
    AccountNotFound,

    #[error("incorrect credentials")]
    IncorrectCredentials,

    #[error("an account with this email already exists")]
    AlreadyRegistered,

    #[error("password hashing failed: {0}")]
    Hash(String),

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// Registration form input
#[derive(Debug, Clone, Default)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub place: String,
    pub password: String,
}

impl Registration {
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if self.name.trim().is_empty() {
            errors.push(FieldError { field: "name", message: "Username is required." });
        }
        if let Some(message) = email_problem(&self.email) {
            errors.push(FieldError { field: "email", message });
        }
        if self.place.trim().is_empty() {
            errors.push(FieldError { field: "place", message: "Place is required." });
        }
        if self.password.trim().is_empty() {
            errors.push(FieldError { field: "password", message: "Password is required." });
        } else if self.password.chars().count() < MIN_PASSWORD_LEN {
            errors.push(FieldError {
                field: "password",
                message: "Password must be at least 6 characters long.",
            });
        }
        errors
    }
}

fn email_problem(email: &str) -> Option<&'static str> {
    let email = email.trim();
    if email.is_empty() {
        Some("Email is required.")
    } else if !EMAIL_PATTERN.is_match(email) {
        Some("Invalid email format.")
    } else {
        None
    }
}

fn hash_password(password: &str) -> Result<String, AccountError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AccountError::Hash(e.to_string()))
}

fn verify_password(password: &str, hash: &str) -> Result<bool, AccountError> {
    let parsed = PasswordHash::new(hash).map_err(|e| AccountError::Hash(e.to_string()))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AccountError::Hash(e.to_string())),
    }
}

/// Registration and login flows on top of an [`AccountStore`]
pub struct AccountService<'a, S> {
    store: &'a S,
}

impl<'a, S: AccountStore> AccountService<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub async fn register(&self, form: &Registration) -> Result<UserData, AccountError> {
        let errors = form.validate();
        if !errors.is_empty() {
            return Err(AccountError::Invalid(errors));
        }

        let key = account_key(&form.email);
        if self.store.get_account(&key).await?.is_some() {
            return Err(AccountError::AlreadyRegistered);
        }

        let user = UserData {
            name: form.name.trim().to_string(),
            email: form.email.trim().to_string(),
            place: form.place.trim().to_string(),
            password_hash: hash_password(&form.password)?,
        };
        self.store.put_account(&key, &user).await?;
        info!(email = %user.email, "account registered");
        Ok(user)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<UserData, AccountError> {
        let mut errors = Vec::new();
        if let Some(message) = email_problem(email) {
            errors.push(FieldError { field: "email", message });
        }
        if password.trim().is_empty() {
            errors.push(FieldError { field: "password", message: "Password is required." });
        }
        if !errors.is_empty() {
            return Err(AccountError::Invalid(errors));
        }

        let user = self
            .store
            .get_account(&account_key(email))
            .await?
            .ok_or(AccountError::AccountNotFound)?;

        if !verify_password(password, &user.password_hash)? {
            return Err(AccountError::IncorrectCredentials);
        }
        info!(email = %user.email, "logged in");
        Ok(user)
    }
}
