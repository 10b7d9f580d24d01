mod accounts;
mod database;
mod settings;

pub use accounts::{AccountError, AccountService, AccountStore, FieldError, Registration};
pub use database::Database;
pub use settings::Settings;

/// Version of the local schema. There is no migration path; a different stored
/// version is reported as an error.
pub const SCHEMA_VERSION: &str = "1";
