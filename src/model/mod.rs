mod account;
mod info;
mod qr_code;
mod scan;

pub use account::{account_key, UserData};
pub use info::InfoPage;
pub use qr_code::{NewQrCode, QrDraft, SavedQrCode};
pub use scan::{PresentationState, ScanResult};
