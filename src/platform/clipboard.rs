use super::{Clipboard, PlatformError};

/// System clipboard via arboard.
///
/// The handle is created on first use and kept alive afterwards: on X11 the
/// copied text is only served while the owning handle exists.
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clipboard for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), PlatformError> {
        if self.inner.is_none() {
            let clipboard =
                arboard::Clipboard::new().map_err(|e| PlatformError::Clipboard(e.to_string()))?;
            self.inner = Some(clipboard);
        }
        let Some(clipboard) = self.inner.as_mut() else {
            return Err(PlatformError::Clipboard("no clipboard handle".to_string()));
        };
        clipboard
            .set_text(text)
            .map_err(|e| PlatformError::Clipboard(e.to_string()))
    }
}
