/// User input for a QR code to generate
#[derive(Debug, Clone, Default)]
pub struct QrDraft {
    pub content: String,
    pub kind: String,
}

impl QrDraft {
    pub fn new(content: impl Into<String>, kind: impl Into<String>) -> Self {
        Self { content: content.into(), kind: kind.into() }
    }

    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }

    /// Text that actually gets encoded into the symbol
    pub fn payload(&self) -> String {
        let kind = if self.kind.trim().is_empty() { "N/A" } else { self.kind.as_str() };
        format!("Content: {}\nType: {}", self.content, kind)
    }
}

/// A generated QR code ready to be stored
#[derive(Debug, Clone)]
pub struct NewQrCode {
    pub content: String,
    pub kind: String,
    pub image: Vec<u8>,
}

/// A QR code row loaded from the local table
#[derive(Debug, Clone)]
pub struct SavedQrCode {
    pub id: i64,
    pub content: String,
    pub kind: String,
    /// PNG bytes
    pub image: Vec<u8>,
    pub created_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_with_kind() {
        let draft = QrDraft::new("https://example.com", "URL");
        assert_eq!(draft.payload(), "Content: https://example.com\nType: URL");
    }

    #[test]
    fn test_payload_blank_kind() {
        let draft = QrDraft::new("hello", "  ");
        assert_eq!(draft.payload(), "Content: hello\nType: N/A");
    }

    #[test]
    fn test_blank_content() {
        assert!(QrDraft::new("   ", "Text").is_blank());
        assert!(!QrDraft::new("x", "").is_blank());
    }
}
