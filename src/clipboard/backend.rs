use crate::error::CommandError;

/// Trait for clipboard backend abstraction
/// Reads what the clipboard currently offers and writes it back
/// either as image bytes or as plain text
pub trait ClipboardBackend: Send + Sync {
    /// List the mime types currently offered, in the owner's order
    fn list_mime_types(&self) -> Result<Vec<String>, CommandError>;

    /// Read the raw bytes of one offering
    fn read(&self, mime_type: &str) -> Result<Vec<u8>, CommandError>;

    /// Read the plain-text offering, surrounding whitespace trimmed
    fn read_text(&self) -> Result<String, CommandError>;

    /// Replace the clipboard with plain text
    fn write_text(&self, text: &str) -> Result<(), CommandError>;

    /// Replace the clipboard with binary data under the given mime type
    fn write_binary(&self, mime_type: &str, data: &[u8]) -> Result<(), CommandError>;

    /// Get the backend name (for logging/debugging)
    fn name(&self) -> &'static str;
}
