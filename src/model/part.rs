//! A single `part` element as read from the backup stream.

/// Raw attributes of one `part` element.
///
/// Both payload fields are optional because backups routinely contain
/// parts with neither (SMIL layout parts, delivery reports). Eligibility
/// and decoding are decided later, against the owning [`MessageContext`].
///
/// [`MessageContext`]: super::MessageContext
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartRecord {
    /// Base64-encoded payload from the `data` attribute.
    pub data: Option<String>,

    /// MIME type from the `ct` attribute, e.g. `image/jpeg`.
    pub content_type: Option<String>,

    /// Byte offset of the element inside the backup file, for log messages.
    pub offset: u64,
}

impl PartRecord {
    pub fn new(data: Option<String>, content_type: Option<String>, offset: u64) -> Self {
        Self {
            data,
            content_type,
            offset,
        }
    }
}
