//! Message-level context carried across the streamed parse.

/// Attributes of the most recently seen `mms` element.
///
/// Backup files list each message's `part` children after the `mms`
/// element that owns them, so the extractor keeps exactly one of these
/// alive at a time and reads it for every part until the next `mms`
/// replaces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageContext {
    /// Value of the `_id` attribute. Messages without one get `"unknown"`,
    /// which keeps their media extractable under a stable name.
    pub id: String,

    /// Value of the `contact_name` attribute, or `"unknown"` when the
    /// backup omits it. Used as the per-contact directory name.
    pub contact_name: String,

    /// Raw `date` attribute: milliseconds since the Unix epoch, as text.
    /// Kept unparsed here; validation happens per part so one bad
    /// timestamp only costs that message's media.
    pub date_ms: Option<String>,
}

impl MessageContext {
    /// Build a context from raw attribute values, applying the
    /// `"unknown"` fallbacks for missing identity fields.
    pub fn new(id: Option<String>, contact_name: Option<String>, date_ms: Option<String>) -> Self {
        Self {
            id: id.unwrap_or_else(|| "unknown".to_string()),
            contact_name: contact_name.unwrap_or_else(|| "unknown".to_string()),
            date_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_keeps_present_attributes() {
        let ctx = MessageContext::new(
            Some("42".into()),
            Some("Alice".into()),
            Some("1700000000000".into()),
        );
        assert_eq!(ctx.id, "42");
        assert_eq!(ctx.contact_name, "Alice");
        assert_eq!(ctx.date_ms.as_deref(), Some("1700000000000"));
    }

    #[test]
    fn test_new_defaults_missing_identity() {
        let ctx = MessageContext::new(None, None, None);
        assert_eq!(ctx.id, "unknown");
        assert_eq!(ctx.contact_name, "unknown");
        assert!(ctx.date_ms.is_none());
    }
}
