//! Media extraction: part classification, base64 decoding, and the
//! filesystem sink, composed by the extract and scan drivers.

pub mod media;
pub mod sink;

pub use media::{
    extract_media, process_part, scan_media, ExtractReport, PartOutcome, ScanReport, SkipReason,
};
pub use sink::save_media_file;
