//! Backup parsing: streaming XML event walker over SMS Backup & Restore dumps.

pub mod xml;

pub use xml::BackupParser;
