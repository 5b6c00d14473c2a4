//! Core data model types for MMS messages and their attachment parts.

pub mod message;
pub mod part;

pub use message::MessageContext;
pub use part::PartRecord;
