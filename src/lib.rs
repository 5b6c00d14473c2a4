//! `mmsrip`: extract images and videos from MMS XML backups.
//!
//! This crate provides the core library for streaming SMS Backup & Restore
//! XML dumps, correlating `part` payloads with their owning `mms` message,
//! and writing decoded media to per-contact directories.

pub mod config;
pub mod error;
pub mod extract;
pub mod mime;
pub mod model;
pub mod parser;
