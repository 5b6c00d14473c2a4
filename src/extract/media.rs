//! Part classification, base64 decoding, and the extraction drivers.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use chrono::{Local, TimeZone};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::error::{MmsError, Result};
use crate::mime;
use crate::model::{MessageContext, PartRecord};
use crate::parser::BackupParser;

use super::sink;

/// Standard-alphabet engine that accepts both padded and unpadded payloads.
/// Backup tools disagree on trailing `=`, so padding is not enforced.
const MEDIA_B64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Why an otherwise eligible media part was not written to disk.
///
/// These are per-part conditions. They are reported and counted, and the
/// walk moves on to the next part.
#[derive(Error, Debug)]
pub enum SkipReason {
    /// The part appeared before any `mms` element established a context.
    #[error("part has no owning message")]
    NoContext,

    /// The owning message's `date` attribute is absent or not a usable
    /// epoch-milliseconds value.
    #[error("message date '{0}' is not a usable timestamp")]
    BadTimestamp(String),

    /// The payload is not decodable base64.
    #[error("base64 decode failed: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Result of processing a single `part` element.
#[derive(Debug)]
pub enum PartOutcome {
    /// Media decoded and written to disk.
    Saved { path: PathBuf, bytes: u64 },

    /// Eligible media that could not be saved; the run continues.
    Skipped(SkipReason),

    /// Not extractable media: no payload, or a content type outside
    /// image/video. Passed over without comment.
    Ineligible,
}

/// Summary of one extraction run.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ExtractReport {
    /// Number of `mms` elements seen.
    pub messages_seen: u64,

    /// Number of `part` elements visited.
    pub parts_seen: u64,

    /// Files written to disk.
    pub files_written: u64,

    /// Eligible parts skipped (bad date, bad base64, no owning message).
    pub parts_skipped: u64,

    /// Total decoded bytes written.
    pub bytes_written: u64,

    /// Files written per contact directory, sorted by contact name.
    pub contacts: BTreeMap<String, u64>,
}

/// Summary of a dry-run scan. Counts what an extraction would do
/// without decoding or writing anything.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ScanReport {
    /// Number of `mms` elements seen.
    pub messages: u64,

    /// Number of `part` elements visited.
    pub parts: u64,

    /// Parts carrying an extractable image/video payload.
    pub eligible_parts: u64,

    /// Approximate total decoded size of all eligible payloads.
    pub estimated_bytes: u64,

    /// Eligible parts per contact, sorted by contact name.
    pub contacts: BTreeMap<String, u64>,

    /// Earliest and latest message timestamps (raw milliseconds) among
    /// messages whose `date` attribute parses.
    pub date_range_ms: Option<(i64, i64)>,
}

/// Run a part through the classify/decode/persist pipeline.
///
/// Sink failures (directory creation, file write) are fatal and come
/// back as `Err`; everything else is expressed in the returned
/// [`PartOutcome`].
pub fn process_part(
    ctx: Option<&MessageContext>,
    record: &PartRecord,
    output_root: &Path,
) -> Result<PartOutcome> {
    let Some(data) = record.data.as_deref().filter(|d| !d.is_empty()) else {
        return Ok(PartOutcome::Ineligible);
    };
    let Some(content_type) = record.content_type.as_deref() else {
        return Ok(PartOutcome::Ineligible);
    };
    if !mime::is_media_type(content_type) {
        return Ok(PartOutcome::Ineligible);
    }

    let Some(ctx) = ctx else {
        return Ok(PartOutcome::Skipped(SkipReason::NoContext));
    };
    let Some(day) = format_day(ctx.date_ms.as_deref()) else {
        let raw = ctx.date_ms.clone().unwrap_or_default();
        return Ok(PartOutcome::Skipped(SkipReason::BadTimestamp(raw)));
    };

    let decoded = match MEDIA_B64.decode(data) {
        Ok(bytes) => bytes,
        Err(e) => return Ok(PartOutcome::Skipped(SkipReason::Base64(e))),
    };

    let file_name = format!("MMS_{day}_{}{}", ctx.id, mime::extension_for(content_type));
    let dir = output_root.join(&ctx.contact_name);
    let path = sink::save_media_file(&decoded, &dir, &file_name)?;

    Ok(PartOutcome::Saved {
        path,
        bytes: decoded.len() as u64,
    })
}

/// Extract all media from a backup file into `output_root`.
///
/// Creates `output_root` first, then walks the document once, writing
/// each eligible part as it is encountered. Per-part problems are
/// logged and counted; only source-file and sink I/O errors abort.
pub fn extract_media(
    xml_path: &Path,
    output_root: &Path,
    progress: Option<&dyn Fn(u64, u64)>,
) -> Result<ExtractReport> {
    std::fs::create_dir_all(output_root).map_err(|e| MmsError::io(output_root, e))?;

    let parser = BackupParser::new(xml_path)?;

    let mut messages_seen: u64 = 0;
    let mut files_written: u64 = 0;
    let mut parts_skipped: u64 = 0;
    let mut bytes_written: u64 = 0;
    let mut contacts: BTreeMap<String, u64> = BTreeMap::new();

    let parts_seen = parser.walk(
        &mut |_ctx| {
            messages_seen += 1;
            true
        },
        &mut |ctx, record| {
            match process_part(ctx, record, output_root)? {
                PartOutcome::Saved { path, bytes } => {
                    files_written += 1;
                    bytes_written += bytes;
                    if let Some(ctx) = ctx {
                        *contacts.entry(ctx.contact_name.clone()).or_insert(0) += 1;
                    }
                    info!(path = %path.display(), size = bytes, "Saved media file");
                }
                PartOutcome::Skipped(reason) => {
                    parts_skipped += 1;
                    warn!(offset = record.offset, error = %reason, "Skipping media part");
                }
                PartOutcome::Ineligible => {
                    debug!(offset = record.offset, "Part carries no extractable media");
                }
            }
            Ok(true)
        },
        progress,
    )?;

    Ok(ExtractReport {
        messages_seen,
        parts_seen,
        files_written,
        parts_skipped,
        bytes_written,
        contacts,
    })
}

/// Scan a backup file without writing anything.
///
/// Same walk as [`extract_media`], but parts are only classified and
/// measured. Powers the `stats` subcommand.
pub fn scan_media(xml_path: &Path, progress: Option<&dyn Fn(u64, u64)>) -> Result<ScanReport> {
    let parser = BackupParser::new(xml_path)?;

    let mut messages: u64 = 0;
    let mut eligible_parts: u64 = 0;
    let mut estimated_bytes: u64 = 0;
    let mut contacts: BTreeMap<String, u64> = BTreeMap::new();
    let mut date_min: Option<i64> = None;
    let mut date_max: Option<i64> = None;

    let parts = parser.walk(
        &mut |ctx| {
            messages += 1;
            if let Some(ms) = ctx
                .date_ms
                .as_deref()
                .and_then(|d| d.trim().parse::<i64>().ok())
            {
                date_min = Some(date_min.map_or(ms, |m| m.min(ms)));
                date_max = Some(date_max.map_or(ms, |m| m.max(ms)));
            }
            true
        },
        &mut |ctx, record| {
            if is_eligible(record) {
                eligible_parts += 1;
                estimated_bytes += estimated_decoded_len(record.data.as_deref().unwrap_or(""));
                if let Some(ctx) = ctx {
                    *contacts.entry(ctx.contact_name.clone()).or_insert(0) += 1;
                }
            }
            Ok(true)
        },
        progress,
    )?;

    let date_range_ms = match (date_min, date_max) {
        (Some(min), Some(max)) => Some((min, max)),
        _ => None,
    };

    Ok(ScanReport {
        messages,
        parts,
        eligible_parts,
        estimated_bytes,
        contacts,
        date_range_ms,
    })
}

/// Whether a part would enter the decode/persist pipeline.
fn is_eligible(record: &PartRecord) -> bool {
    let has_payload = record.data.as_deref().is_some_and(|d| !d.is_empty());
    let is_media = record
        .content_type
        .as_deref()
        .is_some_and(mime::is_media_type);
    has_payload && is_media
}

/// Convert an epoch-milliseconds string to a local `YYYYMMDD` date.
///
/// Returns `None` for absent, non-numeric, or out-of-range input.
fn format_day(date_ms: Option<&str>) -> Option<String> {
    let ms = date_ms?.trim().parse::<i64>().ok()?;
    let dt = Local.timestamp_millis_opt(ms).single()?;
    Some(dt.format("%Y%m%d").to_string())
}

/// Decoded size of a base64 payload, without decoding it.
fn estimated_decoded_len(encoded: &str) -> u64 {
    let significant = encoded.trim_end_matches('=').len() as u64;
    significant * 3 / 4
}
