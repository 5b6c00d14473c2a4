//! Streaming XML backup parser.
//!
//! Reads SMS Backup & Restore dumps event-by-event with a 1 MB read
//! buffer. Never holds more than one element in memory, so multi-GB
//! backups parse in constant space.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{MmsError, Result};
use crate::model::{MessageContext, PartRecord};

/// Size of the internal read buffer (1 MB for fast sequential reads on modern SSDs).
const READ_BUFFER_SIZE: usize = 1024 * 1024;

/// Progress every 4 MB (less overhead on large files).
const PROGRESS_INTERVAL: u64 = 4 * 1024 * 1024;

/// Streaming backup parser.
///
/// Walks the document sequentially, invoking caller-supplied callbacks
/// for every `mms` and `part` element it finds. Element nesting is not
/// validated: each `mms` replaces the current message context, and each
/// `part` is attributed to whichever context is live at that point.
/// The parser is tolerant of:
///
/// - `sms` elements and any other element names (ignored)
/// - Self-closing elements (`<mms ... />` counts like `<mms ...>`)
/// - `part` elements appearing before any `mms` (delivered without context)
/// - Unclosed elements at EOF
#[derive(Debug)]
pub struct BackupParser {
    path: PathBuf,
    file_size: u64,
}

impl BackupParser {
    /// Create a parser for the given backup file.
    ///
    /// Verifies that the file exists and is readable, but does NOT
    /// validate that it is actually XML.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let metadata = std::fs::metadata(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                MmsError::FileNotFound(path.clone())
            } else {
                MmsError::io(&path, e)
            }
        })?;
        Ok(Self {
            path,
            file_size: metadata.len(),
        })
    }

    /// Total size of the underlying file in bytes.
    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// Path to the backup file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Walk the full document, firing `on_message` for each `mms` element
    /// and `on_part` for each `part` element.
    ///
    /// `on_message` receives the freshly captured context and returns
    /// `true` to continue or `false` to abort early. `on_part` receives
    /// the live context (or `None` for orphaned parts) plus the part's
    /// raw attributes; it returns `Ok(false)` to abort early, and any
    /// error it produces aborts the walk as-is.
    ///
    /// Returns the number of parts walked; a part whose callback stops
    /// the walk is not counted.
    pub fn walk(
        &self,
        on_message: &mut dyn FnMut(&MessageContext) -> bool,
        on_part: &mut dyn FnMut(Option<&MessageContext>, &PartRecord) -> Result<bool>,
        progress_callback: Option<&dyn Fn(u64, u64)>,
    ) -> Result<u64> {
        if self.file_size == 0 {
            if let Some(cb) = progress_callback {
                cb(0, 0);
            }
            return Ok(0);
        }

        let file = File::open(&self.path).map_err(|e| MmsError::io(&self.path, e))?;
        let mut reader = Reader::from_reader(BufReader::with_capacity(READ_BUFFER_SIZE, file));

        let mut context: Option<MessageContext> = None;
        let mut parts: u64 = 0;
        let mut last_progress: u64 = 0;

        // Reusable event buffer
        let mut buf: Vec<u8> = Vec::with_capacity(64 * 1024);

        loop {
            let event = match reader.read_event_into(&mut buf) {
                Ok(event) => event,
                Err(e) => {
                    let position = reader.error_position();
                    return Err(MmsError::xml(&self.path, position, e));
                }
            };

            match event {
                Event::Start(ref e) | Event::Empty(ref e) => {
                    let position = reader.buffer_position();
                    match e.local_name().as_ref() {
                        b"mms" => {
                            let ctx = self.message_context(e, position)?;
                            if !on_message(&ctx) {
                                return Ok(parts);
                            }
                            context = Some(ctx);
                        }
                        b"part" => {
                            let record = self.part_record(e, position)?;
                            if !on_part(context.as_ref(), &record)? {
                                return Ok(parts);
                            }
                            parts += 1;
                        }
                        _ => {}
                    }
                }
                Event::Eof => break,
                _ => {}
            }

            buf.clear();

            if let Some(cb) = progress_callback {
                let consumed = reader.buffer_position();
                if consumed - last_progress >= PROGRESS_INTERVAL {
                    cb(consumed, self.file_size);
                    last_progress = consumed;
                }
            }
        }

        if let Some(cb) = progress_callback {
            cb(self.file_size, self.file_size);
        }

        Ok(parts)
    }

    /// Capture the message-level attributes of an `mms` element.
    fn message_context(&self, e: &BytesStart<'_>, position: u64) -> Result<MessageContext> {
        let mut id = None;
        let mut contact = None;
        let mut date = None;
        for attr in e.attributes() {
            let attr = attr.map_err(|err| MmsError::attr(&self.path, position, err))?;
            match attr.key.local_name().as_ref() {
                b"_id" => id = Some(self.unescape_attr(&attr, position)?),
                b"contact_name" => contact = Some(self.unescape_attr(&attr, position)?),
                b"date" => date = Some(self.unescape_attr(&attr, position)?),
                _ => {}
            }
        }
        Ok(MessageContext::new(id, contact, date))
    }

    /// Capture the payload attributes of a `part` element.
    fn part_record(&self, e: &BytesStart<'_>, position: u64) -> Result<PartRecord> {
        let mut data = None;
        let mut content_type = None;
        for attr in e.attributes() {
            let attr = attr.map_err(|err| MmsError::attr(&self.path, position, err))?;
            match attr.key.local_name().as_ref() {
                b"data" => data = Some(self.unescape_attr(&attr, position)?),
                b"ct" => content_type = Some(self.unescape_attr(&attr, position)?),
                _ => {}
            }
        }
        Ok(PartRecord::new(data, content_type, position))
    }

    /// Decode one attribute value, resolving XML entities like `&amp;`.
    fn unescape_attr(&self, attr: &Attribute<'_>, position: u64) -> Result<String> {
        attr.unescape_value()
            .map(|v| v.into_owned())
            .map_err(|err| MmsError::xml(&self.path, position, err))
    }
}
