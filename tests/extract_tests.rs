//! Integration tests for media extraction and the dry-run scan.

use std::path::Path;

use assert_fs::prelude::*;
use chrono::{Local, TimeZone};
use predicates::prelude::*;

use mmsrip::error::MmsError;
use mmsrip::extract;

fn fixture(name: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Expected `YYYYMMDD` for a timestamp, derived the same way the
/// extractor derives it (local timezone).
fn local_day(ms: i64) -> String {
    Local
        .timestamp_millis_opt(ms)
        .single()
        .unwrap()
        .format("%Y%m%d")
        .to_string()
}

fn count_files(root: &Path) -> usize {
    let mut n = 0;
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in std::fs::read_dir(&dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                stack.push(path);
            } else {
                n += 1;
            }
        }
    }
    n
}

// ─── Test 1: Full extraction counts over backup.xml ─────────────────

#[test]
fn test_extract_backup_counts() {
    let temp = assert_fs::TempDir::new().unwrap();
    let out = temp.child("out");

    let report = extract::extract_media(&fixture("backup.xml"), out.path(), None).unwrap();

    assert_eq!(report.messages_seen, 8, "backup.xml has 8 mms elements");
    assert_eq!(report.parts_seen, 10, "backup.xml has 10 part elements");
    assert_eq!(report.files_written, 5);
    assert_eq!(report.parts_skipped, 3);
    assert_eq!(report.bytes_written, 52);
    assert_eq!(count_files(out.path()), 5);
}

// ─── Test 2: Saved files carry the decoded payload ──────────────────

#[test]
fn test_extract_writes_decoded_bytes() {
    let temp = assert_fs::TempDir::new().unwrap();
    let out = temp.child("out");

    extract::extract_media(&fixture("backup.xml"), out.path(), None).unwrap();

    let day = local_day(1_700_000_000_000);
    out.child(format!("Alice/MMS_{day}_1.jpg"))
        .assert("Hello, World!");
    out.child(format!("Bob/MMS_{day}_3.gif")).assert("GIF89a");

    let day2 = local_day(1_700_086_400_000);
    out.child(format!("Alice/MMS_{day2}_2.png"))
        .assert("0123456789");
}

// ─── Test 3: Ineligible parts leave no trace ────────────────────────

#[test]
fn test_extract_ignores_non_media_parts() {
    let temp = assert_fs::TempDir::new().unwrap();
    let out = temp.child("out");

    let report = extract::extract_media(&fixture("backup.xml"), out.path(), None).unwrap();

    // SMIL layout and text/plain parts are passed over without being
    // counted as skips.
    assert_eq!(report.parts_seen - report.files_written - report.parts_skipped, 2);
    let day2 = local_day(1_700_086_400_000);
    out.child(format!("Alice/MMS_{day2}_2.txt"))
        .assert(predicate::path::missing());
}

// ─── Test 4: Bad base64 skips that part, run continues ──────────────

#[test]
fn test_extract_bad_base64_skips_and_continues() {
    let temp = assert_fs::TempDir::new().unwrap();
    let out = temp.child("out");

    extract::extract_media(&fixture("backup.xml"), out.path(), None).unwrap();

    let day = local_day(1_700_000_000_000);
    // Carol's mp4 payload is not base64; her second part still lands.
    out.child(format!("Carol/MMS_{day}_5.mp4"))
        .assert(predicate::path::missing());
    out.child(format!("Carol/MMS_{day}_5.bin"))
        .assert("0123456789");
}

// ─── Test 5: Missing or unparseable dates skip the part ─────────────

#[test]
fn test_extract_bad_dates_skip() {
    let temp = assert_fs::TempDir::new().unwrap();
    let out = temp.child("out");

    extract::extract_media(&fixture("backup.xml"), out.path(), None).unwrap();

    // Message 4 has date="not-a-number", message 7 has no date at all.
    let bob_files: Vec<_> = std::fs::read_dir(out.path().join("Bob"))
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(bob_files.len(), 1, "only Bob's message 3 should survive");
    assert!(bob_files[0].ends_with("_3.gif"));

    out.child("Dave").assert(predicate::path::missing());
}

// ─── Test 6: Missing contact_name falls back to "unknown" ───────────

#[test]
fn test_extract_unknown_contact_directory() {
    let temp = assert_fs::TempDir::new().unwrap();
    let out = temp.child("out");

    extract::extract_media(&fixture("backup.xml"), out.path(), None).unwrap();

    let day = local_day(1_700_000_000_000);
    out.child(format!("unknown/MMS_{day}_6.3gp"))
        .assert("Hello, World!");
}

// ─── Test 7: Report serializes with sorted contact keys ─────────────

#[test]
fn test_report_json_contact_keys_sorted() {
    let temp = assert_fs::TempDir::new().unwrap();
    let out = temp.child("out");

    let report = extract::extract_media(&fixture("backup.xml"), out.path(), None).unwrap();
    let value = serde_json::to_value(&report).unwrap();

    let keys: Vec<&String> = value["contacts"].as_object().unwrap().keys().collect();
    assert_eq!(keys, ["Alice", "Bob", "Carol", "unknown"]);
    assert_eq!(value["contacts"]["Alice"], 2);
    assert_eq!(value["contacts"]["unknown"], 1);
}

// ─── Test 8: Orphan part is skipped, later parts unaffected ─────────

#[test]
fn test_extract_orphan_part() {
    let temp = assert_fs::TempDir::new().unwrap();
    let out = temp.child("out");

    let report = extract::extract_media(&fixture("orphan.xml"), out.path(), None).unwrap();

    assert_eq!(report.parts_seen, 2);
    assert_eq!(report.parts_skipped, 1);
    assert_eq!(report.files_written, 1);

    let day = local_day(1_700_000_000_000);
    out.child(format!("Alice/MMS_{day}_1.png"))
        .assert("0123456789");
}

// ─── Test 9: Empty document → zero-valued report, no error ──────────

#[test]
fn test_extract_empty_document() {
    let temp = assert_fs::TempDir::new().unwrap();
    let out = temp.child("out");

    let report = extract::extract_media(&fixture("empty.xml"), out.path(), None).unwrap();

    assert_eq!(report.messages_seen, 0);
    assert_eq!(report.parts_seen, 0);
    assert_eq!(report.files_written, 0);
    assert_eq!(report.parts_skipped, 0);
    assert!(report.contacts.is_empty());

    // Output root is still created, just empty.
    out.assert(predicate::path::is_dir());
    assert_eq!(count_files(out.path()), 0);
}

// ─── Test 10: Truncated XML is a hard error ─────────────────────────

#[test]
fn test_extract_malformed_document_errors() {
    let temp = assert_fs::TempDir::new().unwrap();
    let out = temp.child("out");

    let result = extract::extract_media(&fixture("malformed.xml"), out.path(), None);
    match result {
        Err(MmsError::Xml { position, .. }) => assert!(position > 0),
        other => panic!("expected Xml error, got {other:?}"),
    }
}

// ─── Test 11: Missing input file ────────────────────────────────────

#[test]
fn test_extract_missing_file() {
    let temp = assert_fs::TempDir::new().unwrap();
    let out = temp.child("out");

    let missing = temp.path().join("no-such-backup.xml");
    let result = extract::extract_media(&missing, out.path(), None);
    assert!(matches!(result, Err(MmsError::FileNotFound(_))));

    // The output root is prepared before the input is opened.
    out.assert(predicate::path::is_dir());
}

// ─── Test 12: Re-running produces the same tree ─────────────────────

#[test]
fn test_extract_rerun_is_idempotent() {
    let temp = assert_fs::TempDir::new().unwrap();
    let out = temp.child("out");

    let first = extract::extract_media(&fixture("backup.xml"), out.path(), None).unwrap();
    let second = extract::extract_media(&fixture("backup.xml"), out.path(), None).unwrap();

    assert_eq!(first.files_written, second.files_written);
    assert_eq!(first.bytes_written, second.bytes_written);
    assert_eq!(count_files(out.path()), 5, "overwrite, not duplicate");
}

// ─── Test 13: Same id and date under different contacts ─────────────

#[test]
fn test_extract_same_id_distinct_contacts() {
    let temp = assert_fs::TempDir::new().unwrap();
    let backup = temp.child("twins.xml");
    backup
        .write_str(concat!(
            r#"<?xml version="1.0"?><smses count="2">"#,
            r#"<mms _id="10" contact_name="Alice" date="1700000000000">"#,
            r#"<parts><part ct="image/png" data="MDEyMzQ1Njc4OQ=="/></parts></mms>"#,
            r#"<mms _id="10" contact_name="Bob" date="1700000000000">"#,
            r#"<parts><part ct="image/png" data="SGVsbG8sIFdvcmxkIQ=="/></parts></mms>"#,
            r#"</smses>"#,
        ))
        .unwrap();
    let out = temp.child("out");

    let report = extract::extract_media(backup.path(), out.path(), None).unwrap();
    assert_eq!(report.files_written, 2);

    let day = local_day(1_700_000_000_000);
    out.child(format!("Alice/MMS_{day}_10.png"))
        .assert("0123456789");
    out.child(format!("Bob/MMS_{day}_10.png"))
        .assert("Hello, World!");
}

// ─── Test 14: Dry-run scan matches the document ─────────────────────

#[test]
fn test_scan_counts_and_estimate() {
    let report = extract::scan_media(&fixture("backup.xml"), None).unwrap();

    assert_eq!(report.messages, 8);
    assert_eq!(report.parts, 10);
    assert_eq!(report.eligible_parts, 8);
    assert_eq!(report.estimated_bytes, 87);
    assert_eq!(
        report.date_range_ms,
        Some((1_700_000_000_000, 1_700_086_400_000))
    );

    let contacts: Vec<(&str, u64)> = report
        .contacts
        .iter()
        .map(|(k, v)| (k.as_str(), *v))
        .collect();
    assert_eq!(
        contacts,
        [
            ("Alice", 2),
            ("Bob", 2),
            ("Carol", 2),
            ("Dave", 1),
            ("unknown", 1)
        ]
    );
}

// ─── Test 15: Scanning writes nothing ───────────────────────────────

#[test]
fn test_scan_creates_no_files() {
    let temp = assert_fs::TempDir::new().unwrap();
    let backup_path = temp.path().join("backup.xml");
    std::fs::copy(fixture("backup.xml"), &backup_path).unwrap();

    extract::scan_media(&backup_path, None).unwrap();

    let entries: Vec<_> = std::fs::read_dir(temp.path()).unwrap().collect();
    assert_eq!(entries.len(), 1, "only the copied backup should exist");
}
