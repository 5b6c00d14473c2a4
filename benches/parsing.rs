use criterion::{criterion_group, criterion_main, Criterion};
use std::path::Path;

fn bench_walk_backup(c: &mut Criterion) {
    let fixture_path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("backup.xml");

    c.bench_function("walk_backup", |b| {
        b.iter(|| {
            let parser = mmsrip::parser::BackupParser::new(&fixture_path).unwrap();
            let mut messages = 0u64;
            let parts = parser
                .walk(
                    &mut |_ctx| {
                        messages += 1;
                        true
                    },
                    &mut |_ctx, _record| Ok(true),
                    None,
                )
                .unwrap();
            (messages, parts)
        })
    });
}

fn bench_scan_backup(c: &mut Criterion) {
    let fixture_path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("backup.xml");

    c.bench_function("scan_backup", |b| {
        b.iter(|| mmsrip::extract::scan_media(&fixture_path, None).unwrap())
    });
}

criterion_group!(benches, bench_walk_backup, bench_scan_backup);
criterion_main!(benches);
