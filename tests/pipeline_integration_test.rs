use codequal::core::MetricValue;
use codequal::pipeline::{Metric, MetricsPipeline, NUMBER_OF_ROWS};
use codequal::{PipelineConfig, ReportWriter, Snapshot};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;

fn write_tree(root: &Path, files: &[(&str, String)]) {
    for (rel, contents) in files {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }
}

fn rows(snapshot: &Snapshot, id: &str) -> Option<u64> {
    match snapshot.get(id)?.get(NUMBER_OF_ROWS)? {
        MetricValue::Count(n) => Some(*n),
        MetricValue::Text(_) => None,
    }
}

#[test]
fn discovers_exactly_the_matching_files() {
    let dir = tempfile::tempdir().unwrap();
    write_tree(
        dir.path(),
        &[
            ("src/lib.rs", "pub mod a;\n".to_string()),
            ("src/a.rs", "pub fn a() {}\n".to_string()),
            ("tests/a_test.rs", "#[test]\nfn t() {}\n".to_string()),
            ("Cargo.toml", "[package]\n".to_string()),
            ("docs/notes.md", "# notes\n".to_string()),
            ("build/gen.rs.bak", "fn old() {}\n".to_string()),
        ],
    );

    let snapshot = MetricsPipeline::new(PipelineConfig::default())
        .run(dir.path())
        .unwrap();

    let mut ids: Vec<&String> = snapshot.ids().collect();
    ids.sort();
    assert_eq!(ids, vec!["src/a.rs", "src/lib.rs", "tests/a_test.rs"]);
}

#[test]
fn report_artifact_matches_the_wire_format() {
    let dir = tempfile::tempdir().unwrap();
    write_tree(
        dir.path(),
        &[
            ("pkg/a.rs", "l\n".repeat(42)),
            ("pkg/b.rs", "l\n".repeat(17)),
        ],
    );

    let snapshot = MetricsPipeline::new(PipelineConfig::default())
        .run(dir.path())
        .unwrap();
    let report_path = dir.path().join("report.json");
    ReportWriter::new(&report_path).write(&snapshot).unwrap();

    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(value["pkg/a.rs"][NUMBER_OF_ROWS], 42);
    assert_eq!(value["pkg/b.rs"][NUMBER_OF_ROWS], 17);
    assert_eq!(value.as_object().unwrap().len(), 2);
}

#[test]
fn line_count_convention_is_scanner_style() {
    // k terminated lines count k; a trailing unterminated line adds one.
    let dir = tempfile::tempdir().unwrap();
    write_tree(
        dir.path(),
        &[
            ("src/terminated.rs", "a\nb\nc\n".to_string()),
            ("src/unterminated.rs", "a\nb\nc".to_string()),
            ("src/empty.rs", String::new()),
        ],
    );

    let snapshot = MetricsPipeline::new(PipelineConfig::default())
        .run(dir.path())
        .unwrap();

    assert_eq!(rows(&snapshot, "src/terminated.rs"), Some(3));
    assert_eq!(rows(&snapshot, "src/unterminated.rs"), Some(3));
    assert_eq!(rows(&snapshot, "src/empty.rs"), Some(0));
}

#[test]
fn no_file_dropped_under_backpressure() {
    // Queue of one slot, workers slowed far below discovery speed. Under
    // the historical drop-on-full enqueue most of these files would be
    // lost; the blocking enqueue must deliver every one.
    struct SlowLineCount;
    impl Metric for SlowLineCount {
        fn name(&self) -> &str {
            NUMBER_OF_ROWS
        }
        fn compute(&self, input: &mut dyn std::io::Read) -> std::io::Result<MetricValue> {
            std::thread::sleep(std::time::Duration::from_millis(5));
            codequal::LineCount.compute(input)
        }
    }

    let dir = tempfile::tempdir().unwrap();
    let files: Vec<(String, String)> = (0..60)
        .map(|i| (format!("src/f{i}.rs"), format!("fn f{i}() {{}}\n")))
        .collect();
    for (rel, contents) in &files {
        let path = dir.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    let config = PipelineConfig::default()
        .with_jobs(2)
        .with_queue_capacity(1);
    let snapshot = MetricsPipeline::new(config)
        .with_metrics(vec![Box::new(SlowLineCount)])
        .run(dir.path())
        .unwrap();

    assert_eq!(snapshot.len(), 60, "files were dropped under backpressure");
    for i in 0..60 {
        assert_eq!(
            rows(&snapshot, &format!("src/f{i}.rs")),
            Some(1),
            "missing or wrong metric for src/f{i}.rs"
        );
    }
}

#[test]
fn no_file_counted_twice_under_concurrency() {
    struct CountingMetric(std::sync::Arc<std::sync::atomic::AtomicUsize>);
    impl Metric for CountingMetric {
        fn name(&self) -> &str {
            "computations"
        }
        fn compute(&self, _: &mut dyn std::io::Read) -> std::io::Result<MetricValue> {
            self.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok(MetricValue::Count(1))
        }
    }

    let dir = tempfile::tempdir().unwrap();
    for i in 0..30 {
        let path = dir.path().join(format!("f{i}.rs"));
        fs::write(path, "fn f() {}\n").unwrap();
    }

    let computations = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
    let config = PipelineConfig::default().with_jobs(8);
    let snapshot = MetricsPipeline::new(config)
        .with_metrics(vec![Box::new(CountingMetric(std::sync::Arc::clone(
            &computations,
        )))])
        .run(dir.path())
        .unwrap();

    assert_eq!(snapshot.len(), 30);
    assert_eq!(computations.load(std::sync::atomic::Ordering::SeqCst), 30);
}

#[test]
fn sequential_and_concurrent_snapshots_are_identical() {
    let dir = tempfile::tempdir().unwrap();
    let files: Vec<(String, String)> = (0..25)
        .map(|i| (format!("mod{i}/file{i}.rs"), "line\n".repeat(i * 3)))
        .collect();
    for (rel, contents) in &files {
        let path = dir.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    let sequential = MetricsPipeline::new(PipelineConfig::default().with_jobs(1))
        .run(dir.path())
        .unwrap();
    let concurrent = MetricsPipeline::new(PipelineConfig::default().with_jobs(6))
        .run(dir.path())
        .unwrap();

    assert_eq!(sequential, concurrent);
}

#[cfg(unix)]
#[test]
fn unopenable_file_is_skipped_and_left_unregistered() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("good.rs"), "fn g() {}\n").unwrap();
    let locked = dir.path().join("locked.rs");
    fs::write(&locked, "fn l() {}\n").unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
    // Mode bits don't stop privileged users from opening the file; the
    // open-failure path can't be exercised then.
    if fs::File::open(&locked).is_ok() {
        return;
    }

    let snapshot = MetricsPipeline::new(PipelineConfig::default())
        .run(dir.path())
        .unwrap();

    assert_eq!(snapshot.len(), 1, "unopenable file registered anyway");
    assert_eq!(rows(&snapshot, "good.rs"), Some(1));
    assert!(snapshot.get("locked.rs").is_none());
}

#[test]
fn unreadable_content_is_skipped_but_file_stays_registered() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("good.rs"), "fn g() {}\n").unwrap();
    // Invalid UTF-8 makes the text metric fail mid-read; the file keeps
    // its registration, the metric is simply omitted.
    fs::write(dir.path().join("binary.rs"), [0xff, 0xfe, 0x00, b'\n']).unwrap();

    let snapshot = MetricsPipeline::new(PipelineConfig::default())
        .run(dir.path())
        .unwrap();

    assert_eq!(snapshot.len(), 2);
    assert_eq!(rows(&snapshot, "good.rs"), Some(1));
    assert!(snapshot.get("binary.rs").unwrap().is_empty());
}
