use dash_abr::context::{Phase, PlayerContext, PlayerOptions};
use dash_abr::segment::{ByteRange, FetchItem, FetchStats};
use dash_abr::{DashError, DashResult, Manifest};
use reqwest::StatusCode;
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const MANIFEST: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<MPD xmlns="urn:mpeg:dash:schema:mpd:2011" type="static" minBufferTime="PT2S" mediaPresentationDuration="PT6S">
  <BaseURL>http://media.example.com/</BaseURL>
  <Period>
    <AdaptationSet mimeType="video/mp4">
      <Representation id="20" bandwidth="1000000">
        <SegmentBase><Initialization sourceURL="hi/init.mp4" range="0-99"/></SegmentBase>
        <SegmentList duration="2">
          <SegmentURL media="hi/1.m4s" mediaRange="100-199"/>
          <SegmentURL media="hi/2.m4s" mediaRange="200-299"/>
          <SegmentURL media="hi/3.m4s" mediaRange="300-399"/>
        </SegmentList>
      </Representation>
      <Representation id="10" bandwidth="500000">
        <SegmentBase><Initialization sourceURL="lo/init.mp4" range="0-49"/></SegmentBase>
        <SegmentList duration="2">
          <SegmentURL media="lo/1.m4s"/>
          <SegmentURL media="lo/2.m4s"/>
          <SegmentURL media="lo/3.m4s"/>
        </SegmentList>
      </Representation>
    </AdaptationSet>
  </Period>
</MPD>"#;

const SCHEMA: &str = r#"<?xml version="1.0"?>
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:element name="MPD"/>
</xs:schema>"#;

/// Records every interaction and answers fetches with fixed figures.
struct StubContext {
    options: PlayerOptions,
    root: PathBuf,
    events: RefCell<Vec<(Phase, String)>>,
    fetched: Vec<(String, ByteRange)>,
    bandwidth_reports: Vec<(f64, u64)>,
    fail_fetches: bool,
}

impl StubContext {
    fn new(root: &Path) -> Self {
        Self {
            options: PlayerOptions::default(),
            root: root.to_path_buf(),
            events: RefCell::new(Vec::new()),
            fetched: Vec::new(),
            bandwidth_reports: Vec::new(),
            fail_fetches: false,
        }
    }

    fn labels(&self, phase: Phase) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .filter(|(p, _)| *p == phase)
            .map(|(_, label)| label.clone())
            .collect()
    }
}

impl PlayerContext for StubContext {
    fn event(&self, phase: Phase, label: &str) {
        self.events.borrow_mut().push((phase, label.to_string()));
    }

    fn fetch_item(&mut self, item: FetchItem<'_>) -> DashResult<FetchStats> {
        self.fetched.push((item.url().to_string(), item.range()));
        if self.fail_fetches {
            return Err(DashError::HttpStatus {
                status: StatusCode::SERVICE_UNAVAILABLE,
                url: item.url().to_string(),
            });
        }
        Ok(FetchStats {
            duration: 0.5,
            length: 1_000,
        })
    }

    fn update_bandwidth(&mut self, total_duration: f64, total_length: u64) {
        self.bandwidth_reports.push((total_duration, total_length));
    }

    fn create_directory(&self, path: &str) -> DashResult<PathBuf> {
        let dir = self.root.join(path);
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    fn options(&self) -> &PlayerOptions {
        &self.options
    }
}

fn write(dir: &TempDir, name: &str, contents: &str) -> String {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path.to_str().unwrap().to_string()
}

#[test]
fn open_downloads_initializations_and_reports_bandwidth() {
    let tmp = tempfile::tempdir().unwrap();
    let source = write(&tmp, "stream.mpd", MANIFEST);
    let mut ctx = StubContext::new(tmp.path());

    let manifest = Manifest::open(&mut ctx, &source).unwrap();

    assert_eq!(manifest.duration(), 6);
    assert_eq!(manifest.min_buffer_time(), 2.0);
    assert_eq!(manifest.max_segment_duration(), 2.0);

    // Ascending bandwidth order, so the 500 kbps initialization comes first
    assert_eq!(
        ctx.fetched,
        vec![
            ("http://media.example.com/lo/init.mp4".to_string(), ByteRange::new(0, 49)),
            ("http://media.example.com/hi/init.mp4".to_string(), ByteRange::new(0, 99)),
        ]
    );
    assert_eq!(ctx.bandwidth_reports, vec![(1.0, 2_000)]);
    assert_eq!(
        ctx.labels(Phase::Start),
        vec!["parsing mpd", "downloading initializations"]
    );
    assert_eq!(
        ctx.labels(Phase::Stop),
        vec!["parsing mpd", "downloading initializations"]
    );
}

#[test]
fn two_representations_three_segments_scenario() {
    let tmp = tempfile::tempdir().unwrap();
    let source = write(&tmp, "stream.mpd", MANIFEST);
    let mut ctx = StubContext::new(tmp.path());
    let mut manifest = Manifest::load(&mut ctx, &source).unwrap();

    let first = manifest.candidate(600_000.0).unwrap();
    assert_eq!(first.bandwidth, 500_000);
    assert_eq!(first.representation_id, 10);
    assert_eq!(first.url, "http://media.example.com/lo/1.m4s");
    assert_eq!(first.range, ByteRange::WHOLE);
    assert_eq!(manifest.representations().remaining(), vec![2, 2]);

    let second = manifest.candidate(1_200_000.0).unwrap();
    assert_eq!(second.url, "http://media.example.com/hi/2.m4s");
    assert_eq!(second.range, ByteRange::new(200, 299));
    assert_eq!(manifest.representations().remaining(), vec![1, 1]);

    manifest.candidate(600_000.0).unwrap();
    assert_eq!(manifest.representations().remaining(), vec![0, 0]);
    assert!(matches!(manifest.candidate(600_000.0), Err(DashError::Exhausted)));
}

#[test]
fn exactly_queue_length_candidates_succeed() {
    let tmp = tempfile::tempdir().unwrap();
    let source = write(&tmp, "stream.mpd", MANIFEST);
    let mut ctx = StubContext::new(tmp.path());
    let mut manifest = Manifest::load(&mut ctx, &source).unwrap();

    let mut served = 0;
    for bandwidth in [0.0, 2_000_000.0, 750_000.0, 600_000.0, 1_000_000.0] {
        match manifest.candidate(bandwidth) {
            Ok(_) => served += 1,
            Err(DashError::Exhausted) => break,
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
    assert_eq!(served, 3);
}

#[test]
fn stop_discards_representations() {
    let tmp = tempfile::tempdir().unwrap();
    let source = write(&tmp, "stream.mpd", MANIFEST);
    let mut ctx = StubContext::new(tmp.path());
    let mut manifest = Manifest::load(&mut ctx, &source).unwrap();

    manifest.stop(&ctx);
    assert!(manifest.representations().is_empty());
    assert!(matches!(manifest.candidate(500_000.0), Err(DashError::Exhausted)));
    assert_eq!(ctx.labels(Phase::Stop).last().map(String::as_str), Some("representations"));
}

#[test]
fn independent_loads_do_not_share_state() {
    let tmp = tempfile::tempdir().unwrap();
    let source = write(&tmp, "stream.mpd", MANIFEST);
    let mut ctx = StubContext::new(tmp.path());
    let mut first = Manifest::load(&mut ctx, &source).unwrap();
    let second = Manifest::load(&mut ctx, &source).unwrap();

    first.candidate(500_000.0).unwrap();
    assert_eq!(first.representations().remaining(), vec![2, 2]);
    assert_eq!(second.representations().remaining(), vec![3, 3]);
}

#[test]
fn malformed_manifest_is_fatal_and_reported() {
    let tmp = tempfile::tempdir().unwrap();
    let source = write(&tmp, "broken.mpd", "<MPD><Period></MPD>");
    let mut ctx = StubContext::new(tmp.path());

    let err = Manifest::load(&mut ctx, &source).unwrap_err();
    assert!(err.is_fatal());
    assert_eq!(ctx.labels(Phase::Error).len(), 1);
    assert!(ctx.fetched.is_empty());
}

#[test]
fn validation_accepts_valid_manifest() {
    let tmp = tempfile::tempdir().unwrap();
    let source = write(&tmp, "stream.mpd", MANIFEST);
    let schema = write(&tmp, "DASH-MPD.xsd", SCHEMA);
    let mut ctx = StubContext::new(tmp.path());
    ctx.options.xml_validation = true;
    ctx.options.schema_path = PathBuf::from(schema);

    let manifest = Manifest::load(&mut ctx, &source).unwrap();
    assert_eq!(manifest.representations().len(), 2);
    assert_eq!(
        ctx.labels(Phase::Start),
        vec!["parsing mpd", "validating schema", "validating document"]
    );
}

#[test]
fn validation_failure_is_fatal() {
    let tmp = tempfile::tempdir().unwrap();
    let source = write(
        &tmp,
        "invalid.mpd",
        r#"<MPD><Period><AdaptationSet><Representation id="1"/></AdaptationSet></Period></MPD>"#,
    );
    let schema = write(&tmp, "DASH-MPD.xsd", SCHEMA);
    let mut ctx = StubContext::new(tmp.path());
    ctx.options.xml_validation = true;
    ctx.options.schema_path = PathBuf::from(schema);

    let err = Manifest::load(&mut ctx, &source).unwrap_err();
    assert!(matches!(err, DashError::SchemaValidation(_)));
    assert!(err.is_fatal());
    assert_eq!(ctx.labels(Phase::Error).len(), 1);
}

#[test]
fn malformed_schema_definition_is_fatal() {
    let tmp = tempfile::tempdir().unwrap();
    let source = write(&tmp, "stream.mpd", MANIFEST);
    let schema = write(&tmp, "DASH-MPD.xsd", "<xs:schema><xs:element name=\"MPD\">");
    let mut ctx = StubContext::new(tmp.path());
    ctx.options.xml_validation = true;
    ctx.options.schema_path = PathBuf::from(schema);

    let err = Manifest::load(&mut ctx, &source).unwrap_err();
    assert!(matches!(err, DashError::SchemaDefinition(_)));
    assert!(!ctx.labels(Phase::Start).contains(&"validating document".to_string()));
}

#[test]
fn missing_segment_range_and_id_use_defaults() {
    let tmp = tempfile::tempdir().unwrap();
    let source = write(
        &tmp,
        "noid.mpd",
        r#"<MPD minBufferTime="PT1S"><Period><AdaptationSet>
            <Representation bandwidth="300000">
              <BaseURL>http://rep.example.com/</BaseURL>
              <SegmentList duration="1"><SegmentURL media="only.m4s"/></SegmentList>
            </Representation>
        </AdaptationSet></Period></MPD>"#,
    );
    let mut ctx = StubContext::new(tmp.path());
    let mut manifest = Manifest::open(&mut ctx, &source).unwrap();

    // No initialization to download, still reported
    assert!(ctx.fetched.is_empty());
    assert_eq!(ctx.bandwidth_reports, vec![(0.0, 0)]);

    let id = manifest.representations().get(0).unwrap().id();
    let segment = manifest.candidate(1.0).unwrap();
    assert_eq!(segment.representation_id, id);
    assert_eq!(segment.range, ByteRange::WHOLE);
    assert_eq!(segment.url, "http://rep.example.com/only.m4s");
    assert_eq!(manifest.duration(), 0);
}

#[test]
fn failed_initialization_is_reported_by_open() {
    let tmp = tempfile::tempdir().unwrap();
    let source = write(&tmp, "stream.mpd", MANIFEST);
    let mut ctx = StubContext::new(tmp.path());
    ctx.fail_fetches = true;

    let err = Manifest::open(&mut ctx, &source).unwrap_err();
    assert!(matches!(
        err,
        DashError::HttpStatus { status, .. } if status == StatusCode::SERVICE_UNAVAILABLE
    ));
    assert!(!err.is_fatal());

    // The first initialization fails, nothing after it is attempted
    assert_eq!(ctx.fetched.len(), 1);
    assert!(ctx.bandwidth_reports.is_empty());
    let errors = ctx.labels(Phase::Error);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("503"));
    assert!(!ctx.labels(Phase::Stop).contains(&"downloading initializations".to_string()));
}
