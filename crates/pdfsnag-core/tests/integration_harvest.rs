//! Integration test: full harvest with a stub renderer and a local HTTP server.

mod common;

use common::pdf_server::{self, Route};
use common::stub_renderer::StubRenderer;
use pdfsnag_core::config::HarvestConfig;
use pdfsnag_core::fetcher::FetchError;
use pdfsnag_core::harvest::{HarvestError, HarvestEvent, Harvester, Stage};
use pdfsnag_core::renderer::RenderError;
use std::path::Path;
use tempfile::tempdir;

fn config(source_url: &str, out: &Path) -> HarvestConfig {
    HarvestConfig {
        source_url: source_url.to_string(),
        output_dir: out.to_path_buf(),
        connect_timeout_secs: 5,
        request_timeout_secs: 30,
        ..HarvestConfig::default()
    }
}

#[test]
fn failed_link_does_not_stop_the_rest() {
    let server = pdf_server::start(vec![
        ("/docs/one.pdf", Route::ok(b"%PDF one")),
        ("/docs/two.pdf", Route::status(500)),
        ("/docs/three.pdf", Route::ok(b"%PDF three")),
    ]);
    let html = r#"<html><body>
        <a href="one.pdf">1</a>
        <a href="two.pdf">2</a>
        <a href="three.pdf">3</a>
        <a href="index.html">not a pdf</a>
    </body></html>"#;
    let out = tempdir().unwrap();
    let cfg = config(&server.url("/docs/"), out.path());

    let mut harvester = Harvester::new(&cfg, StubRenderer::new(html)).unwrap();
    let mut failed = Vec::new();
    let mut fetched = Vec::new();
    let summary = harvester
        .run_with(|ev| match ev {
            HarvestEvent::Fetched { index, .. } => fetched.push(*index),
            HarvestEvent::FetchFailed { index, error, .. } => {
                failed.push((*index, error.http_status()))
            }
            _ => {}
        })
        .expect("harvest");

    assert_eq!(summary.links_found, 3);
    assert_eq!(summary.succeeded(), 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(fetched, vec![0, 2]);
    assert_eq!(failed, vec![(1, Some(500))]);

    assert_eq!(server.hits("/docs/one.pdf"), 1);
    assert_eq!(server.hits("/docs/two.pdf"), 1);
    assert_eq!(server.hits("/docs/three.pdf"), 1);
    assert!(out.path().join("one.pdf").exists());
    assert!(!out.path().join("two.pdf").exists());
    assert!(out.path().join("three.pdf").exists());
}

#[test]
fn rerun_skips_files_already_downloaded() {
    let server = pdf_server::start(vec![
        ("/a.pdf", Route::ok(b"a")),
        ("/b.pdf", Route::ok(b"b")),
    ]);
    let html = r#"<a href="/a.pdf">a</a><a href="/b.pdf">b</a><a href="/a.pdf">a again</a>"#;
    let out = tempdir().unwrap();
    let cfg = config(&server.base_url, out.path());

    let first = Harvester::new(&cfg, StubRenderer::new(html))
        .unwrap()
        .run()
        .unwrap();
    assert_eq!(first.links_found, 3);
    assert_eq!(first.downloaded, 2);
    assert_eq!(first.already_present, 1);

    let second = Harvester::new(&cfg, StubRenderer::new(html))
        .unwrap()
        .run()
        .unwrap();
    assert_eq!(second.downloaded, 0);
    assert_eq!(second.already_present, 3);
    assert_eq!(second.succeeded(), 3);

    assert_eq!(server.hits("/a.pdf"), 1);
    assert_eq!(server.hits("/b.pdf"), 1);
}

#[test]
fn renderer_receives_source_url_and_links_resolve_against_it() {
    let server = pdf_server::start(vec![("/files/x.pdf", Route::ok(b"x"))]);
    let out = tempdir().unwrap();
    let cfg = config(&server.url("/info/all_docs/"), out.path());
    let mut stub = StubRenderer::new(r#"<a href="../../files/x.pdf">x</a>"#);

    let summary = Harvester::new(&cfg, &mut stub).unwrap().run().unwrap();

    assert_eq!(summary.downloaded, 1);
    assert_eq!(stub.requested.len(), 1);
    assert_eq!(stub.requested[0].as_str(), server.url("/info/all_docs/"));
}

#[test]
fn page_without_links_times_out_and_fetches_nothing() {
    let out = tempdir().unwrap();
    let cfg = config("http://127.0.0.1:9/", &out.path().join("pdfs"));

    let mut stages = Vec::new();
    let err = Harvester::new(&cfg, StubRenderer::new("<html><body>loading…</body></html>"))
        .unwrap()
        .run_with(|ev| {
            if let HarvestEvent::StageChanged(s) = ev {
                stages.push(*s);
            }
        })
        .unwrap_err();

    assert!(matches!(
        err,
        HarvestError::Render(RenderError::ContentTimeout { .. })
    ));
    assert_eq!(err.stage(), Stage::WaitingForContent);
    assert_eq!(
        stages,
        vec![
            Stage::BrowserStarting,
            Stage::PageLoading,
            Stage::WaitingForContent,
            Stage::Failed,
        ]
    );
    assert!(!out.path().join("pdfs").exists());
}

#[test]
fn stages_are_reported_in_order() {
    let server = pdf_server::start(vec![("/a.pdf", Route::ok(b"a"))]);
    let out = tempdir().unwrap();
    let cfg = config(&server.base_url, out.path());

    let mut stages = Vec::new();
    Harvester::new(&cfg, StubRenderer::new(r#"<a href="a.pdf">a</a>"#))
        .unwrap()
        .run_with(|ev| {
            if let HarvestEvent::StageChanged(s) = ev {
                stages.push(*s);
            }
        })
        .unwrap();

    assert_eq!(
        stages,
        vec![
            Stage::BrowserStarting,
            Stage::PageLoading,
            Stage::WaitingForContent,
            Stage::Parsing,
            Stage::Downloading { index: 0, total: 1 },
            Stage::Done,
        ]
    );
}

#[test]
fn disk_error_on_one_link_does_not_stop_the_rest() {
    let server = pdf_server::start(vec![
        ("/a.pdf", Route::ok(b"%PDF a")),
        ("/b.pdf", Route::ok(b"%PDF b")),
        ("/c.pdf", Route::ok(b"%PDF c")),
    ]);
    let out = tempdir().unwrap();
    // A directory squatting on b's temp name makes its file creation fail.
    std::fs::create_dir_all(out.path().join("b.pdf.part").join("x")).unwrap();
    let cfg = config(&server.base_url, out.path());

    let mut io_failures = Vec::new();
    let summary = Harvester::new(
        &cfg,
        StubRenderer::new(r#"<a href="a.pdf">a</a><a href="b.pdf">b</a><a href="c.pdf">c</a>"#),
    )
    .unwrap()
    .run_with(|ev| {
        if let HarvestEvent::FetchFailed { index, error, .. } = ev {
            io_failures.push((*index, matches!(error, FetchError::Io { .. })));
        }
    })
    .unwrap();

    assert_eq!(io_failures, vec![(1, true)]);
    assert_eq!(summary.downloaded, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(server.hits("/b.pdf"), 0);
    assert!(out.path().join("c.pdf").exists());
}

#[test]
fn unusable_output_dir_fails_every_link_but_completes() {
    let server = pdf_server::start(vec![("/a.pdf", Route::ok(b"a")), ("/b.pdf", Route::ok(b"b"))]);
    let out = tempdir().unwrap();
    let blocker = out.path().join("pdfs");
    std::fs::write(&blocker, b"file").unwrap();
    let cfg = config(&server.base_url, &blocker);

    let summary = Harvester::new(&cfg, StubRenderer::new(r#"<a href="a.pdf">a</a><a href="b.pdf">b</a>"#))
        .unwrap()
        .run()
        .expect("per-link I/O errors are not fatal");

    assert_eq!(summary.links_found, 2);
    assert_eq!(summary.failed, 2);
    assert_eq!(summary.succeeded(), 0);
}
