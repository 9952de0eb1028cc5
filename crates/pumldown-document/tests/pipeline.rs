mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use pretty_assertions::assert_eq;
use pumldown_config::{BackendKind, DiagramsConfig, MarkdownConfig};
use pumldown_diagrams::DiagramErrorKind;
use pumldown_diagrams::consts::PLACEHOLDER_PREFIX;
use pumldown_document::{
    DiagnosticsSink, Document, EMPTY_RESULT, ParseOutcome, PipelineError, markdown_pipeline,
    share, spawn_parse,
};
use pumldown_markdown::{MarkdownError, MarkdownRender};

use common::{Buffer, StubBackend, document, serve_http};

/// Markdown renderer that always fails, counting calls.
struct FailingMarkdown(Arc<AtomicUsize>);

impl MarkdownRender for FailingMarkdown {
    fn render(&mut self, _markdown: &str) -> Result<String, MarkdownError> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Err(MarkdownError::Panicked("table <overflow> & more".to_owned()))
    }
}

/// Markdown renderer that discards its input, markers included.
struct ForgetfulMarkdown;

impl MarkdownRender for ForgetfulMarkdown {
    fn render(&mut self, _markdown: &str) -> Result<String, MarkdownError> {
        Ok("<p>rendered</p>\n".to_owned())
    }
}

/// Diagnostics sink keeping reported messages.
#[derive(Default)]
struct RecordingDiagnostics(Mutex<Vec<String>>);

impl DiagnosticsSink for RecordingDiagnostics {
    fn report(&self, error: &PipelineError) {
        self.0.lock().unwrap().push(error.report());
    }
}

#[test]
fn test_unchanged_text_renders_once() {
    let buffer = Buffer::new("# Notes\n\n@startuml\nA -> B\n@enduml\n");
    let backend = StubBackend::fixed("<svg>OK</svg>");
    let mut doc = document(&buffer, DiagramsConfig::default()).with_backend(backend.clone());
    let notifications = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&notifications);
    doc.on_parsed(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    assert_eq!(doc.parse(), ParseOutcome::Rendered);
    let first = doc.parsed_result().to_owned();

    // Surrounding whitespace does not count as a change
    buffer.set("\n\n# Notes\n\n@startuml\nA -> B\n@enduml  \n\n");
    assert_eq!(doc.parse(), ParseOutcome::Unchanged);

    assert_eq!(doc.parsed_result(), first);
    assert_eq!(backend.calls(), 1);
    assert_eq!(notifications.load(Ordering::SeqCst), 1);
}

#[test]
fn test_whitespace_only_input_is_empty() {
    let buffer = Buffer::new("  \n\t \n");
    let mut doc = document(&buffer, DiagramsConfig::default());

    assert_eq!(doc.parse(), ParseOutcome::Rendered);
    assert_eq!(doc.parsed_result(), EMPTY_RESULT);
    assert_eq!(doc.parsed_result(), "Empty");
    assert!(doc.success());

    assert_eq!(doc.parse(), ParseOutcome::Unchanged);
}

#[test]
fn test_every_block_substituted() {
    let buffer = Buffer::new(
        "# Diagrams\n\n@startuml Seq\nA -> B\n@enduml\n\n@startuml Seq\nB -> C\n@enduml\n\n\
         @startmindmap\n* root\n@endmindmap\n\n@startgantt\n[T] lasts 1 day\n@endgantt\n\n\
         @startwbs\n* W\n@endwbs\n\n@startjson\n{\"a\": 1}\n@endjson\n",
    );
    let backend = StubBackend::new(|source| {
        let body = source.lines().nth(1).unwrap_or_default();
        Ok(format!("<svg data-body=\"{}\"></svg>", body.len()))
    });
    let mut doc = document(&buffer, DiagramsConfig::default()).with_backend(backend.clone());

    assert_eq!(doc.parse(), ParseOutcome::Rendered);
    let html = doc.parsed_result();

    assert_eq!(backend.calls(), 6);
    assert_eq!(html.matches("<svg ").count(), 6);
    assert!(!html.contains(PLACEHOLDER_PREFIX), "{html}");
    assert!(!html.contains("@start"));
    assert!(html.starts_with("<h1>Diagrams</h1>"));
}

#[test]
fn test_unterminated_block_rendered_as_text() {
    let buffer = Buffer::new("@startuml\nA -> B\nstill no end");
    let backend = StubBackend::fixed("<svg/>");
    let mut doc = document(&buffer, DiagramsConfig::default()).with_backend(backend.clone());

    assert_eq!(doc.parse(), ParseOutcome::Rendered);
    assert_eq!(
        doc.parsed_result(),
        "<p>@startuml\nA -&gt; B\nstill no end</p>\n"
    );
    assert_eq!(backend.calls(), 0);
}

#[test]
fn test_block_inside_code_fence_is_rendered() {
    let buffer = Buffer::new("Intro\n\n```plantuml\n@startuml\nA -> B\n@enduml\n```\n");
    let mut doc = document(&buffer, DiagramsConfig::default())
        .with_backend(StubBackend::fixed("<svg>fenced</svg>"));

    doc.parse();

    assert_eq!(doc.parsed_result(), "<p>Intro</p>\n<svg>fenced</svg>\n");
}

#[test]
fn test_markdown_failure_yields_fragment_and_keeps_cache() {
    let buffer = Buffer::new("# Title");
    let calls = Arc::new(AtomicUsize::new(0));
    let diagnostics = Arc::new(RecordingDiagnostics::default());
    let mut doc = document(&buffer, DiagramsConfig::default())
        .with_markdown_renderer(Box::new(FailingMarkdown(Arc::clone(&calls))))
        .with_diagnostics(diagnostics.clone());
    let notified = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&notified);
    doc.on_parsed(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    assert_eq!(doc.parse(), ParseOutcome::Failed);

    assert_eq!(
        doc.parsed_result(),
        "<p>An unexpected exception occurred:</p><pre>markdown rendering failed\n\
         caused by: markdown renderer panicked: table &lt;overflow&gt; &amp; more</pre>"
    );
    assert!(!doc.success());
    assert!(!doc.is_parsing());
    assert_eq!(doc.last_parsed(), None);
    assert_eq!(notified.load(Ordering::SeqCst), 0);
    assert_eq!(diagnostics.0.lock().unwrap().len(), 1);

    // Same failing text is attempted again, not skipped
    assert_eq!(doc.parse(), ParseOutcome::Failed);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_failed_block_fails_whole_document() {
    let buffer = Buffer::new("@startuml Good\nA\n@enduml\n\n@startuml Broken\nB\n@enduml");
    let backend = StubBackend::new(|source| {
        if source.contains("Broken") {
            Err(DiagramErrorKind::EngineFailed {
                status: "exit status: 1".to_owned(),
                stderr: "Syntax Error?".to_owned(),
            })
        } else {
            Ok("<svg/>".to_owned())
        }
    });
    let mut doc = document(&buffer, DiagramsConfig::default()).with_backend(backend);

    assert_eq!(doc.parse(), ParseOutcome::Failed);
    let html = doc.parsed_result();
    assert!(html.starts_with("<p>An unexpected exception occurred:</p>"));
    assert!(html.contains("caused by: diagram Broken"), "{html}");
    assert!(html.contains("Syntax Error?"));
}

#[test]
fn test_remote_server_error_isolated_to_block() {
    let url = serve_http(|body| {
        if body.contains("Broken") {
            (500, "internal error".to_owned())
        } else {
            (200, "<svg>remote</svg>".to_owned())
        }
    });
    let buffer = Buffer::new(
        "Before\n\n@startuml Good\nA -> B\n@enduml\n\nMiddle\n\n@startuml Broken\n?\n@enduml\n\nAfter",
    );
    let config = DiagramsConfig {
        backend: BackendKind::Remote,
        remote_url: Some(url),
        timeout: Duration::from_secs(5),
        ..DiagramsConfig::default()
    };
    let mut doc = document(&buffer, config);

    assert_eq!(doc.parse(), ParseOutcome::Rendered);
    assert!(doc.success());
    assert_eq!(
        doc.parsed_result(),
        "<p>Before</p>\n<svg>remote</svg>\n<p>Middle</p>\nError\n<p>After</p>\n"
    );
}

#[test]
fn test_rendered_diagrams_reused_across_edits() {
    let buffer = Buffer::new("v1\n\n@startuml\nA -> B\n@enduml");
    let backend = StubBackend::fixed("<svg/>");
    let mut doc = document(&buffer, DiagramsConfig::default()).with_backend(backend.clone());

    doc.parse();
    buffer.set("v2\n\n@startuml\nA -> B\n@enduml");
    assert_eq!(doc.parse(), ParseOutcome::Rendered);

    assert_eq!(doc.parsed_result(), "<p>v2</p>\n<svg/>\n");
    assert_eq!(backend.calls(), 1);
}

#[test]
fn test_diagram_cache_disabled() {
    let buffer = Buffer::new("v1\n\n@startuml\nA -> B\n@enduml");
    let backend = StubBackend::fixed("<svg/>");
    let config = DiagramsConfig {
        cache_enabled: false,
        ..DiagramsConfig::default()
    };
    let mut doc = document(&buffer, config).with_backend(backend.clone());

    doc.parse();
    buffer.set("v2\n\n@startuml\nA -> B\n@enduml");
    doc.parse();

    assert_eq!(backend.calls(), 2);
}

#[test]
fn test_spawn_parse_notifies_subscribers() {
    let buffer = Buffer::new("*async*");
    let mut doc = document(&buffer, DiagramsConfig::default());
    let (tx, rx) = mpsc::channel();
    doc.on_parsed(move |d| {
        let _ = tx.send(d.parsed_result().to_owned());
    });
    let shared = share(doc);

    spawn_parse(&shared);

    let html = rx.recv_timeout(Duration::from_secs(10)).unwrap();
    assert_eq!(html, "<p><em>async</em></p>\n");
    assert!(!shared.lock().unwrap().is_parsing());
}

#[test]
fn test_inline_block_with_arrow_label_is_substituted() {
    let buffer = Buffer::new("See @startuml a-->b\nA -> B\n@enduml here");
    let backend = StubBackend::fixed("<svg>OK</svg>");
    let mut doc = document(&buffer, DiagramsConfig::default()).with_backend(backend);

    assert_eq!(doc.parse(), ParseOutcome::Rendered);
    let html = doc.parsed_result();
    assert_eq!(html, "<p>See <svg>OK</svg> here</p>\n");
    assert!(!html.contains(PLACEHOLDER_PREFIX));
}

#[test]
fn test_lost_marker_fails_document() {
    let buffer = Buffer::new("@startuml Lost\nA -> B\n@enduml");
    let diagnostics = Arc::new(RecordingDiagnostics::default());
    let mut doc = document(&buffer, DiagramsConfig::default())
        .with_markdown_renderer(Box::new(ForgetfulMarkdown))
        .with_backend(StubBackend::fixed("<svg>OK</svg>"))
        .with_diagnostics(Arc::clone(&diagnostics) as Arc<dyn DiagnosticsSink>);

    assert_eq!(doc.parse(), ParseOutcome::Failed);
    assert!(!doc.success());
    let html = doc.parsed_result();
    assert!(html.starts_with("<p>An unexpected exception occurred:</p>"));
    assert!(html.contains("caused by: diagram Lost"), "{html}");
    assert!(html.contains("placeholder marker missing"), "{html}");
    assert_eq!(diagnostics.0.lock().unwrap().len(), 1);
}

#[test]
fn test_queued_background_parses_all_complete() {
    const BLOCKS: usize = 16;
    const PARSES: usize = 20;

    // Every pull yields new text, so no parse is skipped as unchanged
    let revision = Arc::new(AtomicUsize::new(0));
    let pulls = Arc::clone(&revision);
    let text_source = move || {
        let n = pulls.fetch_add(1, Ordering::SeqCst);
        let mut text = format!("# Revision {n}\n\n");
        for i in 0..BLOCKS {
            text.push_str(&format!("@startuml Block{i}\nA -> B{n}\n@enduml\n\n"));
        }
        text
    };
    let backend = StubBackend::new(|_| {
        thread::sleep(Duration::from_millis(20));
        Ok("<svg>OK</svg>".to_owned())
    });
    let pipeline = markdown_pipeline(MarkdownConfig {
        line_markers: false,
        emoji: false,
        front_matter: true,
    });
    let mut doc = Document::new(text_source, Arc::new(pipeline), DiagramsConfig::default())
        .with_backend(backend);
    let (tx, rx) = mpsc::channel();
    doc.on_parsed(move |d| {
        let _ = tx.send(d.parsed_result().to_owned());
    });
    let shared = share(doc);

    for _ in 0..PARSES {
        spawn_parse(&shared);
    }

    for completed in 0..PARSES {
        let html = rx
            .recv_timeout(Duration::from_secs(30))
            .unwrap_or_else(|e| panic!("{completed}/{PARSES} parses completed: {e}"));
        assert_eq!(html.matches("<svg>OK</svg>").count(), BLOCKS);
        assert!(!html.contains(PLACEHOLDER_PREFIX));
    }
    assert_eq!(revision.load(Ordering::SeqCst), PARSES);
}
