//! Shared helpers for pipeline integration tests.

#![allow(dead_code)]

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use pumldown_config::{DiagramsConfig, MarkdownConfig};
use pumldown_diagrams::{DiagramBackend, DiagramErrorKind, DiagramOutput};
use pumldown_document::{Document, markdown_pipeline};

/// Backend answering with a function of the block source.
pub struct StubBackend {
    reply: Box<dyn Fn(&str) -> Result<String, DiagramErrorKind> + Send + Sync>,
    pub calls: AtomicUsize,
}

impl StubBackend {
    pub fn new(
        reply: impl Fn(&str) -> Result<String, DiagramErrorKind> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            reply: Box::new(reply),
            calls: AtomicUsize::new(0),
        })
    }

    /// Backend returning the same markup for every block.
    pub fn fixed(markup: &'static str) -> Arc<Self> {
        Self::new(move |_| Ok(markup.to_owned()))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl DiagramBackend for StubBackend {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn render(&self, source: &str) -> Result<DiagramOutput, DiagramErrorKind> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.reply)(source).map(DiagramOutput::Rendered)
    }
}

/// Host text buffer the document pulls from.
#[derive(Clone, Default)]
pub struct Buffer(Arc<Mutex<String>>);

impl Buffer {
    pub fn new(text: &str) -> Self {
        Self(Arc::new(Mutex::new(text.to_owned())))
    }

    pub fn set(&self, text: &str) {
        *self.0.lock().unwrap() = text.to_owned();
    }

    pub fn get(&self) -> String {
        self.0.lock().unwrap().clone()
    }
}

/// Document over `buffer` with line markers and emoji disabled.
pub fn document(buffer: &Buffer, diagrams: DiagramsConfig) -> Document {
    let buffer = buffer.clone();
    let pipeline = markdown_pipeline(MarkdownConfig {
        line_markers: false,
        emoji: false,
        front_matter: true,
    });
    Document::new(move || buffer.get(), Arc::new(pipeline), diagrams)
}

/// Start a loopback HTTP server; `respond` maps a request body to status and body.
///
/// Returns the server base URL.
pub fn serve_http(respond: impl Fn(&str) -> (u16, String) + Send + Sync + 'static) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}/", listener.local_addr().unwrap());
    let respond = Arc::new(respond);

    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(stream) = stream else { break };
            let respond = Arc::clone(&respond);
            thread::spawn(move || handle_connection(stream, respond.as_ref()));
        }
    });

    url
}

fn handle_connection(stream: TcpStream, respond: &(dyn Fn(&str) -> (u16, String) + Send + Sync)) {
    let mut reader = BufReader::new(stream);
    let mut content_length = 0;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).unwrap_or(0) == 0 {
            return;
        }
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':')
            && name.eq_ignore_ascii_case("content-length")
        {
            content_length = value.trim().parse().unwrap_or(0);
        }
    }

    let mut body = vec![0; content_length];
    if reader.read_exact(&mut body).is_err() {
        return;
    }
    let (status, reply) = respond(&String::from_utf8_lossy(&body));

    let mut stream = reader.into_inner();
    let response = format!(
        "HTTP/1.1 {status} Stub\r\nContent-Type: image/svg+xml\r\nContent-Length: {}\r\n\
         Connection: close\r\n\r\n{reply}",
        reply.len()
    );
    let _ = stream.write_all(response.as_bytes());
}
