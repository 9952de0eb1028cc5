//! Rendering through a local PlantUML installation.
//!
//! Runs `{java} -jar {plantuml.jar} -tsvg -pipe -charset UTF-8`, writes the
//! block source to stdin and reads SVG from stdout.

use std::io::{self, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::backend::{DiagramBackend, DiagramOutput};
use crate::consts::DEFAULT_TIMEOUT;
use crate::error::DiagramErrorKind;

/// Interval between exit checks while waiting for the engine.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Local PlantUML backend driven through a Java runtime.
#[derive(Debug, Clone)]
pub struct LocalBackend {
    java_path: PathBuf,
    plantuml_jar: PathBuf,
    timeout: Duration,
}

impl LocalBackend {
    /// Create a backend using the given Java executable.
    #[must_use]
    pub fn new(java_path: impl Into<PathBuf>) -> Self {
        Self {
            java_path: java_path.into(),
            plantuml_jar: PathBuf::from("plantuml.jar"),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the PlantUML jar location.
    #[must_use]
    pub fn jar(mut self, plantuml_jar: impl Into<PathBuf>) -> Self {
        self.plantuml_jar = plantuml_jar.into();
        self
    }

    /// Set the per-diagram timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Java executable this backend runs.
    #[must_use]
    pub fn java_path(&self) -> &Path {
        &self.java_path
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.java_path);
        command
            .arg("-Djava.awt.headless=true")
            .arg("-jar")
            .arg(&self.plantuml_jar)
            .args(["-tsvg", "-pipe", "-charset", "UTF-8"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        command
    }
}

impl DiagramBackend for LocalBackend {
    fn name(&self) -> &'static str {
        "local"
    }

    fn render(&self, source: &str) -> Result<DiagramOutput, DiagramErrorKind> {
        let deadline = Instant::now() + self.timeout;
        let mut child = self
            .command()
            .spawn()
            .map_err(|e| DiagramErrorKind::Spawn {
                program: self.java_path.display().to_string(),
                message: e.to_string(),
            })?;

        let stdin = spawn_writer(child.stdin.take(), source.as_bytes().to_vec());
        let stdout = spawn_reader(child.stdout.take());
        let stderr = spawn_reader(child.stderr.take());

        let status = wait_until(&mut child, deadline, self.timeout)?;
        let written = join_writer(stdin);
        let stdout = join_reader(stdout);
        let stderr = join_reader(stderr);

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr).trim().to_owned();
            tracing::debug!(%status, stderr = %stderr, "Diagram engine failed");
            return Err(DiagramErrorKind::EngineFailed {
                status: status.to_string(),
                stderr,
            });
        }
        written?;

        String::from_utf8(stdout)
            .map(DiagramOutput::Rendered)
            .map_err(|e| DiagramErrorKind::InvalidUtf8(e.to_string()))
    }
}

/// Feed the source to the engine on its own thread so a full pipe cannot
/// hold off the timeout.
fn spawn_writer<W: Write + Send + 'static>(
    pipe: Option<W>,
    source: Vec<u8>,
) -> Option<JoinHandle<io::Result<()>>> {
    let mut pipe = pipe?;
    // Dropping the pipe at the end of the closure closes the engine's stdin
    Some(thread::spawn(move || pipe.write_all(&source)))
}

/// The engine may exit before draining stdin; its exit status decides.
fn join_writer(handle: Option<JoinHandle<io::Result<()>>>) -> Result<(), DiagramErrorKind> {
    match handle.map(JoinHandle::join) {
        Some(Ok(Err(e))) if e.kind() != ErrorKind::BrokenPipe => {
            Err(DiagramErrorKind::Io(e.to_string()))
        }
        Some(Err(_)) => Err(DiagramErrorKind::Io(
            "diagram source writer panicked".to_owned(),
        )),
        _ => Ok(()),
    }
}

/// Drain a child pipe on its own thread so neither stream can block the other.
fn spawn_reader<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<Vec<u8>>> {
    let mut pipe = pipe?;
    Some(thread::spawn(move || {
        let mut buf = Vec::new();
        if let Err(e) = pipe.read_to_end(&mut buf) {
            tracing::debug!(error = %e, "Failed to read diagram engine output");
        }
        buf
    }))
}

fn join_reader(handle: Option<JoinHandle<Vec<u8>>>) -> Vec<u8> {
    handle
        .and_then(|h| h.join().ok())
        .unwrap_or_default()
}

fn wait_until(
    child: &mut Child,
    deadline: Instant,
    timeout: Duration,
) -> Result<ExitStatus, DiagramErrorKind> {
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(status),
            Ok(None) if Instant::now() >= deadline => {
                kill(child);
                return Err(DiagramErrorKind::Timeout(timeout));
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(e) => {
                kill(child);
                return Err(DiagramErrorKind::Io(e.to_string()));
            }
        }
    }
}

fn kill(child: &mut Child) {
    if let Err(e) = child.kill() {
        tracing::debug!(error = %e, "Failed to kill diagram engine");
    }
    let _ = child.wait();
}
