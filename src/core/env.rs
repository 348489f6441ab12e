//! Purpose: Model external capabilities a module may depend on.
//! Exports: `Requirement`, `Environment`, `ContainerEngine`, `SystemEnv`.
//! Role: Composition seam for subprocess and container collaborators; the
//! runtime checks declared requirements here before a transform starts.
//! Invariants: A missing capability surfaces as an `Environment` error,
//! never a crash.
//! Invariants: Subprocess output is streamed lazily; the child's exit status
//! is checked when its stream is drained.

use std::io::{Read, Write};
use std::path::Path;
use std::process::{Child, Command, Stdio};

use tracing::debug;

use crate::core::error::{Error, ErrorKind};
use crate::core::input::Chunks;

/// An external capability declared by a module.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Requirement {
    /// A program that must be present on PATH.
    Command(String),
    /// A container image that must be obtainable by the configured engine.
    Image(String),
}

impl Requirement {
    pub fn command(name: &str) -> Self {
        Requirement::Command(name.to_string())
    }

    pub fn image(tag: &str) -> Self {
        Requirement::Image(tag.to_string())
    }
}

/// Opaque collaborator that runs ephemeral isolated processes from images
/// and returns their log stream. Lifecycle management stays outside the
/// framework; modules own their own acquisition fallback chains.
pub trait ContainerEngine: Send + Sync {
    fn ensure_image(&self, tag: &str) -> Result<(), Error>;
    fn run(&self, image: &str, command: &[String]) -> Result<Chunks, Error>;
}

/// Framework-provided capability surface handed to modules via `Context`.
pub trait Environment: Send + Sync {
    /// Verify a declared requirement can be satisfied.
    fn ensure(&self, requirement: &Requirement) -> Result<(), Error>;

    /// Run a local program, optionally feeding it stdin, and stream its
    /// stdout lazily.
    fn run_command(
        &self,
        program: &str,
        args: &[String],
        stdin: Option<Vec<u8>>,
    ) -> Result<Chunks, Error>;

    /// The configured container engine, if any.
    fn container_engine(&self) -> Option<&dyn ContainerEngine> {
        None
    }
}

/// Default environment: PATH probing plus `std::process` execution, with an
/// optional container engine plugged in by the embedder.
#[derive(Default)]
pub struct SystemEnv {
    engine: Option<Box<dyn ContainerEngine>>,
}

impl SystemEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_engine(mut self, engine: Box<dyn ContainerEngine>) -> Self {
        self.engine = Some(engine);
        self
    }
}

impl Environment for SystemEnv {
    fn ensure(&self, requirement: &Requirement) -> Result<(), Error> {
        match requirement {
            Requirement::Command(name) => {
                if command_on_path(name) {
                    Ok(())
                } else {
                    Err(Error::new(ErrorKind::Environment)
                        .with_message(format!("required command not found: '{name}'"))
                        .with_hint(format!("Install '{name}' and ensure it is on PATH.")))
                }
            }
            Requirement::Image(tag) => match &self.engine {
                Some(engine) => engine.ensure_image(tag),
                None => Err(Error::new(ErrorKind::Environment)
                    .with_message(format!(
                        "no container engine configured for required image '{tag}'"
                    ))
                    .with_hint("Construct the dispatcher with a container engine.")),
            },
        }
    }

    fn run_command(
        &self,
        program: &str,
        args: &[String],
        stdin: Option<Vec<u8>>,
    ) -> Result<Chunks, Error> {
        debug!(program, "spawning command");
        let mut command = Command::new(program);
        command.args(args).stdout(Stdio::piped());
        command.stdin(if stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        });

        let mut child = command.spawn().map_err(|err| {
            Error::new(ErrorKind::Environment)
                .with_message(format!("failed to spawn '{program}'"))
                .with_source(err)
        })?;

        if let Some(data) = stdin {
            if let Some(mut pipe) = child.stdin.take() {
                // A child that stops reading early closes the pipe; that is
                // its business, not an error here.
                match pipe.write_all(&data) {
                    Ok(()) => {}
                    Err(err) if err.kind() == std::io::ErrorKind::BrokenPipe => {}
                    Err(err) => {
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(Error::new(ErrorKind::Io)
                            .with_message(format!("failed to write stdin of '{program}'"))
                            .with_source(err));
                    }
                }
            }
        }

        Ok(stream_child(child, program.to_string()))
    }

    fn container_engine(&self) -> Option<&dyn ContainerEngine> {
        self.engine.as_deref()
    }
}

fn command_on_path(name: &str) -> bool {
    if name.contains('/') {
        return Path::new(name).is_file();
    }
    let Some(path) = std::env::var_os("PATH") else {
        return false;
    };
    std::env::split_paths(&path).any(|dir| dir.join(name).is_file())
}

/// Lazily stream a child's stdout, then surface its exit status once the
/// stream is drained.
fn stream_child(child: Child, program: String) -> Chunks {
    let mut child = Some(child);
    let mut stdout = child
        .as_mut()
        .and_then(|child| child.stdout.take());

    Chunks::new(std::iter::from_fn(move || {
        if let Some(pipe) = stdout.as_mut() {
            let mut buf = vec![0u8; 8192];
            match pipe.read(&mut buf) {
                Ok(0) => {
                    stdout = None;
                }
                Ok(n) => {
                    buf.truncate(n);
                    return Some(Ok(buf));
                }
                Err(err) => {
                    stdout = None;
                    if let Some(mut proc) = child.take() {
                        let _ = proc.kill();
                        let _ = proc.wait();
                    }
                    return Some(Err(Error::new(ErrorKind::Io)
                        .with_message(format!("failed to read output of '{program}'"))
                        .with_source(err)));
                }
            }
        }

        let mut proc = child.take()?;
        match proc.wait() {
            Ok(status) if status.success() => None,
            Ok(status) => Some(Err(Error::new(ErrorKind::Environment)
                .with_message(format!("'{program}' exited with {status}")))),
            Err(err) => Some(Err(Error::new(ErrorKind::Io)
                .with_message(format!("failed to await '{program}'"))
                .with_source(err))),
        }
    }))
}
