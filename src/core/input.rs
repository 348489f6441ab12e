//! Purpose: Normalize heterogeneous raw inputs into one lazy byte-chunk stream.
//! Exports: `Input`, `Chunks`, `normalize`.
//! Role: Input boundary of the runtime; isolates source shapes from modules.
//! Invariants: Chunks are pulled forward-only and exactly once.
//! Invariants: Iteration granularity is the caller's choice (`iterate`), never
//! a property of the source: a pre-chunked source is merged when not iterating.
//! Invariants: A producer element failure surfaces at the point it is pulled.

use std::fmt;
use std::io::{self, BufRead, BufReader, IsTerminal, Read};

use crate::core::error::{Error, ErrorKind};

/// The raw shapes a caller may hand to the framework.
///
/// `Producer` elements are `Result`s so that a lazily-generated source can
/// fail per element; the error is observed when that element is pulled, not
/// when the producer is handed over.
pub enum Input {
    None,
    Bytes(Vec<u8>),
    Text(String),
    List(Vec<Vec<u8>>),
    Producer(Box<dyn Iterator<Item = Result<Vec<u8>, Error>> + Send>),
    Reader(Box<dyn Read + Send>),
    Stdin,
}

impl From<Vec<u8>> for Input {
    fn from(data: Vec<u8>) -> Self {
        Input::Bytes(data)
    }
}

impl From<&[u8]> for Input {
    fn from(data: &[u8]) -> Self {
        Input::Bytes(data.to_vec())
    }
}

impl<const N: usize> From<&[u8; N]> for Input {
    fn from(data: &[u8; N]) -> Self {
        Input::Bytes(data.to_vec())
    }
}

impl From<String> for Input {
    fn from(text: String) -> Self {
        Input::Text(text)
    }
}

impl From<&str> for Input {
    fn from(text: &str) -> Self {
        Input::Text(text.to_string())
    }
}

impl From<Vec<Vec<u8>>> for Input {
    fn from(list: Vec<Vec<u8>>) -> Self {
        Input::List(list)
    }
}

/// The canonical lazy sequence of byte chunks flowing through a module.
pub struct Chunks {
    inner: Box<dyn Iterator<Item = Result<Vec<u8>, Error>> + Send>,
}

impl Chunks {
    pub fn new<I>(inner: I) -> Self
    where
        I: Iterator<Item = Result<Vec<u8>, Error>> + Send + 'static,
    {
        Self {
            inner: Box::new(inner),
        }
    }

    pub fn empty() -> Self {
        Chunks::new(std::iter::empty())
    }

    pub fn once(chunk: Vec<u8>) -> Self {
        Chunks::new(std::iter::once(Ok(chunk)))
    }

    /// Drain the sequence into one buffer, stopping at the first failure.
    pub fn concat(self) -> Result<Vec<u8>, Error> {
        let mut out = Vec::new();
        for chunk in self {
            out.extend_from_slice(&chunk?);
        }
        Ok(out)
    }
}

impl Iterator for Chunks {
    type Item = Result<Vec<u8>, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

/// Opaque: inspecting the stream would consume it.
impl fmt::Debug for Chunks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Chunks(..)")
    }
}

/// Convert a raw input into the canonical chunk sequence.
///
/// Returns `None` when no input is present at all: `Input::None`, or stdin
/// attached to an interactive terminal with nothing piped in. Modules that
/// require data use this to fail with a clear error instead of hanging.
pub fn normalize(input: Input, iterate: bool) -> Option<Chunks> {
    let chunks = match input {
        Input::None => return None,
        Input::Stdin => {
            let stdin = io::stdin();
            if stdin.is_terminal() {
                return None;
            }
            reader_lines(BufReader::new(stdin))
        }
        Input::Bytes(data) => split_lines(data),
        Input::Text(text) => split_lines(text.into_bytes()),
        Input::List(list) => Chunks::new(list.into_iter().map(Ok)),
        Input::Producer(producer) => Chunks { inner: producer },
        Input::Reader(reader) => reader_lines(BufReader::new(reader)),
    };

    if iterate {
        Some(chunks)
    } else {
        Some(merged(chunks))
    }
}

/// Whole-buffer materialization: exactly one chunk, produced on first pull.
fn merged(chunks: Chunks) -> Chunks {
    let mut pending = Some(chunks);
    Chunks::new(std::iter::from_fn(move || {
        let chunks = pending.take()?;
        Some(chunks.concat())
    }))
}

/// Newline-inclusive splitting of an owned buffer. A trailing partial line
/// with no terminator is still emitted.
fn split_lines(data: Vec<u8>) -> Chunks {
    let mut pos = 0usize;
    Chunks::new(std::iter::from_fn(move || {
        if pos >= data.len() {
            return None;
        }
        let end = data[pos..]
            .iter()
            .position(|byte| *byte == b'\n')
            .map(|at| pos + at + 1)
            .unwrap_or(data.len());
        let chunk = data[pos..end].to_vec();
        pos = end;
        Some(Ok(chunk))
    }))
}

/// Lazy line-chunking over a readable byte stream.
fn reader_lines<R>(reader: R) -> Chunks
where
    R: BufRead + Send + 'static,
{
    let mut reader = reader;
    let mut done = false;
    Chunks::new(std::iter::from_fn(move || {
        if done {
            return None;
        }
        let mut line = Vec::new();
        match reader.read_until(b'\n', &mut line) {
            Ok(0) => {
                done = true;
                None
            }
            Ok(_) => Some(Ok(line)),
            Err(err) => {
                done = true;
                Some(Err(Error::new(ErrorKind::Io)
                    .with_message("failed to read input")
                    .with_source(err)))
            }
        }
    }))
}
