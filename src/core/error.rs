//! Purpose: Shared error type for the dispatch core and the module catalog.
//! Exports: `Error`, `ErrorKind`, `to_exit_code`.
//! Role: Single error channel; every fallible core operation returns this type.
//! Invariants: Exit codes are stable across releases (scripts depend on them).
//! Invariants: Errors surfaced from a running module carry the module's path.

use std::error::Error as StdError;
use std::fmt;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    Internal,
    Usage,
    InvalidPath,
    NotFound,
    BadModule,
    Value,
    Key,
    InputRequired,
    Environment,
    Io,
    Interrupted,
}

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    message: Option<String>,
    module: Option<String>,
    hint: Option<String>,
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            module: None,
            hint: None,
            source: None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn module(&self) -> Option<&str> {
        self.module.as_deref()
    }

    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Tag the error with the path of the module it surfaced from.
    /// The first tag wins; a wrapped error keeps its original origin.
    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        if self.module.is_none() {
            self.module = Some(module.into());
        }
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.kind)?;
        if let Some(module) = &self.module {
            write!(f, " [{module}]")?;
        }
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|source| source.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::new(ErrorKind::Io)
            .with_message("i/o failure")
            .with_source(err)
    }
}

pub fn to_exit_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::Internal => 1,
        ErrorKind::Usage => 2,
        ErrorKind::InvalidPath => 3,
        ErrorKind::NotFound => 4,
        ErrorKind::BadModule => 5,
        ErrorKind::Value => 6,
        ErrorKind::Key => 7,
        ErrorKind::InputRequired => 8,
        ErrorKind::Environment => 9,
        ErrorKind::Io => 10,
        ErrorKind::Interrupted => 130,
    }
}
