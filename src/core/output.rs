//! Purpose: Assemble a module's output stream for delivery to a sink.
//! Exports: `collect`, `write_stream`.
//! Role: Output boundary of the CLI path; the library path hands streams to
//! the caller untouched.
//! Invariants: Without `generate` the stream is written as one contiguous
//! buffer; with it, each chunk is written as its own newline-terminated record.
//! Invariants: A broken pipe on the sink ends delivery cleanly; downstream
//! closing early is not an error.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

use crate::core::error::{Error, ErrorKind};
use crate::core::input::Chunks;

/// Materialize a stream into one buffer.
pub fn collect(stream: Chunks) -> Result<Vec<u8>, Error> {
    stream.concat()
}

/// Drain a module's output into a writer. The `interrupt` flag is checked
/// between pulls so a signal lands between records, never mid-write.
pub fn write_stream<W: Write>(
    stream: Chunks,
    out: &mut W,
    generate: bool,
    interrupt: &AtomicBool,
) -> Result<(), Error> {
    if generate {
        for chunk in stream {
            if interrupt.load(Ordering::Relaxed) {
                return Err(Error::new(ErrorKind::Interrupted));
            }
            let mut chunk = chunk?;
            if chunk.is_empty() {
                continue;
            }
            if chunk.last() != Some(&b'\n') {
                chunk.push(b'\n');
            }
            match deliver(out, &chunk) {
                Delivery::Written => {}
                Delivery::PipeClosed => return Ok(()),
                Delivery::Failed(err) => return Err(err),
            }
        }
        return Ok(());
    }

    let mut buffer = Vec::new();
    for chunk in stream {
        if interrupt.load(Ordering::Relaxed) {
            return Err(Error::new(ErrorKind::Interrupted));
        }
        buffer.extend_from_slice(&chunk?);
    }
    match deliver(out, &buffer) {
        Delivery::Written | Delivery::PipeClosed => Ok(()),
        Delivery::Failed(err) => Err(err),
    }
}

enum Delivery {
    Written,
    PipeClosed,
    Failed(Error),
}

fn deliver<W: Write>(out: &mut W, data: &[u8]) -> Delivery {
    let result = out.write_all(data).and_then(|()| out.flush());
    match result {
        Ok(()) => Delivery::Written,
        Err(err) if err.kind() == io::ErrorKind::BrokenPipe => {
            debug!("output pipe closed; stopping delivery");
            Delivery::PipeClosed
        }
        Err(err) => Delivery::Failed(
            Error::new(ErrorKind::Io)
                .with_message("failed to write output")
                .with_source(err),
        ),
    }
}
