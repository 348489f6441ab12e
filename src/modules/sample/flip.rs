//! Purpose: Reverse each input chunk, in configurable byte groups.
//! Exports: `Flip` (registered as `sample/flip`).
//! Invariants: A trailing newline stays at the end of its chunk, so flipped
//! lines remain lines.

use crate::core::error::{Error, ErrorKind};
use crate::core::input::Chunks;
use crate::core::module::{Context, Module};
use crate::core::options::{OptionBag, OptionDecls};
use crate::modules::required;

pub struct Flip;

impl Module for Flip {
    fn name(&self) -> &'static str {
        "flip"
    }

    fn summary(&self) -> &'static str {
        "reverse each input chunk"
    }

    fn declare_options(&self, decls: &mut OptionDecls) {
        decls.int("count", Some('c'), "reverse in groups of this many bytes", 1);
    }

    fn input_required(&self) -> bool {
        true
    }

    fn handle(
        &self,
        _ctx: &mut Context<'_>,
        input: Option<Chunks>,
        opts: &OptionBag,
    ) -> Result<Chunks, Error> {
        let count = opts.int("count")?;
        if count < 1 {
            return Err(Error::new(ErrorKind::Value)
                .with_message(format!("option 'count': must be positive, got {count}")));
        }
        let width = count as usize;

        let input = required(input)?;
        Ok(Chunks::new(input.map(move |chunk| {
            chunk.map(|data| flip(&data, width))
        })))
    }
}

fn flip(data: &[u8], width: usize) -> Vec<u8> {
    let (body, tail) = match data.split_last() {
        Some((&b'\n', body)) => (body, &b"\n"[..]),
        _ => (data, &b""[..]),
    };
    let mut out = Vec::with_capacity(data.len());
    for group in body.chunks(width).rev() {
        out.extend_from_slice(group);
    }
    out.extend_from_slice(tail);
    out
}
