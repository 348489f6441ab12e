//! Purpose: Base64-decode input chunks.
//! Exports: `Base64Decode` (registered as `decode/base64`).

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::core::error::{Error, ErrorKind};
use crate::core::input::Chunks;
use crate::core::module::{Context, Module};
use crate::core::options::OptionBag;
use crate::modules::{required, trim_ascii_whitespace};

pub struct Base64Decode;

impl Module for Base64Decode {
    fn name(&self) -> &'static str {
        "base64"
    }

    fn summary(&self) -> &'static str {
        "decode base64 input"
    }

    fn input_required(&self) -> bool {
        true
    }

    fn handle(
        &self,
        _ctx: &mut Context<'_>,
        input: Option<Chunks>,
        _opts: &OptionBag,
    ) -> Result<Chunks, Error> {
        let input = required(input)?;
        Ok(Chunks::new(input.map(|chunk| {
            chunk.and_then(|data| {
                STANDARD
                    .decode(trim_ascii_whitespace(&data))
                    .map_err(|err| {
                        Error::new(ErrorKind::Value)
                            .with_message("input is not valid base64")
                            .with_source(err)
                    })
            })
        })))
    }
}
