//! Purpose: Hex-decode input chunks.
//! Exports: `HexDecode` (registered as `decode/hex`).

use crate::core::error::{Error, ErrorKind};
use crate::core::input::Chunks;
use crate::core::module::{Context, Module};
use crate::core::options::OptionBag;
use crate::modules::{required, trim_ascii_whitespace};

pub struct HexDecode;

impl Module for HexDecode {
    fn name(&self) -> &'static str {
        "hex"
    }

    fn summary(&self) -> &'static str {
        "decode hex input"
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
                hex::decode(trim_ascii_whitespace(&data)).map_err(|err| {
                    Error::new(ErrorKind::Value)
                        .with_message("input is not valid hex")
                        .with_source(err)
                })
            })
        })))
    }
}
