//! Purpose: Hex-encode input chunks.
//! Exports: `HexEncode` (registered as `encode/hex`).

use crate::core::error::Error;
use crate::core::input::Chunks;
use crate::core::module::{Context, Module};
use crate::core::options::OptionBag;
use crate::modules::required;

pub struct HexEncode;

impl Module for HexEncode {
    fn name(&self) -> &'static str {
        "hex"
    }

    fn summary(&self) -> &'static str {
        "encode input as lowercase hex"
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
            chunk.map(|data| hex::encode(&data).into_bytes())
        })))
    }
}
