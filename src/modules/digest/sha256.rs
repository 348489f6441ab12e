//! Purpose: SHA-256 digest of input chunks.
//! Exports: `Sha256Digest` (registered as `digest/sha256`).

use sha2::{Digest, Sha256};

use crate::core::error::Error;
use crate::core::input::Chunks;
use crate::core::module::{Context, Module};
use crate::core::options::OptionBag;
use crate::modules::required;

pub struct Sha256Digest;

impl Module for Sha256Digest {
    fn name(&self) -> &'static str {
        "sha256"
    }

    fn summary(&self) -> &'static str {
        "hex SHA-256 digest of input"
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
            chunk.map(|data| hex::encode(Sha256::digest(&data)).into_bytes())
        })))
    }
}
