//! Purpose: Pass input through unchanged.
//! Exports: `Echo` (registered as `sample/echo`).

use crate::core::error::Error;
use crate::core::input::Chunks;
use crate::core::module::{Context, Module};
use crate::core::options::OptionBag;
use crate::modules::required;

pub struct Echo;

impl Module for Echo {
    fn name(&self) -> &'static str {
        "echo"
    }

    fn summary(&self) -> &'static str {
        "output input unchanged"
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
        required(input)
    }
}
