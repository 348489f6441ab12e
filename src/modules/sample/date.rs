//! Purpose: Print the system date via the subprocess capability.
//! Exports: `Date` (registered as `sample/date`).
//! Role: Demonstrates a module with an external command requirement and no
//! input.

use crate::core::env::Requirement;
use crate::core::error::Error;
use crate::core::input::Chunks;
use crate::core::module::{Context, Module};
use crate::core::options::{OptionBag, OptionDecls};

pub struct Date;

impl Module for Date {
    fn name(&self) -> &'static str {
        "date"
    }

    fn summary(&self) -> &'static str {
        "print the system date"
    }

    fn declare_options(&self, decls: &mut OptionDecls) {
        decls.flag("utc", Some('u'), "print the date in UTC");
        // Input knobs mean nothing here; keep them out of the help text.
        decls.suppress("iterate");
    }

    fn requirements(&self) -> Vec<Requirement> {
        vec![Requirement::command("date")]
    }

    fn handle(
        &self,
        ctx: &mut Context<'_>,
        _input: Option<Chunks>,
        opts: &OptionBag,
    ) -> Result<Chunks, Error> {
        let mut args = Vec::new();
        if opts.bool("utc")? {
            args.push("-u".to_string());
        }
        ctx.env().run_command("date", &args, None)
    }
}
