//! Purpose: Generic dispatch machinery, independent of any concrete module.
//! Exports: the error, input, option, module, registry, runtime, output, and
//! environment submodules plus their primary types.
//! Role: Everything here is catalog-agnostic; `crate::modules` plugs in below.

pub mod env;
pub mod error;
pub mod input;
pub mod module;
pub mod options;
pub mod output;
pub mod registry;
pub mod runtime;

pub use env::{ContainerEngine, Environment, Requirement, SystemEnv};
pub use error::{to_exit_code, Error, ErrorKind};
pub use input::{normalize, Chunks, Input};
pub use module::{declared_options, Context, Module};
pub use options::{
    bag_from_matches, module_command, parse_kwargs, Kwargs, OptionBag, OptionDecls, OptionKind,
    OptionSpec, OptionValue, RESERVED_KWARGS,
};
pub use output::{collect, write_stream};
pub use registry::{Registry, SearchRoot};
pub use runtime::Invocation;
