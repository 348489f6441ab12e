//! Purpose: The builtin module catalog.
//! Exports: `builtin`, plus the per-domain submodules.
//! Role: Peripheral plugin library; everything here implements `Module` and
//! registers under the builtin search root. The core never imports this
//! module except through the registry.

pub mod decode;
pub mod digest;
pub mod encode;
pub mod sample;

use std::sync::Arc;

use crate::core::error::{Error, ErrorKind};
use crate::core::input::Chunks;
use crate::core::module::Module;
use crate::core::registry::SearchRoot;

/// The default search root: every builtin module, registered by path.
pub fn builtin() -> SearchRoot {
    SearchRoot::new("builtin")
        .module("encode/base64", || {
            Ok(Arc::new(encode::base64::Base64Encode) as Arc<dyn Module>)
        })
        .module("decode/base64", || {
            Ok(Arc::new(decode::base64::Base64Decode) as Arc<dyn Module>)
        })
        .module("encode/hex", || {
            Ok(Arc::new(encode::hex::HexEncode) as Arc<dyn Module>)
        })
        .module("decode/hex", || {
            Ok(Arc::new(decode::hex::HexDecode) as Arc<dyn Module>)
        })
        .module("digest/sha256", || {
            Ok(Arc::new(digest::sha256::Sha256Digest) as Arc<dyn Module>)
        })
        .module("sample/echo", || {
            Ok(Arc::new(sample::echo::Echo) as Arc<dyn Module>)
        })
        .module("sample/flip", || {
            Ok(Arc::new(sample::flip::Flip) as Arc<dyn Module>)
        })
        .module("sample/date", || {
            Ok(Arc::new(sample::date::Date) as Arc<dyn Module>)
        })
}

/// Unwrap the input a data-required module was promised. The runtime rejects
/// the no-input case first, so this only fires on direct misuse of `handle`.
pub(crate) fn required(input: Option<Chunks>) -> Result<Chunks, Error> {
    input.ok_or_else(|| {
        Error::new(ErrorKind::InputRequired).with_message("must provide data as input")
    })
}

/// Strip leading and trailing ASCII whitespace, keeping interior bytes.
/// Decoders use this so newline-terminated line chunks decode cleanly.
pub(crate) fn trim_ascii_whitespace(data: &[u8]) -> &[u8] {
    let start = data
        .iter()
        .position(|byte| !byte.is_ascii_whitespace())
        .unwrap_or(data.len());
    let end = data
        .iter()
        .rposition(|byte| !byte.is_ascii_whitespace())
        .map(|at| at + 1)
        .unwrap_or(start);
    &data[start..end]
}
