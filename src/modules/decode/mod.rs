//! Modules that decode printable representations back to raw bytes.

pub mod base64;
pub mod hex;
