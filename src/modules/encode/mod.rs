//! Modules that encode raw bytes into printable representations.

pub mod base64;
pub mod hex;
