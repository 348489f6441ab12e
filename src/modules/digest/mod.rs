//! Modules that digest input into fixed-size fingerprints.

pub mod sha256;
