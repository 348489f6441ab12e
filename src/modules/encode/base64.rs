//! Purpose: Base64-encode input chunks.
//! Exports: `Base64Encode` (registered as `encode/base64`).

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::core::error::Error;
use crate::core::input::Chunks;
use crate::core::module::{Context, Module};
use crate::core::options::OptionBag;
use crate::modules::required;

pub struct Base64Encode;

impl Module for Base64Encode {
    fn name(&self) -> &'static str {
        "base64"
    }

    fn summary(&self) -> &'static str {
        "encode input as base64"
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
            chunk.map(|data| STANDARD.encode(&data).into_bytes())
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::Base64Encode;
    use crate::core::env::SystemEnv;
    use crate::core::input::Chunks;
    use crate::core::module::{Context, Module};
    use crate::core::options::OptionBag;

    #[test]
    fn encodes_each_chunk_independently() {
        let env = SystemEnv::new();
        let input = Chunks::new(
            vec![Ok(b"abcd\n".to_vec()), Ok(b"efgh\n".to_vec())].into_iter(),
        );
        let out = Base64Encode
            .handle(&mut Context::new(&env), Some(input), &OptionBag::default())
            .expect("handle");
        let lines: Vec<Vec<u8>> = out.map(|chunk| chunk.expect("chunk")).collect();
        assert_eq!(lines, vec![b"YWJjZAo=".to_vec(), b"ZWZnaAo=".to_vec()]);
    }

    #[test]
    fn whole_buffer_encodes_to_one_chunk() {
        let env = SystemEnv::new();
        let input = Chunks::once(b"abcd\nefgh\n".to_vec());
        let out = Base64Encode
            .handle(&mut Context::new(&env), Some(input), &OptionBag::default())
            .expect("handle");
        assert_eq!(out.concat().expect("drain"), b"YWJjZAplZmdoCg==");
    }
}
