//! Library-path contract: input normalization, the iterate/generate matrix,
//! kwarg handling, and root priority, exercised through the public API.

use modpipe::core::env::SystemEnv;
use modpipe::core::error::{Error, ErrorKind};
use modpipe::core::input::Chunks;
use modpipe::core::module::{Context, Module};
use modpipe::core::options::OptionBag;
use modpipe::core::registry::SearchRoot;
use modpipe::{invoke, CallOptions, Dispatcher, Input, Output};

use std::sync::Arc;

fn sample_list() -> Input {
    Input::from(vec![b"abcd".to_vec(), b"efgh".to_vec()])
}

fn stream_chunks(out: Output) -> Vec<Vec<u8>> {
    let Output::Stream(stream) = out else {
        panic!("expected a stream");
    };
    stream.map(|chunk| chunk.expect("chunk")).collect()
}

#[test]
fn echo_round_trips_whole_buffer() {
    let out = invoke("sample/echo", sample_list(), CallOptions::new()).expect("invoke");
    let Output::Bytes(data) = out else {
        panic!("expected bytes");
    };
    assert_eq!(data, b"abcdefgh");
}

#[test]
fn echo_round_trips_whole_buffer_as_stream() {
    let out = invoke("sample/echo", sample_list(), CallOptions::new().generate())
        .expect("invoke");
    assert_eq!(stream_chunks(out), vec![b"abcdefgh".to_vec()]);
}

#[test]
fn echo_round_trips_iterated_buffer() {
    let out = invoke("sample/echo", sample_list(), CallOptions::new().iterate())
        .expect("invoke");
    assert_eq!(out.into_bytes().expect("bytes"), b"abcdefgh");
}

#[test]
fn echo_preserves_chunk_boundaries_when_iterating_a_stream() {
    let out = invoke(
        "sample/echo",
        sample_list(),
        CallOptions::new().iterate().generate(),
    )
    .expect("invoke");
    assert_eq!(
        stream_chunks(out),
        vec![b"abcd".to_vec(), b"efgh".to_vec()]
    );
}

#[test]
fn base64_of_every_byte_value_matches_the_known_encoding() {
    let all: Vec<u8> = (0u8..=255).collect();
    let encoded = invoke("encode/base64", all.clone(), CallOptions::new())
        .expect("encode")
        .into_bytes()
        .expect("bytes");
    assert_eq!(
        encoded,
        b"AAECAwQFBgcICQoLDA0ODxAREhMUFRYXGBkaGxwdHh8gISIjJCUmJygpKissLS4vMDEyMzQ1Njc4OTo7PD0+P0BBQkNERUZHSElKS0xNTk9QUVJTVFVWV1hZWltcXV5fYGFiY2RlZmdoaWprbG1ub3BxcnN0dXZ3eHl6e3x9fn+AgYKDhIWGh4iJiouMjY6PkJGSk5SVlpeYmZqbnJ2en6ChoqOkpaanqKmqq6ytrq+wsbKztLW2t7i5uru8vb6/wMHCw8TFxsfIycrLzM3Oz9DR0tPU1dbX2Nna29zd3t/g4eLj5OXm5+jp6uvs7e7v8PHy8/T19vf4+fr7/P3+/w==".as_slice()
    );

    let decoded = invoke("decode/base64", encoded, CallOptions::new())
        .expect("decode")
        .into_bytes()
        .expect("bytes");
    assert_eq!(decoded, all);
}

#[test]
fn empty_path_is_invalid() {
    let err = invoke("", "data", CallOptions::new()).expect_err("should fail");
    assert_eq!(err.kind(), ErrorKind::InvalidPath);
}

#[test]
fn declared_kwarg_reaches_the_module() {
    let flipped = invoke(
        "sample/flip",
        &b"abcdef"[..],
        CallOptions::new().kwarg("count", 2i64),
    )
    .expect("invoke")
    .into_bytes()
    .expect("bytes");
    assert_eq!(flipped, b"efcdab");
}

#[test]
fn unrecognized_kwarg_fails_with_key_error() {
    let err = invoke(
        "sample/echo",
        "data",
        CallOptions::new().kwarg("bogus", true),
    )
    .expect_err("should fail");
    assert_eq!(err.kind(), ErrorKind::Key);
}

struct Shadow;

impl Module for Shadow {
    fn name(&self) -> &'static str {
        "echo"
    }

    fn summary(&self) -> &'static str {
        "overlay echo that shouts"
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
        let input = input.ok_or_else(|| Error::new(ErrorKind::InputRequired))?;
        Ok(Chunks::new(input.map(|chunk| {
            chunk.map(|data| data.to_ascii_uppercase())
        })))
    }
}

#[test]
fn overlay_root_shadows_the_builtin_catalog() {
    let overlay = SearchRoot::new("overlay")
        .module("sample/echo", || Ok(Arc::new(Shadow) as Arc<dyn Module>));
    let dispatcher = Dispatcher::with_roots(vec![overlay], Box::new(SystemEnv::new()));

    let out = dispatcher
        .invoke("sample/echo", "quiet", CallOptions::new())
        .expect("invoke")
        .into_bytes()
        .expect("bytes");
    assert_eq!(out, b"QUIET");

    // The rest of the catalog still comes from the builtin root.
    let out = dispatcher
        .invoke("encode/hex", &b"\x0f"[..], CallOptions::new())
        .expect("invoke")
        .into_bytes()
        .expect("bytes");
    assert_eq!(out, b"0f");
}

#[test]
fn producer_failure_surfaces_only_when_pulled() {
    let items: Vec<Result<Vec<u8>, Error>> = vec![
        Ok(b"fine\n".to_vec()),
        Err(Error::new(ErrorKind::Value).with_message("poisoned element")),
    ];
    let out = invoke(
        "sample/echo",
        Input::Producer(Box::new(items.into_iter())),
        CallOptions::new().iterate().generate(),
    )
    .expect("invocation itself starts cleanly");

    let Output::Stream(mut stream) = out else {
        panic!("expected a stream");
    };
    assert_eq!(stream.next().expect("first").expect("ok"), b"fine\n");
    let err = stream.next().expect("second").expect_err("should fail");
    assert_eq!(err.kind(), ErrorKind::Value);
    assert_eq!(err.module(), Some("sample/echo"));
}
