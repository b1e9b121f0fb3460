//! Cross-crate NDR decoding scenarios
//!
//! Run a category:
//! ```text
//! cargo test -p integration-tests --test pac_tests
//! cargo test -p integration-tests --test array_tests
//! cargo test -p integration-tests --test deferral_tests
//! ```
//!
//! Set `RUST_LOG=rpc_ndr=trace` to follow every scheduled referent.
//!
//! Fixture loading, payload framing and tracing setup live in
//! `src/common.rs`, pulled into each target with `mod common;`.
