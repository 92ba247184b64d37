//! Hash core abstraction and the BLAKE3 implementation
//!
//! A [`HashCore`] owns the actual mixing algorithm. Sessions only ever talk to
//! it through opaque contexts: create one per session, feed bytes into it,
//! read an arbitrary number of output bytes from it, and release it exactly
//! once.

use crate::error::CoreError;
use zeroize::Zeroize;

/// Contract between a digest session and the algorithm underneath it
pub trait HashCore {
    /// Opaque per-session computation state
    type Context;

    /// Length in bytes of a raw key for keyed mode
    const KEY_LEN: usize;

    /// Output length used when the caller does not request one
    const DEFAULT_OUTPUT_LEN: usize;

    /// Allocate a context for unkeyed hashing
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Context` if the context cannot be created.
    fn create_default_context(&self) -> Result<Self::Context, CoreError>;

    /// Allocate a context keyed with exactly `KEY_LEN` bytes
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Context` if the key is rejected or the context
    /// cannot be created.
    fn create_keyed_context(&self, key: &[u8]) -> Result<Self::Context, CoreError>;

    /// Allocate a context whose key is derived from the byte string `seed`
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Context` if the seed is rejected or the context
    /// cannot be created.
    fn create_seeded_context(&self, seed: &[u8]) -> Result<Self::Context, CoreError>;

    /// Append `bytes` to the context's input
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Feed` if the core cannot absorb the input.
    fn feed(&self, context: &mut Self::Context, bytes: &[u8]) -> Result<(), CoreError>;

    /// Produce `len` output bytes from everything fed so far
    ///
    /// The context is left untouched so more input may follow.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Output` if the output cannot be produced.
    fn produce_output(&self, context: &Self::Context, len: usize) -> Result<Vec<u8>, CoreError>;

    /// Free a context; called exactly once per created context
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Release` if the context could not be released.
    fn release_context(&self, context: Self::Context) -> Result<(), CoreError>;
}

/// BLAKE3 hash core backed by the `blake3` crate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Blake3Core;

impl HashCore for Blake3Core {
    type Context = Box<blake3::Hasher>;

    const KEY_LEN: usize = blake3::KEY_LEN;
    const DEFAULT_OUTPUT_LEN: usize = blake3::OUT_LEN;

    fn create_default_context(&self) -> Result<Self::Context, CoreError> {
        Ok(Box::new(blake3::Hasher::new()))
    }

    fn create_keyed_context(&self, key: &[u8]) -> Result<Self::Context, CoreError> {
        let key: &[u8; blake3::KEY_LEN] = key.try_into().map_err(|_| {
            CoreError::Context(format!(
                "BLAKE3 keys are {} bytes, got {}",
                blake3::KEY_LEN,
                key.len()
            ))
        })?;
        Ok(Box::new(blake3::Hasher::new_keyed(key)))
    }

    // The blake3 crate only derives keys from UTF-8 context strings
    fn create_seeded_context(&self, seed: &[u8]) -> Result<Self::Context, CoreError> {
        let seed = std::str::from_utf8(seed).map_err(|e| {
            CoreError::Context(format!("BLAKE3 key seeds must be valid UTF-8: {e}"))
        })?;
        Ok(Box::new(blake3::Hasher::new_derive_key(seed)))
    }

    fn feed(&self, context: &mut Self::Context, bytes: &[u8]) -> Result<(), CoreError> {
        context.update(bytes);
        Ok(())
    }

    fn produce_output(&self, context: &Self::Context, len: usize) -> Result<Vec<u8>, CoreError> {
        let mut output = vec![0u8; len];
        context.finalize_xof().fill(&mut output);
        Ok(output)
    }

    fn release_context(&self, mut context: Self::Context) -> Result<(), CoreError> {
        // Keyed and derived states carry key material in their chaining values
        context.zeroize();
        Ok(())
    }
}
