//! Incremental BLAKE3 digest sessions
//!
//! A [`Digest`] hashes data incrementally in one of three modes chosen at
//! construction time: unkeyed, keyed with a raw key of [`KEY_LENGTH`] bytes,
//! or keyed with a key derived from a seed. The output length is
//! selectable (`1..MAX_OUTPUT_LENGTH` bytes) and output can be read as raw
//! bytes, lowercase hex or base64.
//!
//! ```
//! use cryypt_digest::{hex_digest, Digest, DigestParams};
//!
//! # fn main() -> cryypt_digest::Result<()> {
//! let mut digest = Digest::with_params(DigestParams::new().with_key_seed("my app v1"))?;
//! digest.update(b"some input")?;
//! let streamed = digest.hex_digest()?.to_owned();
//!
//! let one_shot = hex_digest(b"some input", DigestParams::new().with_key_seed("my app v1"))?;
//! assert_eq!(streamed, one_shot);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

mod cache;
pub mod error;
pub mod hash_core;
pub mod one_shot;
pub mod params;
pub mod session;

pub use error::{CoreError, DigestError, Result};
pub use hash_core::{Blake3Core, HashCore};
pub use one_shot::{base64_digest, digest, hex_digest};
pub use params::{DigestParams, Key, Mode, MAX_OUTPUT_LENGTH};
pub use session::Digest;

/// Raw key length for keyed mode
pub const KEY_LENGTH: usize = <Blake3Core as HashCore>::KEY_LEN;

/// Output length used when none is requested
pub const DEFAULT_OUTPUT_LENGTH: usize = <Blake3Core as HashCore>::DEFAULT_OUTPUT_LEN;
