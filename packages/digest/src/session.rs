//! Incremental digest session
//!
//! A [`Digest`] owns exactly one hash core context for its whole life. Input
//! is appended with [`Digest::update`], output is read with
//! [`Digest::finalize`] and its encoded views, and the context is released
//! exactly once: either by [`Digest::release`] or when the digest is dropped,
//! whichever comes first.

use crate::cache::OutputCache;
use crate::error::{CoreError, DigestError, Result};
use crate::hash_core::{Blake3Core, HashCore};
use crate::params::{DigestParams, Mode};
use serde_json::Value;
use std::io;
use subtle::ConstantTimeEq;

/// Streaming digest with extendable output
///
/// Every operation takes `&mut self`, so a single digest is used by one
/// caller at a time; wrap it in a `Mutex` to share it between threads.
/// Separate digests are fully independent.
///
/// ```
/// use cryypt_digest::{Digest, DigestParams};
///
/// # fn main() -> cryypt_digest::Result<()> {
/// let mut digest = Digest::with_params(DigestParams::new().with_output_length(10))?;
/// digest.update("some input")?.update("some more input")?;
/// assert_eq!(digest.hex_digest()?.len(), 20);
/// # Ok(())
/// # }
/// ```
pub struct Digest<C: HashCore = Blake3Core> {
    core: C,
    mode: Mode,
    output_length: usize,
    /// `None` once the context has been released
    handle: Option<C::Context>,
    cache: OutputCache,
    poisoned: bool,
}

impl Digest<Blake3Core> {
    /// Create an unkeyed BLAKE3 digest with the default output length
    ///
    /// # Errors
    ///
    /// Returns `DigestError::Core` if the hash core cannot create a context.
    pub fn new() -> Result<Self> {
        Self::with_params(DigestParams::new())
    }

    /// Create a BLAKE3 digest from construction parameters
    ///
    /// # Errors
    ///
    /// Returns a validation error (`TypeMismatch`, `OutOfRange`,
    /// `LengthMismatch`, `ConflictingMode`) for invalid parameters, or
    /// `DigestError::Core` if the hash core cannot create a context.
    pub fn with_params(params: DigestParams) -> Result<Self> {
        Self::with_core(Blake3Core, params)
    }

    /// Create a BLAKE3 digest from a JSON parameter object
    ///
    /// # Errors
    ///
    /// Same as [`Digest::with_params`], plus `TypeMismatch` for fields of the
    /// wrong JSON type.
    pub fn from_value(value: &Value) -> Result<Self> {
        Self::with_params(DigestParams::from_value(value)?)
    }
}

impl<C: HashCore> Digest<C> {
    /// Create a digest on top of an arbitrary hash core
    ///
    /// Nothing is allocated in the core unless every validation rule passes.
    ///
    /// # Errors
    ///
    /// Returns a validation error for invalid parameters, or
    /// `DigestError::Core` if the core cannot create a context.
    pub fn with_core(core: C, params: DigestParams) -> Result<Self> {
        let (mode, output_length) = params.validate(C::KEY_LEN, C::DEFAULT_OUTPUT_LEN)?;

        let context = match &mode {
            Mode::Default => core.create_default_context(),
            Mode::Keyed(key) => core.create_keyed_context(key.as_bytes()),
            Mode::DeriveKey(seed) => core.create_seeded_context(seed.as_bytes()),
        }?;

        tracing::debug!(
            "Digest session created (mode: {}, output_length: {output_length})",
            mode.name()
        );

        Ok(Self {
            core,
            mode,
            output_length,
            handle: Some(context),
            cache: OutputCache::default(),
            poisoned: false,
        })
    }

    /// Append `data` to the input
    ///
    /// Cached output is discarded on every call, including calls with empty
    /// data and calls that fail.
    ///
    /// # Errors
    ///
    /// Returns `DigestError::Core` if the core rejects the data (the digest is
    /// poisoned afterwards), `DigestError::Poisoned` after an earlier core
    /// failure, or `DigestError::Released` after [`Digest::release`].
    pub fn update<D: AsRef<[u8]>>(&mut self, data: D) -> Result<&mut Self> {
        let result = self.feed(data.as_ref());
        self.cache.invalidate();
        result.map(|()| self)
    }

    /// Output bytes over everything fed so far
    ///
    /// Computed once and cached until the next [`Digest::update`]. The input
    /// is not reset, so more data may be appended afterwards.
    ///
    /// # Errors
    ///
    /// Returns `DigestError::Core` if the core cannot produce output (the
    /// digest is poisoned afterwards), `DigestError::Poisoned` after an
    /// earlier core failure, or `DigestError::Released` after
    /// [`Digest::release`].
    pub fn finalize(&mut self) -> Result<&[u8]> {
        if !self.cache.has_raw() {
            let output = self.produce()?;
            self.cache.store_raw(output);
        }
        self.cache
            .raw()
            .ok_or_else(|| DigestError::internal("digest cache empty after finalization"))
    }

    /// Lowercase hexadecimal encoding of [`Digest::finalize`]
    ///
    /// # Errors
    ///
    /// Same as [`Digest::finalize`].
    pub fn hex_digest(&mut self) -> Result<&str> {
        self.finalize()?;
        self.cache
            .hex()
            .ok_or_else(|| DigestError::internal("digest cache empty after finalization"))
    }

    /// Standard padded base64 encoding of [`Digest::finalize`]
    ///
    /// # Errors
    ///
    /// Same as [`Digest::finalize`].
    pub fn base64_digest(&mut self) -> Result<&str> {
        self.finalize()?;
        self.cache
            .base64()
            .ok_or_else(|| DigestError::internal("digest cache empty after finalization"))
    }

    /// Compare the output with `expected` in constant time
    ///
    /// # Errors
    ///
    /// Returns `DigestError::VerificationFailed` on mismatch, or any error of
    /// [`Digest::finalize`].
    pub fn verify(&mut self, expected: &[u8]) -> Result<()> {
        let actual = self.finalize()?;
        if bool::from(actual.ct_eq(expected)) {
            Ok(())
        } else {
            Err(DigestError::VerificationFailed)
        }
    }

    /// Release the hash core context now instead of on drop
    ///
    /// Later calls, including the implicit one on drop, do nothing. Release
    /// failures are logged, never returned.
    pub fn release(&mut self) {
        self.cache.invalidate();
        let Some(context) = self.handle.take() else {
            return;
        };
        match self.core.release_context(context) {
            Ok(()) => tracing::debug!("Digest context released (mode: {})", self.mode.name()),
            Err(e) => tracing::warn!("Digest context release failed: {e}"),
        }
    }

    /// Number of bytes produced by [`Digest::finalize`]
    #[must_use]
    pub fn output_length(&self) -> usize {
        self.output_length
    }

    /// Mode selected at construction
    #[must_use]
    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    /// Whether a core failure has made this digest unusable
    #[must_use]
    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// Whether the hash core context has been released
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.handle.is_none()
    }

    fn feed(&mut self, data: &[u8]) -> Result<()> {
        let Some(context) = self.handle.as_mut() else {
            return Err(DigestError::Released);
        };
        if self.poisoned {
            return Err(DigestError::Poisoned);
        }
        tracing::trace!("Feeding {} bytes", data.len());
        self.core
            .feed(context, data)
            .map_err(|e| self.poison(e))
    }

    fn produce(&mut self) -> Result<Vec<u8>> {
        let Some(context) = self.handle.as_ref() else {
            return Err(DigestError::Released);
        };
        if self.poisoned {
            return Err(DigestError::Poisoned);
        }
        let output = self
            .core
            .produce_output(context, self.output_length)
            .map_err(|e| self.poison(e))?;
        if output.len() != self.output_length {
            return Err(self.poison(CoreError::Output(format!(
                "core produced {} bytes, expected {}",
                output.len(),
                self.output_length
            ))));
        }
        Ok(output)
    }

    fn poison(&mut self, error: CoreError) -> DigestError {
        tracing::error!("Hash core failure, digest session poisoned: {error}");
        self.poisoned = true;
        DigestError::Core(error)
    }
}

impl<C: HashCore> Drop for Digest<C> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<C: HashCore> io::Write for Digest<C> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.update(buf).map_err(io::Error::other)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<C: HashCore> std::fmt::Debug for Digest<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Digest")
            .field("mode", &self.mode)
            .field("output_length", &self.output_length)
            .field("released", &self.is_released())
            .field("poisoned", &self.poisoned)
            .finish_non_exhaustive()
    }
}
