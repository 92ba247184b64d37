//! One-shot digest helpers
//!
//! Each call builds a transient [`Digest`], feeds it once, reads it once and
//! drops it before returning, so its context is always released.

use crate::error::{DigestError, Result};
use crate::params::DigestParams;
use crate::session::Digest;
use tokio::runtime::Handle;

/// Raw digest of `data`
///
/// # Errors
///
/// Returns any construction or core error of [`Digest`].
pub fn digest<D: AsRef<[u8]>>(data: D, params: DigestParams) -> Result<Vec<u8>> {
    generic_digest(data.as_ref(), params, |digest| {
        digest.finalize().map(<[u8]>::to_vec)
    })
}

/// Lowercase hexadecimal digest of `data`
///
/// # Errors
///
/// Returns any construction or core error of [`Digest`].
pub fn hex_digest<D: AsRef<[u8]>>(data: D, params: DigestParams) -> Result<String> {
    generic_digest(data.as_ref(), params, |digest| {
        digest.hex_digest().map(str::to_owned)
    })
}

/// Standard padded base64 digest of `data`
///
/// # Errors
///
/// Returns any construction or core error of [`Digest`].
pub fn base64_digest<D: AsRef<[u8]>>(data: D, params: DigestParams) -> Result<String> {
    generic_digest(data.as_ref(), params, |digest| {
        digest.base64_digest().map(str::to_owned)
    })
}

fn generic_digest<T>(
    data: &[u8],
    params: DigestParams,
    read: impl FnOnce(&mut Digest) -> Result<T>,
) -> Result<T> {
    let mut digest = Digest::with_params(params)?;
    digest.update(data)?;
    read(&mut digest)
}

impl DigestParams {
    /// Compute the raw digest of `data` on tokio's blocking pool
    ///
    /// # Errors
    ///
    /// Returns `DigestError::RuntimeUnavailable` when polled outside a tokio
    /// runtime, `DigestError::Internal` if the hashing task panics, or any
    /// error of [`digest`].
    pub async fn compute<T: Into<Vec<u8>>>(self, data: T) -> Result<Vec<u8>> {
        let runtime = Handle::try_current().map_err(|_| DigestError::RuntimeUnavailable)?;
        let data = data.into();

        runtime
            .spawn_blocking(move || digest(&data, self))
            .await
            .map_err(|e| DigestError::internal(format!("Digest computation task failed: {e}")))?
    }
}
