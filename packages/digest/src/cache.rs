//! Three-slot output cache
//!
//! The raw slot is filled by the session on the first read after an
//! invalidation; the hex and base64 slots are derived from it on demand.

use base64::{engine::general_purpose, Engine as _};

#[derive(Debug, Default)]
pub(crate) struct OutputCache {
    raw: Option<Vec<u8>>,
    hex: Option<String>,
    base64: Option<String>,
}

impl OutputCache {
    /// Drop every slot; the next read recomputes from the hash core
    pub(crate) fn invalidate(&mut self) {
        self.raw = None;
        self.hex = None;
        self.base64 = None;
    }

    pub(crate) fn has_raw(&self) -> bool {
        self.raw.is_some()
    }

    pub(crate) fn store_raw(&mut self, output: Vec<u8>) {
        tracing::trace!("Caching {} digest bytes", output.len());
        self.raw = Some(output);
        self.hex = None;
        self.base64 = None;
    }

    pub(crate) fn raw(&self) -> Option<&[u8]> {
        self.raw.as_deref()
    }

    pub(crate) fn hex(&mut self) -> Option<&str> {
        let raw = self.raw.as_deref()?;
        Some(self.hex.get_or_insert_with(|| hex::encode(raw)).as_str())
    }

    pub(crate) fn base64(&mut self) -> Option<&str> {
        let raw = self.raw.as_deref()?;
        Some(
            self.base64
                .get_or_insert_with(|| general_purpose::STANDARD.encode(raw))
                .as_str(),
        )
    }
}
