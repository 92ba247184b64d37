//! Test doubles and fixtures shared by the integration tests

#![allow(dead_code)]

use cryypt_digest::{Blake3Core, CoreError, HashCore};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

type Blake3Context = <Blake3Core as HashCore>::Context;

/// Key used by the official BLAKE3 test vectors
pub const VECTOR_KEY: &[u8; 32] = b"whats the Elvish word for friend";

/// Context string used by the official BLAKE3 test vectors
pub const VECTOR_CONTEXT: &str = "BLAKE3 2019-12-27 16:29:52 test vectors context";

/// Input lengths covered by the official BLAKE3 test vectors
pub const VECTOR_INPUT_LENS: [usize; 22] = [
    0, 1, 1023, 1024, 1025, 2048, 2049, 3072, 3073, 4096, 4097, 5120, 5121, 6144, 6145, 7168,
    7169, 8192, 8193, 16384, 31744, 102_400,
];

/// Input of the official BLAKE3 test vectors: a repeating 0..=250 byte pattern
pub fn vector_input(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

/// Call counters shared between a core and the test that owns it
#[derive(Debug, Default)]
pub struct Calls {
    /// Contexts created
    pub created: AtomicUsize,
    /// `feed` invocations
    pub fed: AtomicUsize,
    /// `produce_output` invocations
    pub produced: AtomicUsize,
    /// `release_context` invocations
    pub released: AtomicUsize,
}

impl Calls {
    /// Read one counter
    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

/// BLAKE3 core that counts every call made into it
#[derive(Debug, Clone, Default)]
pub struct CountingCore {
    /// Counters, shared with clones
    pub calls: Arc<Calls>,
}

impl CountingCore {
    /// Contexts created so far
    pub fn created(&self) -> usize {
        Calls::get(&self.calls.created)
    }

    /// Contexts released so far
    pub fn released(&self) -> usize {
        Calls::get(&self.calls.released)
    }

    /// Outputs produced so far
    pub fn produced(&self) -> usize {
        Calls::get(&self.calls.produced)
    }
}

impl HashCore for CountingCore {
    type Context = Blake3Context;

    const KEY_LEN: usize = <Blake3Core as HashCore>::KEY_LEN;
    const DEFAULT_OUTPUT_LEN: usize = <Blake3Core as HashCore>::DEFAULT_OUTPUT_LEN;

    fn create_default_context(&self) -> Result<Self::Context, CoreError> {
        self.calls.created.fetch_add(1, Ordering::SeqCst);
        Blake3Core.create_default_context()
    }

    fn create_keyed_context(&self, key: &[u8]) -> Result<Self::Context, CoreError> {
        self.calls.created.fetch_add(1, Ordering::SeqCst);
        Blake3Core.create_keyed_context(key)
    }

    fn create_seeded_context(&self, seed: &[u8]) -> Result<Self::Context, CoreError> {
        self.calls.created.fetch_add(1, Ordering::SeqCst);
        Blake3Core.create_seeded_context(seed)
    }

    fn feed(&self, context: &mut Self::Context, bytes: &[u8]) -> Result<(), CoreError> {
        self.calls.fed.fetch_add(1, Ordering::SeqCst);
        Blake3Core.feed(context, bytes)
    }

    fn produce_output(&self, context: &Self::Context, len: usize) -> Result<Vec<u8>, CoreError> {
        self.calls.produced.fetch_add(1, Ordering::SeqCst);
        Blake3Core.produce_output(context, len)
    }

    fn release_context(&self, context: Self::Context) -> Result<(), CoreError> {
        self.calls.released.fetch_add(1, Ordering::SeqCst);
        Blake3Core.release_context(context)
    }
}

/// Input that makes [`FaultyCore`] reject a `feed` call
pub const POISON_PILL: &[u8] = b"poison pill";

/// BLAKE3 core with injectable failures
#[derive(Debug, Clone, Default)]
pub struct FaultyCore {
    /// Counters, shared with clones
    pub calls: Arc<Calls>,
    /// Fail every `produce_output` call
    pub fail_output: bool,
    /// Return one byte fewer than requested from `produce_output`
    pub short_output: bool,
    /// Fail every `release_context` call (after counting it)
    pub fail_release: bool,
}

impl FaultyCore {
    /// Contexts released so far
    pub fn released(&self) -> usize {
        Calls::get(&self.calls.released)
    }
}

impl HashCore for FaultyCore {
    type Context = Blake3Context;

    const KEY_LEN: usize = <Blake3Core as HashCore>::KEY_LEN;
    const DEFAULT_OUTPUT_LEN: usize = <Blake3Core as HashCore>::DEFAULT_OUTPUT_LEN;

    fn create_default_context(&self) -> Result<Self::Context, CoreError> {
        self.calls.created.fetch_add(1, Ordering::SeqCst);
        Blake3Core.create_default_context()
    }

    fn create_keyed_context(&self, key: &[u8]) -> Result<Self::Context, CoreError> {
        self.calls.created.fetch_add(1, Ordering::SeqCst);
        Blake3Core.create_keyed_context(key)
    }

    fn create_seeded_context(&self, seed: &[u8]) -> Result<Self::Context, CoreError> {
        self.calls.created.fetch_add(1, Ordering::SeqCst);
        Blake3Core.create_seeded_context(seed)
    }

    fn feed(&self, context: &mut Self::Context, bytes: &[u8]) -> Result<(), CoreError> {
        self.calls.fed.fetch_add(1, Ordering::SeqCst);
        if bytes == POISON_PILL {
            return Err(CoreError::Feed("refusing poison pill".to_string()));
        }
        Blake3Core.feed(context, bytes)
    }

    fn produce_output(&self, context: &Self::Context, len: usize) -> Result<Vec<u8>, CoreError> {
        self.calls.produced.fetch_add(1, Ordering::SeqCst);
        if self.fail_output {
            return Err(CoreError::Output("output disabled".to_string()));
        }
        let mut output = Blake3Core.produce_output(context, len)?;
        if self.short_output {
            output.pop();
        }
        Ok(output)
    }

    fn release_context(&self, context: Self::Context) -> Result<(), CoreError> {
        self.calls.released.fetch_add(1, Ordering::SeqCst);
        Blake3Core.release_context(context)?;
        if self.fail_release {
            return Err(CoreError::Release("release disabled".to_string()));
        }
        Ok(())
    }
}

/// Core that accepts any seed bytes and records every seed it is given
#[derive(Debug, Clone, Default)]
pub struct SeedRecordingCore {
    /// Seeds passed to `create_seeded_context`, shared with clones
    pub seeds: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl SeedRecordingCore {
    /// Seeds received so far
    pub fn seeds(&self) -> Vec<Vec<u8>> {
        self.seeds.lock().unwrap().clone()
    }
}

impl HashCore for SeedRecordingCore {
    type Context = Blake3Context;

    const KEY_LEN: usize = <Blake3Core as HashCore>::KEY_LEN;
    const DEFAULT_OUTPUT_LEN: usize = <Blake3Core as HashCore>::DEFAULT_OUTPUT_LEN;

    fn create_default_context(&self) -> Result<Self::Context, CoreError> {
        Blake3Core.create_default_context()
    }

    fn create_keyed_context(&self, key: &[u8]) -> Result<Self::Context, CoreError> {
        Blake3Core.create_keyed_context(key)
    }

    fn create_seeded_context(&self, seed: &[u8]) -> Result<Self::Context, CoreError> {
        self.seeds.lock().unwrap().push(seed.to_vec());
        Blake3Core.create_keyed_context(blake3::hash(seed).as_bytes())
    }

    fn feed(&self, context: &mut Self::Context, bytes: &[u8]) -> Result<(), CoreError> {
        Blake3Core.feed(context, bytes)
    }

    fn produce_output(&self, context: &Self::Context, len: usize) -> Result<Vec<u8>, CoreError> {
        Blake3Core.produce_output(context, len)
    }

    fn release_context(&self, context: Self::Context) -> Result<(), CoreError> {
        Blake3Core.release_context(context)
    }
}
