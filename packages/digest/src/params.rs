//! Construction parameters and the validation rule table
//!
//! Parameters are collected first and validated later, in one place, so that
//! every entry point (typed setters or a loosely typed JSON object) gets the
//! same accept/reject decision for the same combination of arguments.

use crate::error::{DigestError, Result};
use serde_json::Value;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Exclusive upper bound for output lengths
pub const MAX_OUTPUT_LENGTH: usize = 1 << 20;

const FIELD_OUTPUT_LENGTH: &str = "output_length";
const FIELD_KEY: &str = "key";
const FIELD_KEY_SEED: &str = "key_seed";
const KNOWN_FIELDS: [&str; 3] = [FIELD_OUTPUT_LENGTH, FIELD_KEY, FIELD_KEY_SEED];

/// A construction argument as supplied by the caller, before validation
#[derive(Debug, Clone, PartialEq, Eq)]
enum Arg<T> {
    Absent,
    Given(T),
    /// Supplied with the wrong type; carries the name of the type found
    Mistyped(&'static str),
}

impl<T> Default for Arg<T> {
    fn default() -> Self {
        Self::Absent
    }
}

impl<T> Arg<T> {
    fn given(&self) -> Option<&T> {
        match self {
            Self::Given(value) => Some(value),
            _ => None,
        }
    }

    fn is_present(&self) -> bool {
        !matches!(self, Self::Absent)
    }
}

/// Secret key material (a raw key or a derive-key seed), wiped from memory on drop
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Key(Vec<u8>);

impl Key {
    /// Raw bytes
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Length in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no bytes
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Key(<{} bytes redacted>)", self.0.len())
    }
}

/// Mode of operation, fixed when a session is constructed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Plain unkeyed hashing
    Default,
    /// Keyed hashing with a raw key of the core's key length
    Keyed(Key),
    /// Keyed hashing with a key derived from a seed
    DeriveKey(Key),
}

impl Mode {
    /// Short name of the mode, safe to log
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Keyed(_) => "keyed",
            Self::DeriveKey(_) => "derive_key",
        }
    }
}

/// Parameters for constructing a [`Digest`](crate::Digest)
///
/// Every parameter starts out absent; absent parameters fall back to the
/// session defaults when the digest is built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DigestParams {
    output_length: Arg<i128>,
    key: Arg<Key>,
    key_seed: Arg<Key>,
}

impl DigestParams {
    /// Create an empty parameter set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of output bytes
    #[must_use]
    pub fn with_output_length(mut self, output_length: usize) -> Self {
        self.output_length = Arg::Given(output_length as i128);
        self
    }

    /// Set a raw key, selecting keyed mode
    #[must_use]
    pub fn with_key<K: Into<Vec<u8>>>(mut self, key: K) -> Self {
        self.key = Arg::Given(Key(key.into()));
        self
    }

    /// Set a key seed, selecting derive-key mode
    ///
    /// Any byte string is accepted here; a hash core may still reject a seed
    /// it cannot represent when the digest is built.
    #[must_use]
    pub fn with_key_seed<S: Into<Vec<u8>>>(mut self, key_seed: S) -> Self {
        self.key_seed = Arg::Given(Key(key_seed.into()));
        self
    }

    /// Collect parameters from a loosely typed JSON object
    ///
    /// Missing fields and `null` are treated as absent. Values of the wrong
    /// type are kept and rejected when the digest is built, in the same order
    /// as every other validation rule.
    ///
    /// # Errors
    ///
    /// Returns `DigestError::TypeMismatch` if `value` is neither an object nor
    /// `null`.
    pub fn from_value(value: &Value) -> Result<Self> {
        let object = match value {
            Value::Null => return Ok(Self::default()),
            Value::Object(object) => object,
            other => {
                return Err(DigestError::TypeMismatch {
                    field: "params",
                    expected: "object",
                    found: json_type_name(other),
                })
            }
        };

        for field in object.keys() {
            if !KNOWN_FIELDS.contains(&field.as_str()) {
                tracing::warn!("Ignoring unknown digest parameter: {field}");
            }
        }

        let output_length = match object.get(FIELD_OUTPUT_LENGTH) {
            None | Some(Value::Null) => Arg::Absent,
            Some(Value::Number(number)) => match (number.as_i64(), number.as_u64()) {
                (Some(signed), _) => Arg::Given(i128::from(signed)),
                (None, Some(unsigned)) => Arg::Given(i128::from(unsigned)),
                (None, None) => Arg::Mistyped("float"),
            },
            Some(other) => Arg::Mistyped(json_type_name(other)),
        };
        let key = match object.get(FIELD_KEY) {
            None | Some(Value::Null) => Arg::Absent,
            Some(Value::String(key)) => Arg::Given(Key(key.as_bytes().to_vec())),
            Some(other) => Arg::Mistyped(json_type_name(other)),
        };
        let key_seed = match object.get(FIELD_KEY_SEED) {
            None | Some(Value::Null) => Arg::Absent,
            Some(Value::String(seed)) => Arg::Given(Key(seed.as_bytes().to_vec())),
            Some(other) => Arg::Mistyped(json_type_name(other)),
        };

        Ok(Self {
            output_length,
            key,
            key_seed,
        })
    }

    /// Run the validation rules in order and select the mode
    ///
    /// `key_len` and `default_output_len` come from the hash core.
    pub(crate) fn validate(
        self,
        key_len: usize,
        default_output_len: usize,
    ) -> Result<(Mode, usize)> {
        for rule in RULES {
            rule(&self, key_len)?;
        }

        let output_length = match self.output_length.given() {
            Some(&length) => usize::try_from(length)
                .map_err(|_| DigestError::OutOfRange { value: length })?,
            None => default_output_len,
        };

        let mode = match (self.key.given(), self.key_seed.given()) {
            (None, None) => Mode::Default,
            (Some(key), None) => Mode::Keyed(key.clone()),
            (None, Some(seed)) => Mode::DeriveKey(seed.clone()),
            (Some(_), Some(_)) => return Err(DigestError::ConflictingMode),
        };

        Ok((mode, output_length))
    }
}

type Rule = fn(&DigestParams, usize) -> Result<()>;

/// Validation rules; the first failing rule wins
const RULES: [Rule; 6] = [
    check_output_length_type,
    check_output_length_range,
    check_key_type,
    check_key_length,
    check_key_seed_type,
    check_single_mode,
];

fn check_output_length_type(params: &DigestParams, _: usize) -> Result<()> {
    match params.output_length {
        Arg::Mistyped(found) => Err(DigestError::TypeMismatch {
            field: FIELD_OUTPUT_LENGTH,
            expected: "integer",
            found,
        }),
        _ => Ok(()),
    }
}

fn check_output_length_range(params: &DigestParams, _: usize) -> Result<()> {
    match params.output_length.given() {
        Some(&value) if value < 1 || value >= MAX_OUTPUT_LENGTH as i128 => {
            Err(DigestError::OutOfRange { value })
        }
        _ => Ok(()),
    }
}

fn check_key_type(params: &DigestParams, _: usize) -> Result<()> {
    match params.key {
        Arg::Mistyped(found) => Err(DigestError::TypeMismatch {
            field: FIELD_KEY,
            expected: "string",
            found,
        }),
        _ => Ok(()),
    }
}

fn check_key_length(params: &DigestParams, key_len: usize) -> Result<()> {
    match params.key.given() {
        Some(key) if key.len() != key_len => Err(DigestError::LengthMismatch {
            expected: key_len,
            actual: key.len(),
        }),
        _ => Ok(()),
    }
}

fn check_key_seed_type(params: &DigestParams, _: usize) -> Result<()> {
    match params.key_seed {
        Arg::Mistyped(found) => Err(DigestError::TypeMismatch {
            field: FIELD_KEY_SEED,
            expected: "string",
            found,
        }),
        _ => Ok(()),
    }
}

// Fires on presence alone, whether or not either value is usable.
fn check_single_mode(params: &DigestParams, _: usize) -> Result<()> {
    if params.key.is_present() && params.key_seed.is_present() {
        return Err(DigestError::ConflictingMode);
    }
    Ok(())
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
