//! Test builders: ergonomic constructors for `Key` and `Value` trees.
//!
//! These builders are designed for readability in test assertions, not for
//! production use. They panic on invalid input rather than returning `Result`.

use chrono::{DateTime, TimeZone, Utc};
use hiveq_core::{Key, Value, ValueType};

/// `YYYY-MM-DD` at midnight UTC.
pub fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

pub fn utf16(s: &str) -> Vec<u8> {
    s.encode_utf16().flat_map(u16::to_le_bytes).collect()
}

// ---------------------------------------------------------------------------
// KeyBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for [`Key`] trees. Paths are filled in by [`build`].
///
/// # Example
///
/// ```rust
/// let root = KeyBuilder::new("ROOT")
///     .subkey(KeyBuilder::new("Software").written(day(2021, 6, 15)))
///     .build();
/// ```
///
/// [`build`]: KeyBuilder::build
pub struct KeyBuilder {
    name: String,
    last_write: Option<DateTime<Utc>>,
    deleted: bool,
    values: Vec<Value>,
    subkeys: Vec<KeyBuilder>,
}

impl KeyBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            last_write: None,
            deleted: false,
            values: Vec::new(),
            subkeys: Vec::new(),
        }
    }

    pub fn written(mut self, ts: DateTime<Utc>) -> Self {
        self.last_write = Some(ts);
        self
    }

    pub fn deleted(mut self) -> Self {
        self.deleted = true;
        self
    }

    pub fn value(mut self, value: impl Into<Value>) -> Self {
        self.values.push(value.into());
        self
    }

    pub fn subkey(mut self, subkey: KeyBuilder) -> Self {
        self.subkeys.push(subkey);
        self
    }

    /// Build as the hive root.
    pub fn build(self) -> Key {
        let key = Key::root(self.name.clone());
        self.finish(key)
    }

    fn finish(self, mut key: Key) -> Key {
        key.last_write = self.last_write;
        key.deleted = self.deleted;
        key.values = self.values;
        for child in self.subkeys {
            let child_key = Key::child(&key.path, child.name.clone());
            key.subkeys.push(child.finish(child_key));
        }
        key
    }
}

// ---------------------------------------------------------------------------
// ValueBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for [`Value`] fixtures.
pub struct ValueBuilder {
    value: Value,
}

impl ValueBuilder {
    pub fn sz(name: &str, text: &str) -> Self {
        let mut data = utf16(text);
        data.extend_from_slice(&[0, 0]);
        Self {
            value: Value::new(name, ValueType::Sz, data),
        }
    }

    pub fn dword(name: &str, n: u32) -> Self {
        Self {
            value: Value::new(name, ValueType::Dword, n.to_le_bytes().to_vec()),
        }
    }

    pub fn binary(name: &str, data: impl Into<Vec<u8>>) -> Self {
        Self {
            value: Value::new(name, ValueType::Binary, data.into()),
        }
    }

    /// A binary value of `len` bytes.
    pub fn sized(name: &str, len: usize) -> Self {
        Self::binary(name, vec![0xAB; len])
    }

    pub fn slack(mut self, slack: impl Into<Vec<u8>>) -> Self {
        self.value.slack = slack.into();
        self
    }

    pub fn deleted(mut self) -> Self {
        self.value.deleted = true;
        self
    }
}

impl From<ValueBuilder> for Value {
    fn from(builder: ValueBuilder) -> Self {
        builder.value
    }
}
