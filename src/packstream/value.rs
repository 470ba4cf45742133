/// A self-describing value that `PackStream` can carry.
///
/// This is the closed sum type for the core: floats, booleans, byte arrays, and structures
/// other than messages are not representable and never appear here.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    String(String),
    List(Vec<Value>),
    Map(Map),
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl Value {
    /// Builds an integer `Value` from a widened `i128`, rejecting anything outside
    /// `[-2^63, 2^63)`. Exists so boundary/overflow tests can express values one past the
    /// representable range without relying on undefined `as i64` truncation.
    pub fn integer_checked(v: i128) -> crate::error::BoltResult<Self> {
        i64::try_from(v)
            .map(Value::Integer)
            .map_err(|_| crate::error::BoltError::IntegerOutOfRange(v))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}

impl From<Map> for Value {
    fn from(v: Map) -> Self {
        Value::Map(v)
    }
}

/// A string-keyed map that preserves insertion order, the way a `RUN`/`HELLO`/`PULL` `extra`
/// map must on the wire.
///
/// Inserting an existing key overwrites its value in place, keeping the key's original
/// position — matching what an ordered-map `insert` does and what the decoder does when it
/// sees a duplicate key.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Map(Vec<(String, Value)>);

impl Map {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        let key = key.into();
        let value = value.into();
        if let Some(slot) = self.0.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.0.push((key, value));
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Test-only: builds a `Map` from raw `(key, value)` pairs without the deduplication
    /// [`Map::insert`] does, so codec tests can exercise the wire-level duplicate-key behavior
    /// spec.md §8 calls out ("encoder emits both; decoder keeps last") — `Map::insert` is the
    /// only public way to build a map, and it dedupes before a duplicate key can ever reach
    /// `pack_map`.
    #[cfg(test)]
    pub(crate) fn from_raw_entries_allow_duplicates(entries: Vec<(String, Value)>) -> Self {
        Self(entries)
    }
}

impl FromIterator<(String, Value)> for Map {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        let mut map = Map::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl<'a> IntoIterator for &'a Map {
    type Item = (&'a str, &'a Value);
    type IntoIter = Box<dyn Iterator<Item = (&'a str, &'a Value)> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}
