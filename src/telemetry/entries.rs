use super::value::{Mapping, Value};

/// Ordered entries of one scope. A repeated key overwrites in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryTable {
    entries: Mapping,
}

impl EntryTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes `value` under `key`, returning the value it replaced.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(key.into(), value.into())
    }

    /// Applies each pair in order as an independent write.
    pub fn extend<K, V, I>(&mut self, pairs: I)
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        for (key, value) in pairs {
            self.insert(key, value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter()
    }

    pub fn as_mapping(&self) -> &Mapping {
        &self.entries
    }

    pub fn to_mapping(&self) -> Mapping {
        self.entries.clone()
    }
}
