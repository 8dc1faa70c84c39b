use indexmap::IndexMap;

/// ColorBrewer Spectral, four classes.
pub const SCHEME_SPECTRAL_4: [&str; 4] = ["#d7191c", "#fdae61", "#abdda4", "#2b83ba"];

/// ColorBrewer Set2, eight classes.
pub const SCHEME_SET2: [&str; 8] = [
    "#66c2a5", "#fc8d62", "#8da0cb", "#e78ac3", "#a6d854", "#ffd92f", "#e5c494", "#b3b3b3",
];

/// Categorical lookup: the n-th distinct domain value maps to the n-th output,
/// cycling when the domain outgrows the range.
#[derive(Debug, Clone, PartialEq)]
pub struct OrdinalScale<T> {
    domain: IndexMap<String, usize>,
    range: Vec<T>,
}

impl<T> OrdinalScale<T> {
    pub fn new<I, S>(domain: I, range: Vec<T>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut indexed = IndexMap::new();
        for value in domain {
            let next = indexed.len();
            indexed.entry(value.into()).or_insert(next);
        }
        Self {
            domain: indexed,
            range,
        }
    }

    /// Output for `key`; `None` when the key is unknown or the range is empty.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&T> {
        if self.range.is_empty() {
            return None;
        }
        let index = *self.domain.get(key)?;
        self.range.get(index % self.range.len())
    }

    /// Output for `key`, appending unseen keys to the domain first.
    pub fn resolve(&mut self, key: &str) -> Option<&T> {
        if !self.domain.contains_key(key) {
            let next = self.domain.len();
            self.domain.insert(key.to_owned(), next);
        }
        self.get(key)
    }

    #[must_use]
    pub fn domain_len(&self) -> usize {
        self.domain.len()
    }

    pub fn domain(&self) -> impl Iterator<Item = &str> {
        self.domain.keys().map(String::as_str)
    }
}
