//! String interning
//!
//! All strings, including property keys, are interned in a per-context
//! table. Interning makes every string comparison an id comparison, so
//! the property table and the chain query never touch string bytes on
//! the hot path.

use crate::value::StrId;

/// String interning table
///
/// Maintains a set of unique strings addressed by [`StrId`].
///
/// Layout:
/// - `strings`: interned text, indexed by `StrId`
/// - `hash_table`: buckets of indices into `strings` (0 = empty/end),
///   stored shifted by one so a zeroed table means empty
pub struct StringTable {
    /// Interned strings, indexed by StrId
    strings: Vec<String>,
    /// Hash chain per string (index + 1 of the next string in the bucket)
    hash_next: Vec<u32>,
    /// Hash table (indices + 1 into strings, 0 = empty)
    hash_table: Vec<u32>,
    /// Mask for hash table indexing (size - 1)
    hash_mask: u32,
}

impl StringTable {
    /// Initial hash table size (power of 2)
    const INITIAL_SIZE: usize = 256;

    /// Maximum load factor before resize
    const MAX_LOAD_FACTOR: f64 = 0.75;

    /// Create a new string table
    pub fn new() -> Self {
        StringTable {
            strings: Vec::new(),
            hash_next: Vec::new(),
            hash_table: vec![0; Self::INITIAL_SIZE],
            hash_mask: (Self::INITIAL_SIZE - 1) as u32,
        }
    }

    /// Get the number of interned strings
    #[inline]
    pub fn count(&self) -> usize {
        self.strings.len()
    }

    /// Hash a string for table lookup
    #[inline]
    pub fn hash_string(s: &str) -> u32 {
        let mut h: u32 = 0;
        for b in s.bytes() {
            h = h.wrapping_mul(31).wrapping_add(b as u32);
        }
        h
    }

    /// Intern a string, returning its id
    ///
    /// Equal text always maps to the same id.
    pub fn intern(&mut self, s: &str) -> StrId {
        let hash = Self::hash_string(s);
        let bucket = (hash & self.hash_mask) as usize;

        let mut idx = self.hash_table[bucket];
        while idx != 0 {
            let str_idx = (idx - 1) as usize;
            if self.strings[str_idx] == s {
                return StrId(str_idx as u32);
            }
            idx = self.hash_next[str_idx];
        }

        let load = (self.strings.len() + 1) as f64 / (self.hash_mask + 1) as f64;
        if load > Self::MAX_LOAD_FACTOR {
            self.resize();
        }
        let bucket = (hash & self.hash_mask) as usize;

        let str_idx = self.strings.len();
        self.strings.push(s.to_string());
        self.hash_next.push(self.hash_table[bucket]);
        self.hash_table[bucket] = (str_idx + 1) as u32;

        StrId(str_idx as u32)
    }

    /// Look up a string without interning it
    pub fn find(&self, s: &str) -> Option<StrId> {
        let hash = Self::hash_string(s);
        let mut idx = self.hash_table[(hash & self.hash_mask) as usize];

        while idx != 0 {
            let str_idx = (idx - 1) as usize;
            if self.strings[str_idx] == s {
                return Some(StrId(str_idx as u32));
            }
            idx = self.hash_next[str_idx];
        }

        None
    }

    /// Get the text of an interned string
    ///
    /// Returns None for an id that did not come from this table.
    #[inline]
    pub fn get(&self, id: StrId) -> Option<&str> {
        self.strings.get(id.index()).map(String::as_str)
    }

    /// Resize the hash table and rehash all strings
    fn resize(&mut self) {
        let new_size = ((self.hash_mask + 1) * 2) as usize;
        self.hash_mask = (new_size - 1) as u32;
        self.hash_table = vec![0; new_size];

        for i in 0..self.strings.len() {
            let hash = Self::hash_string(&self.strings[i]);
            let bucket = (hash & self.hash_mask) as usize;
            self.hash_next[i] = self.hash_table[bucket];
            self.hash_table[bucket] = (i + 1) as u32;
        }
    }
}

impl Default for StringTable {
    fn default() -> Self {
        Self::new()
    }
}
