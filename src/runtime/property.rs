//! Property table and operations
//!
//! Objects store their own properties in a hash table keyed by interned
//! string id. Only own properties live here; delegation to ancestors is
//! the chain walk's job, not the table's.

use crate::value::{StrId, Value};

/// Sentinel key marking a deleted slot
const DELETED_KEY: StrId = StrId(u32::MAX);

/// A property in an object's property table
#[derive(Clone, Copy, Debug)]
pub struct Property {
    /// Property key (interned string)
    pub key: StrId,
    /// Property value
    pub value: Value,
    /// Hash chain next (index + 1 into props, 0 = end of list)
    hash_next: u32,
}

impl Property {
    /// Create a new property
    #[inline]
    pub fn new(key: StrId, value: Value) -> Self {
        Property {
            key,
            value,
            hash_next: 0,
        }
    }

    /// Check if this slot has been deleted
    #[inline]
    fn is_deleted(&self) -> bool {
        self.key == DELETED_KEY
    }
}

/// Property table structure
///
/// Layout:
/// - `properties`: Property array, in assignment order
/// - `hash_table`: buckets of indices + 1 into properties (0 = empty)
/// - deleted slots are threaded on a free list and reused
#[derive(Debug)]
pub struct PropertyTable {
    /// Number of active properties
    prop_count: u32,
    /// Hash table mask (size - 1)
    hash_mask: u32,
    /// Properties
    properties: Vec<Property>,
    /// Hash table (indices + 1 into properties, 0 = end of chain)
    hash_table: Vec<u32>,
    /// First free slot in properties (index + 1, 0 = none)
    first_free: u32,
}

impl PropertyTable {
    /// Minimum hash table size
    const MIN_HASH_SIZE: usize = 4;

    /// Maximum load factor before resize
    const MAX_LOAD_FACTOR: f64 = 0.75;

    /// Create a new empty property table
    pub fn new() -> Self {
        PropertyTable {
            prop_count: 0,
            hash_mask: (Self::MIN_HASH_SIZE - 1) as u32,
            properties: Vec::new(),
            hash_table: vec![0; Self::MIN_HASH_SIZE],
            first_free: 0,
        }
    }

    /// Create a property table with specified capacity
    pub fn with_capacity(capacity: usize) -> Self {
        let hash_size = capacity.next_power_of_two().max(Self::MIN_HASH_SIZE);
        PropertyTable {
            prop_count: 0,
            hash_mask: (hash_size - 1) as u32,
            properties: Vec::with_capacity(capacity),
            hash_table: vec![0; hash_size],
            first_free: 0,
        }
    }

    /// Get the number of properties
    #[inline]
    pub fn len(&self) -> usize {
        self.prop_count as usize
    }

    /// Check if the table is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.prop_count == 0
    }

    /// Hash a property key
    #[inline]
    fn hash_key(key: StrId) -> u32 {
        // Interned ids are dense, mix bits for better distribution
        let mut h = key.0;
        h ^= h >> 16;
        h = h.wrapping_mul(0x85ebca6b);
        h ^= h >> 13;
        h = h.wrapping_mul(0xc2b2ae35);
        h ^= h >> 16;
        h
    }

    /// Find a property by key
    ///
    /// Returns the property index if found.
    pub fn find(&self, key: StrId) -> Option<usize> {
        if self.prop_count == 0 {
            return None;
        }

        let hash = Self::hash_key(key);
        let mut idx = self.hash_table[(hash & self.hash_mask) as usize];

        while idx != 0 {
            let prop_idx = (idx - 1) as usize;
            let prop = &self.properties[prop_idx];

            if prop.key == key {
                return Some(prop_idx);
            }

            idx = prop.hash_next;
        }

        None
    }

    /// Get a property value by key
    pub fn get(&self, key: StrId) -> Option<Value> {
        self.find(key).map(|idx| self.properties[idx].value)
    }

    /// Insert or update a property
    ///
    /// Returns true if this was a new property, false if updated.
    pub fn set(&mut self, key: StrId, value: Value) -> bool {
        if let Some(idx) = self.find(key) {
            self.properties[idx].value = value;
            return false;
        }

        let load = (self.properties.len() + 1) as f64 / (self.hash_mask + 1) as f64;
        if load > Self::MAX_LOAD_FACTOR {
            self.resize();
        }

        let hash = Self::hash_key(key);
        let bucket = (hash & self.hash_mask) as usize;

        let mut prop = Property::new(key, value);
        prop.hash_next = self.hash_table[bucket];

        // Reuse deleted slot or append
        let prop_idx = if self.first_free != 0 {
            let idx = (self.first_free - 1) as usize;
            self.first_free = self.properties[idx].hash_next;
            self.properties[idx] = prop;
            idx
        } else {
            let idx = self.properties.len();
            self.properties.push(prop);
            idx
        };

        self.hash_table[bucket] = (prop_idx + 1) as u32;
        self.prop_count += 1;

        true
    }

    /// Delete a property by key
    ///
    /// Returns true if the property existed.
    pub fn delete(&mut self, key: StrId) -> bool {
        if self.prop_count == 0 {
            return false;
        }

        let hash = Self::hash_key(key);
        let bucket = (hash & self.hash_mask) as usize;

        let mut prev_idx: Option<usize> = None;
        let mut idx = self.hash_table[bucket];

        while idx != 0 {
            let prop_idx = (idx - 1) as usize;
            let prop = &self.properties[prop_idx];

            if prop.key == key {
                // Unlink from hash chain, put slot on the free list
                let next = prop.hash_next;

                if let Some(prev) = prev_idx {
                    self.properties[prev].hash_next = next;
                } else {
                    self.hash_table[bucket] = next;
                }

                self.properties[prop_idx].key = DELETED_KEY;
                self.properties[prop_idx].value = Value::undefined();
                self.properties[prop_idx].hash_next = self.first_free;
                self.first_free = (prop_idx + 1) as u32;

                self.prop_count -= 1;
                return true;
            }

            prev_idx = Some(prop_idx);
            idx = prop.hash_next;
        }

        false
    }

    /// Resize the hash table
    fn resize(&mut self) {
        let new_size = ((self.hash_mask + 1) * 2) as usize;
        self.hash_mask = (new_size - 1) as u32;
        self.hash_table = vec![0; new_size];

        // Rehash all properties, skipping deleted slots
        for i in 0..self.properties.len() {
            if self.properties[i].is_deleted() {
                continue;
            }

            let hash = Self::hash_key(self.properties[i].key);
            let bucket = (hash & self.hash_mask) as usize;

            self.properties[i].hash_next = self.hash_table[bucket];
            self.hash_table[bucket] = (i + 1) as u32;
        }
    }

    /// Iterate over all properties in slot order
    pub fn iter(&self) -> impl Iterator<Item = &Property> {
        self.properties.iter().filter(|p| !p.is_deleted())
    }

    /// Iterate over all property keys in slot order
    pub fn keys(&self) -> impl Iterator<Item = StrId> + '_ {
        self.iter().map(|p| p.key)
    }

    /// Check if a property exists
    pub fn has(&self, key: StrId) -> bool {
        self.find(key).is_some()
    }
}

impl Default for PropertyTable {
    fn default() -> Self {
        Self::new()
    }
}
