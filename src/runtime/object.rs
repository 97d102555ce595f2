//! Object representation
//!
//! A `ProtoObject` is a bag of own properties plus a single non-owning
//! ancestor reference. The ancestor link is where all delegation comes
//! from; there is no language-level inheritance anywhere in the model.

use crate::runtime::property::PropertyTable;
use crate::value::{StrId, Value};

/// An object with a single ancestor reference
///
/// `proto` is either `Value::Null` (chain terminal) or `Value::Object`.
/// It is a lookup link only; the arena owns every object, the link owns
/// nothing.
pub struct ProtoObject {
    /// Ancestor reference (Null = terminal)
    proto: Value,
    /// Own properties
    props: PropertyTable,
    /// Frozen objects silently ignore assignment and deletion
    frozen: bool,
}

impl ProtoObject {
    /// Create an object with no ancestor
    pub fn new() -> Self {
        ProtoObject {
            proto: Value::null(),
            props: PropertyTable::new(),
            frozen: false,
        }
    }

    /// Create an object with the given ancestor reference
    ///
    /// `proto` must be `Value::Null` or `Value::Object`; the context
    /// checks this before allocating.
    pub fn with_proto(proto: Value) -> Self {
        debug_assert!(proto.is_null() || proto.is_object());
        ProtoObject {
            proto,
            props: PropertyTable::new(),
            frozen: false,
        }
    }

    /// Get the ancestor reference
    #[inline]
    pub fn proto(&self) -> Value {
        self.proto
    }

    /// Replace the ancestor reference
    ///
    /// No-op on a frozen object. Returns true if the link was changed.
    pub fn set_proto(&mut self, proto: Value) -> bool {
        debug_assert!(proto.is_null() || proto.is_object());
        if self.frozen {
            return false;
        }
        self.proto = proto;
        true
    }

    /// Get an own property value
    #[inline]
    pub fn get_own(&self, key: StrId) -> Option<Value> {
        self.props.get(key)
    }

    /// Assign an own property
    ///
    /// No-op on a frozen object. Returns true if the assignment happened.
    pub fn set_own(&mut self, key: StrId, value: Value) -> bool {
        if self.frozen {
            return false;
        }
        self.props.set(key, value);
        true
    }

    /// Check for an own property
    #[inline]
    pub fn has_own(&self, key: StrId) -> bool {
        self.props.has(key)
    }

    /// Delete an own property
    ///
    /// No-op on a frozen object. Returns true if the property existed
    /// and was removed.
    pub fn delete_own(&mut self, key: StrId) -> bool {
        if self.frozen {
            return false;
        }
        self.props.delete(key)
    }

    /// Number of own properties
    #[inline]
    pub fn own_len(&self) -> usize {
        self.props.len()
    }

    /// Iterate over own property keys
    pub fn own_keys(&self) -> impl Iterator<Item = StrId> + '_ {
        self.props.keys()
    }

    /// Freeze the object
    ///
    /// After freezing, assignments, deletions, and ancestor changes are
    /// silently ignored. Freezing is permanent.
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    /// Check if the object is frozen
    #[inline]
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }
}

impl Default for ProtoObject {
    fn default() -> Self {
        Self::new()
    }
}
