//! Dynamic value representation
//!
//! A `Value` is a single word: either an immediate primitive or a handle
//! into the owning [`Context`](crate::Context). Handles are plain indices,
//! so comparing two `Value`s compares identity, not structure. That is
//! exactly the comparison the ancestor-chain query needs.
//!
//! Strings are interned in the context's string table, which makes string
//! values and property keys identity-comparable as well.

use std::fmt;

/// Handle to an object in a context's object arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct ObjectId(pub(crate) u32);

impl ObjectId {
    /// Arena index of this object.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Handle to an interned string in a context's string table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct StrId(pub(crate) u32);

impl StrId {
    /// Table index of this string.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Handle to a registered constructor in a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct CtorId(pub(crate) u32);

impl CtorId {
    /// Registry index of this constructor.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Dynamic value
///
/// This is the main value type used throughout the crate. Primitives are
/// stored inline; objects, strings, and constructors are context handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Value {
    /// Absent value (the default for missing properties)
    Undefined,
    /// Explicit null (also the ancestor-chain terminal)
    Null,
    /// Boolean
    Bool(bool),
    /// 32-bit signed integer
    Int(i32),
    /// Interned string handle
    Str(StrId),
    /// Object handle
    Object(ObjectId),
    /// Constructor handle
    Ctor(CtorId),
}

impl Value {
    // Constructors for primitive values

    /// Create an undefined value
    #[inline]
    pub const fn undefined() -> Self {
        Value::Undefined
    }

    /// Create a null value
    #[inline]
    pub const fn null() -> Self {
        Value::Null
    }

    /// Create a boolean value
    #[inline]
    pub const fn bool(b: bool) -> Self {
        Value::Bool(b)
    }

    /// Create an integer value
    #[inline]
    pub const fn int(val: i32) -> Self {
        Value::Int(val)
    }

    // Type checking

    /// Check if this is undefined
    #[inline]
    pub const fn is_undefined(self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// Check if this is null
    #[inline]
    pub const fn is_null(self) -> bool {
        matches!(self, Value::Null)
    }

    /// Check if this is nullish (null or undefined)
    #[inline]
    pub const fn is_nullish(self) -> bool {
        matches!(self, Value::Null | Value::Undefined)
    }

    /// Check if this is a boolean
    #[inline]
    pub const fn is_bool(self) -> bool {
        matches!(self, Value::Bool(_))
    }

    /// Check if this is an integer
    #[inline]
    pub const fn is_int(self) -> bool {
        matches!(self, Value::Int(_))
    }

    /// Check if this is an interned string
    #[inline]
    pub const fn is_str(self) -> bool {
        matches!(self, Value::Str(_))
    }

    /// Check if this is an object handle
    #[inline]
    pub const fn is_object(self) -> bool {
        matches!(self, Value::Object(_))
    }

    /// Check if this is a constructor handle
    #[inline]
    pub const fn is_ctor(self) -> bool {
        matches!(self, Value::Ctor(_))
    }

    /// Check if this is a primitive (everything except an object handle)
    ///
    /// Primitives never participate in ancestor chains.
    #[inline]
    pub const fn is_primitive(self) -> bool {
        !self.is_object()
    }

    // Value extraction

    /// Get boolean value, returns None if not a boolean
    #[inline]
    pub const fn to_bool(self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(b),
            _ => None,
        }
    }

    /// Get integer value, returns None if not an integer
    #[inline]
    pub const fn to_i32(self) -> Option<i32> {
        match self {
            Value::Int(i) => Some(i),
            _ => None,
        }
    }

    /// Get string handle, returns None if not a string
    #[inline]
    pub const fn to_str_id(self) -> Option<StrId> {
        match self {
            Value::Str(id) => Some(id),
            _ => None,
        }
    }

    /// Get object handle, returns None if not an object
    #[inline]
    pub const fn to_object_id(self) -> Option<ObjectId> {
        match self {
            Value::Object(id) => Some(id),
            _ => None,
        }
    }

    /// Get constructor handle, returns None if not a constructor
    #[inline]
    pub const fn to_ctor_id(self) -> Option<CtorId> {
        match self {
            Value::Ctor(id) => Some(id),
            _ => None,
        }
    }

    /// Short type name, used in error messages
    pub const fn type_name(self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "number",
            Value::Str(_) => "string",
            Value::Object(_) => "object",
            Value::Ctor(_) => "constructor",
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Undefined
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Str(id) => write!(f, "[string #{}]", id.0),
            Value::Object(id) => write!(f, "[object #{}]", id.0),
            Value::Ctor(id) => write!(f, "[constructor #{}]", id.0),
        }
    }
}
