//! Constructor functions
//!
//! A constructor is a native function paired with exactly one prototype
//! template object, created when the constructor is registered. Every
//! instance built through the constructor starts with its ancestor
//! reference pointing at that template.
//!
//! The receiver is an explicit parameter. There is no implicit `this`;
//! the body gets the freshly allocated instance and assigns fields onto
//! it through the context.

use crate::context::Context;
use crate::value::{ObjectId, Value};

/// Constructor body signature
///
/// The body receives the context, the new instance as `this`, and the
/// argument slice. Returning `Value::Object` replaces the instance as
/// the construction result; any other return value is ignored and the
/// instance is used.
pub type ConstructorBody = fn(ctx: &mut Context, this: Value, args: &[Value]) -> Value;

/// A registered constructor and its prototype template
pub struct Constructor {
    /// Name, for diagnostics
    name: String,
    /// Native body invoked on each construction
    body: ConstructorBody,
    /// The prototype template, allocated at registration
    prototype: ObjectId,
}

impl Constructor {
    /// Create a new constructor record
    pub(crate) fn new(name: impl Into<String>, body: ConstructorBody, prototype: ObjectId) -> Self {
        Constructor {
            name: name.into(),
            body,
            prototype,
        }
    }

    /// Get the constructor name
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the body function
    #[inline]
    pub fn body(&self) -> ConstructorBody {
        self.body
    }

    /// Get the prototype template handle
    #[inline]
    pub fn prototype(&self) -> ObjectId {
        self.prototype
    }
}
