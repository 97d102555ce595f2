//! Execution context
//!
//! The Context is the main entry point of the crate. It owns every
//! object, interned string, and registered constructor; the rest of the
//! API trades in plain [`Value`] handles into it. Because handles are
//! indices and nothing aliases the arena, the context is `Send` and a
//! set of independent contexts can run on independent threads freely.

use crate::runtime::chain;
use crate::runtime::constructor::{Constructor, ConstructorBody};
use crate::runtime::object::ProtoObject;
use crate::runtime::string::StringTable;
use crate::value::{CtorId, ObjectId, StrId, Value};

use thiserror::Error;

/// Error from an object-model operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// Construction or chain query aimed at something that is not a
    /// registered constructor
    #[error("not constructible: expected a constructor, found {found}")]
    NotConstructible {
        /// Type name of the offending value
        found: &'static str,
    },
    /// An ancestor chain revisited an object; the chain is malformed
    #[error("cyclic ancestor chain detected")]
    CyclicChain,
    /// An object operation aimed at a non-object receiver that cannot
    /// be silently ignored
    #[error("not an object: found {found}")]
    NotAnObject {
        /// Type name of the offending value
        found: &'static str,
    },
}

/// Context statistics
#[derive(Debug, Clone, Copy)]
pub struct ContextStats {
    /// Number of live objects in the arena
    pub objects: usize,
    /// Number of interned strings
    pub strings: usize,
    /// Number of registered constructors
    pub ctors: usize,
}

/// Object-model execution context
///
/// Owns the object arena, the string table, and the constructor
/// registry. Objects are never reclaimed individually; everything is
/// dropped with the context, which matches the model's lifecycle (an
/// instance lives as long as whoever holds its handle cares, a
/// prototype template as long as its constructor).
pub struct Context {
    /// Object arena, indexed by ObjectId
    objects: Vec<ProtoObject>,
    /// Interned strings
    strings: StringTable,
    /// Registered constructors, indexed by CtorId
    ctors: Vec<Constructor>,
}

impl Context {
    /// Create a new empty context
    pub fn new() -> Self {
        Context {
            objects: Vec::new(),
            strings: StringTable::new(),
            ctors: Vec::new(),
        }
    }

    // String interning

    /// Intern a string, returning it as a value
    pub fn intern(&mut self, s: &str) -> Value {
        Value::Str(self.strings.intern(s))
    }

    /// Intern a string, returning its raw id
    ///
    /// Useful as a property key when calling the id-based accessors in
    /// a loop.
    pub fn intern_id(&mut self, s: &str) -> StrId {
        self.strings.intern(s)
    }

    /// Get the text of an interned string id
    pub fn str_text(&self, id: StrId) -> Option<&str> {
        self.strings.get(id)
    }

    // Object allocation and ancestor links

    /// Allocate a plain object with no ancestor
    pub fn new_object(&mut self) -> Value {
        self.alloc_object_with_proto(Value::null())
    }

    /// Allocate an object whose ancestor reference is `proto`
    ///
    /// This is the manual-inheritance primitive: it links a fresh object
    /// to an existing one without any constructor involved. `proto`
    /// must be an object or null.
    pub fn new_object_with_proto(&mut self, proto: Value) -> Result<Value, RuntimeError> {
        if !proto.is_object() && !proto.is_null() {
            return Err(RuntimeError::NotAnObject {
                found: proto.type_name(),
            });
        }
        Ok(self.alloc_object_with_proto(proto))
    }

    pub(crate) fn alloc_object_with_proto(&mut self, proto: Value) -> Value {
        let id = ObjectId(self.objects.len() as u32);
        self.objects.push(ProtoObject::with_proto(proto));
        Value::Object(id)
    }

    /// Get an object's ancestor reference
    ///
    /// Returns None for a non-object value; primitives have no ancestor.
    pub fn proto_of(&self, value: Value) -> Option<Value> {
        let id = value.to_object_id()?;
        Some(self.object(id).proto())
    }

    /// Replace an object's ancestor reference
    ///
    /// Returns false without changing anything if the object is frozen.
    pub fn set_proto(&mut self, value: Value, proto: Value) -> Result<bool, RuntimeError> {
        let Some(id) = value.to_object_id() else {
            return Err(RuntimeError::NotAnObject {
                found: value.type_name(),
            });
        };
        if !proto.is_object() && !proto.is_null() {
            return Err(RuntimeError::NotAnObject {
                found: proto.type_name(),
            });
        }
        Ok(self.object_mut(id).set_proto(proto))
    }

    // Constructors

    /// Register a constructor
    ///
    /// Allocates the constructor's prototype template; every instance
    /// built through the returned handle starts linked to it.
    pub fn register_ctor(&mut self, name: &str, body: ConstructorBody) -> Value {
        let template = ObjectId(self.objects.len() as u32);
        self.objects.push(ProtoObject::new());

        let id = CtorId(self.ctors.len() as u32);
        self.ctors.push(Constructor::new(name, body, template));
        Value::Ctor(id)
    }

    /// Get a constructor's prototype template
    pub fn prototype_of(&self, target: Value) -> Result<Value, RuntimeError> {
        let Some(id) = target.to_ctor_id() else {
            return Err(RuntimeError::NotConstructible {
                found: target.type_name(),
            });
        };
        Ok(Value::Object(self.ctor(id).prototype()))
    }

    /// Get a constructor's name
    pub fn ctor_name(&self, target: Value) -> Result<&str, RuntimeError> {
        let Some(id) = target.to_ctor_id() else {
            return Err(RuntimeError::NotConstructible {
                found: target.type_name(),
            });
        };
        Ok(self.ctor(id).name())
    }

    /// Construct an instance through a constructor
    ///
    /// See [`chain::construct`] for the contract.
    pub fn construct(&mut self, target: Value, args: &[Value]) -> Result<Value, RuntimeError> {
        chain::construct(self, target, args)
    }

    /// Test whether a value's ancestor chain contains a constructor's
    /// prototype template
    ///
    /// See [`chain::instance_of`] for the contract.
    pub fn instance_of(&self, value: Value, target: Value) -> Result<bool, RuntimeError> {
        chain::instance_of(self, value, target)
    }

    // Property access

    /// Read a property, delegating up the ancestor chain
    pub fn get(&self, obj: Value, key: StrId) -> Result<Value, RuntimeError> {
        chain::lookup(self, obj, key)
    }

    /// Read a property by name, delegating up the ancestor chain
    ///
    /// A name that was never interned cannot exist on any object, so it
    /// reads as undefined without touching the chain.
    pub fn get_str(&self, obj: Value, key: &str) -> Result<Value, RuntimeError> {
        match self.strings.find(key) {
            Some(id) => chain::lookup(self, obj, id),
            None => Ok(Value::undefined()),
        }
    }

    /// Read an own property, without delegation
    pub fn get_own(&self, obj: Value, key: StrId) -> Option<Value> {
        let id = obj.to_object_id()?;
        self.object(id).get_own(key)
    }

    /// Assign an own property
    ///
    /// Always assigns on the receiver itself, shadowing any ancestor
    /// definition. Returns false (and does nothing) on a frozen or
    /// non-object receiver.
    pub fn set(&mut self, obj: Value, key: StrId, value: Value) -> bool {
        let Some(id) = obj.to_object_id() else {
            return false;
        };
        self.object_mut(id).set_own(key, value)
    }

    /// Assign an own property by name, interning the key
    pub fn set_str(&mut self, obj: Value, key: &str, value: Value) -> bool {
        let key = self.strings.intern(key);
        self.set(obj, key, value)
    }

    /// Assign a configuration list of fields onto a receiver
    ///
    /// Returns false (and assigns nothing) on a frozen or non-object
    /// receiver.
    pub fn assign_fields(&mut self, obj: Value, fields: &[(&str, Value)]) -> bool {
        let Some(id) = obj.to_object_id() else {
            return false;
        };
        if self.object(id).is_frozen() {
            return false;
        }
        for (name, value) in fields {
            let key = self.strings.intern(name);
            self.object_mut(id).set_own(key, *value);
        }
        true
    }

    /// Check for a property anywhere on the ancestor chain
    pub fn has(&self, obj: Value, key: StrId) -> Result<bool, RuntimeError> {
        chain::has(self, obj, key)
    }

    /// Check for an own property
    pub fn has_own(&self, obj: Value, key: StrId) -> bool {
        obj.to_object_id()
            .is_some_and(|id| self.object(id).has_own(key))
    }

    /// Delete an own property
    ///
    /// Returns false on a frozen or non-object receiver, or if the
    /// property did not exist. Ancestor definitions are never touched.
    pub fn delete(&mut self, obj: Value, key: StrId) -> bool {
        let Some(id) = obj.to_object_id() else {
            return false;
        };
        self.object_mut(id).delete_own(key)
    }

    // Enumeration

    /// Collect an object's own keys, in assignment order
    pub fn keys(&self, obj: Value) -> Vec<StrId> {
        match obj.to_object_id() {
            Some(id) => self.object(id).own_keys().collect(),
            None => Vec::new(),
        }
    }

    /// Collect every key visible on the ancestor chain, nearest first
    pub fn chain_keys(&self, obj: Value) -> Result<Vec<StrId>, RuntimeError> {
        chain::chain_keys(self, obj)
    }

    // Freezing

    /// Freeze an object
    ///
    /// Further assignments, deletions, and ancestor changes are silently
    /// ignored. Returns false on a non-object value. Freezing is
    /// permanent.
    pub fn freeze(&mut self, obj: Value) -> bool {
        let Some(id) = obj.to_object_id() else {
            return false;
        };
        self.object_mut(id).freeze();
        true
    }

    /// Check if an object is frozen
    pub fn is_frozen(&self, obj: Value) -> bool {
        obj.to_object_id()
            .is_some_and(|id| self.object(id).is_frozen())
    }

    /// Get context statistics
    pub fn stats(&self) -> ContextStats {
        ContextStats {
            objects: self.objects.len(),
            strings: self.strings.count(),
            ctors: self.ctors.len(),
        }
    }

    // Internal arena access. Handles only ever come from this context,
    // so indexing is infallible.

    #[inline]
    pub(crate) fn object(&self, id: ObjectId) -> &ProtoObject {
        &self.objects[id.index()]
    }

    #[inline]
    pub(crate) fn object_mut(&mut self, id: ObjectId) -> &mut ProtoObject {
        &mut self.objects[id.index()]
    }

    #[inline]
    pub(crate) fn ctor(&self, id: CtorId) -> &Constructor {
        &self.ctors[id.index()]
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tower_body(ctx: &mut Context, this: Value, args: &[Value]) -> Value {
        let distance = args.first().copied().unwrap_or_default();
        let name = args.get(1).copied().unwrap_or_default();
        ctx.assign_fields(this, &[("distance", distance), ("name", name)]);
        Value::undefined()
    }

    #[test]
    fn test_create_context() {
        let ctx = Context::new();
        let stats = ctx.stats();
        assert_eq!(stats.objects, 0);
        assert_eq!(stats.strings, 0);
        assert_eq!(stats.ctors, 0);
    }

    #[test]
    fn test_register_ctor_allocates_template() {
        let mut ctx = Context::new();
        let tower = ctx.register_ctor("Tower", tower_body);

        assert!(tower.is_ctor());
        assert_eq!(ctx.ctor_name(tower).unwrap(), "Tower");
        assert!(ctx.prototype_of(tower).unwrap().is_object());
        assert_eq!(ctx.stats().objects, 1);
        assert_eq!(ctx.stats().ctors, 1);
    }

    #[test]
    fn test_distinct_ctors_distinct_templates() {
        let mut ctx = Context::new();
        let c1 = ctx.register_ctor("Tower", tower_body);
        let c2 = ctx.register_ctor("Bullet", tower_body);

        assert_ne!(ctx.prototype_of(c1).unwrap(), ctx.prototype_of(c2).unwrap());
    }

    #[test]
    fn test_tower_scenario() {
        let mut ctx = Context::new();
        let tower = ctx.register_ctor("Tower", tower_body);
        let name = ctx.intern("tower1");

        let i = ctx.construct(tower, &[Value::int(100), name]).unwrap();

        assert_eq!(ctx.get_str(i, "distance").unwrap(), Value::int(100));
        assert_eq!(ctx.get_str(i, "name").unwrap(), name);
        assert!(ctx.instance_of(i, tower).unwrap());
    }

    #[test]
    fn test_plain_literal_is_not_an_instance() {
        let mut ctx = Context::new();
        let tower = ctx.register_ctor("Tower", tower_body);

        let name = ctx.intern("tower2");
        let o = ctx.new_object();
        ctx.assign_fields(o, &[("distance", Value::int(100)), ("name", name)]);

        assert!(!ctx.instance_of(o, tower).unwrap());
    }

    #[test]
    fn test_manual_multi_level_chain() {
        let mut ctx = Context::new();

        let grandparent = ctx.new_object();
        ctx.set_str(grandparent, "a", Value::int(1));
        let parent = ctx.new_object_with_proto(grandparent).unwrap();
        ctx.set_str(parent, "b", Value::int(2));
        let child = ctx.new_object_with_proto(parent).unwrap();
        ctx.set_str(child, "c", Value::int(3));

        assert_eq!(ctx.get_str(child, "a").unwrap(), Value::int(1));
        assert_eq!(ctx.get_str(child, "b").unwrap(), Value::int(2));
        assert_eq!(ctx.get_str(child, "c").unwrap(), Value::int(3));

        assert_eq!(ctx.proto_of(child), Some(parent));
        assert_eq!(ctx.proto_of(parent), Some(grandparent));
        assert_eq!(ctx.proto_of(grandparent), Some(Value::null()));
    }

    #[test]
    fn test_new_object_with_bad_proto() {
        let mut ctx = Context::new();
        let err = ctx.new_object_with_proto(Value::int(1)).unwrap_err();
        assert_eq!(err, RuntimeError::NotAnObject { found: "number" });
    }

    #[test]
    fn test_set_on_primitive_is_ignored() {
        let mut ctx = Context::new();
        assert!(!ctx.set_str(Value::int(1), "x", Value::int(2)));
        assert!(!ctx.assign_fields(Value::null(), &[("x", Value::int(2))]));
        assert!(!ctx.freeze(Value::undefined()));
    }

    #[test]
    fn test_own_vs_chain_access() {
        let mut ctx = Context::new();

        let parent = ctx.new_object();
        let x = ctx.intern_id("x");
        ctx.set(parent, x, Value::int(1));
        let child = ctx.new_object_with_proto(parent).unwrap();

        assert!(ctx.has(child, x).unwrap());
        assert!(!ctx.has_own(child, x));
        assert_eq!(ctx.get_own(child, x), None);
        assert_eq!(ctx.get(child, x).unwrap(), Value::int(1));
    }

    #[test]
    fn test_delete_never_touches_ancestors() {
        let mut ctx = Context::new();

        let parent = ctx.new_object();
        let x = ctx.intern_id("x");
        ctx.set(parent, x, Value::int(1));
        let child = ctx.new_object_with_proto(parent).unwrap();
        ctx.set(child, x, Value::int(2));

        assert!(ctx.delete(child, x));
        // The shadow is gone, the ancestor definition shows through again
        assert_eq!(ctx.get(child, x).unwrap(), Value::int(1));
        assert!(!ctx.delete(child, x));
        assert!(ctx.has_own(parent, x));
    }

    #[test]
    fn test_keys_enumeration() {
        let mut ctx = Context::new();

        let o = ctx.new_object();
        let a = ctx.intern_id("a");
        let b = ctx.intern_id("b");
        ctx.set(o, a, Value::int(1));
        ctx.set(o, b, Value::int(2));

        assert_eq!(ctx.keys(o), vec![a, b]);
        assert_eq!(ctx.keys(Value::int(5)), vec![]);
        assert_eq!(ctx.str_text(a), Some("a"));
    }

    #[test]
    fn test_freeze_semantics() {
        let mut ctx = Context::new();

        let o = ctx.new_object();
        let x = ctx.intern_id("x");
        ctx.set(o, x, Value::int(1));
        assert!(ctx.freeze(o));
        assert!(ctx.is_frozen(o));

        assert!(!ctx.set(o, x, Value::int(2)));
        assert!(!ctx.delete(o, x));
        assert!(!ctx.assign_fields(o, &[("y", Value::int(3))]));
        assert_eq!(ctx.get(o, x).unwrap(), Value::int(1));
        assert_eq!(ctx.keys(o).len(), 1);
    }

    #[test]
    fn test_frozen_template_still_queried() {
        let mut ctx = Context::new();
        let tower = ctx.register_ctor("Tower", tower_body);
        let template = ctx.prototype_of(tower).unwrap();
        ctx.set_str(template, "shared", Value::int(7));
        ctx.freeze(template);

        let i = ctx.construct(tower, &[]).unwrap();
        assert!(ctx.instance_of(i, tower).unwrap());
        assert_eq!(ctx.get_str(i, "shared").unwrap(), Value::int(7));
    }

    #[test]
    fn test_prototype_of_non_ctor() {
        let ctx = Context::new();
        let err = ctx.prototype_of(Value::bool(true)).unwrap_err();
        assert_eq!(err, RuntimeError::NotConstructible { found: "boolean" });
    }
}
