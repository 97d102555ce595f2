//! Ancestor-chain operations
//!
//! This module implements the two core operations of the object model:
//! construction (allocate an instance, link it to the constructor's
//! prototype template, run the body) and the chain query (does a given
//! template appear anywhere in a value's ancestor chain). Property
//! lookup through the chain lives here too, since it is the same walk.
//!
//! Well-formed chains are finite and acyclic. A cyclic chain is caller
//! misuse; every walk carries a visited set and fails with
//! [`RuntimeError::CyclicChain`] instead of looping.

use crate::context::{Context, RuntimeError};
use crate::value::{ObjectId, StrId, Value};

/// Iterator over an ancestor chain with cycle detection
///
/// Yields object handles from a starting point down the chain. On a
/// cyclic chain it yields `Err(CyclicChain)` once and then stops.
pub struct ChainWalker<'a> {
    ctx: &'a Context,
    next: Option<ObjectId>,
    seen: Vec<ObjectId>,
}

impl<'a> ChainWalker<'a> {
    /// Walk starting at the object itself, then its ancestors
    pub fn starting_at(ctx: &'a Context, start: ObjectId) -> Self {
        ChainWalker {
            ctx,
            next: Some(start),
            seen: Vec::new(),
        }
    }

    /// Walk the ancestors only, skipping the object itself
    pub fn ancestors_of(ctx: &'a Context, start: ObjectId) -> Self {
        ChainWalker {
            ctx,
            next: ctx.object(start).proto().to_object_id(),
            seen: vec![start],
        }
    }
}

impl Iterator for ChainWalker<'_> {
    type Item = Result<ObjectId, RuntimeError>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;

        if self.seen.contains(&id) {
            self.next = None;
            return Some(Err(RuntimeError::CyclicChain));
        }

        // Chains are short; a linear visited set beats hashing here
        self.seen.push(id);
        self.next = self.ctx.object(id).proto().to_object_id();
        Some(Ok(id))
    }
}

/// Construct an instance through a constructor
///
/// Allocates a fresh instance, links its ancestor reference to the
/// constructor's prototype template, and invokes the body with the
/// instance as the explicit receiver. If the body returns an object,
/// that object is the result; otherwise the instance is.
pub fn construct(ctx: &mut Context, target: Value, args: &[Value]) -> Result<Value, RuntimeError> {
    let Some(ctor_id) = target.to_ctor_id() else {
        return Err(RuntimeError::NotConstructible {
            found: target.type_name(),
        });
    };

    let ctor = ctx.ctor(ctor_id);
    let body = ctor.body();
    let template = ctor.prototype();

    let instance = ctx.alloc_object_with_proto(Value::Object(template));
    let returned = body(ctx, instance, args);

    if returned.is_object() {
        Ok(returned)
    } else {
        Ok(instance)
    }
}

/// Test whether a constructor's prototype template appears in a value's
/// ancestor chain
///
/// Primitives (including null and undefined) never participate in
/// ancestor chains, so any non-object candidate is immediately false.
/// Templates are compared by handle identity, never structurally.
pub fn instance_of(ctx: &Context, value: Value, target: Value) -> Result<bool, RuntimeError> {
    let Some(ctor_id) = target.to_ctor_id() else {
        return Err(RuntimeError::NotConstructible {
            found: target.type_name(),
        });
    };
    let template = ctx.ctor(ctor_id).prototype();

    let Some(start) = value.to_object_id() else {
        return Ok(false);
    };

    for ancestor in ChainWalker::ancestors_of(ctx, start) {
        if ancestor? == template {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Read a property, delegating up the ancestor chain
///
/// The nearest definition wins. A key absent from the whole chain reads
/// as undefined, as does any read on a non-object receiver.
pub fn lookup(ctx: &Context, value: Value, key: StrId) -> Result<Value, RuntimeError> {
    let Some(start) = value.to_object_id() else {
        return Ok(Value::undefined());
    };

    for link in ChainWalker::starting_at(ctx, start) {
        if let Some(found) = ctx.object(link?).get_own(key) {
            return Ok(found);
        }
    }
    Ok(Value::undefined())
}

/// Check whether a key exists anywhere on the ancestor chain
pub fn has(ctx: &Context, value: Value, key: StrId) -> Result<bool, RuntimeError> {
    let Some(start) = value.to_object_id() else {
        return Ok(false);
    };

    for link in ChainWalker::starting_at(ctx, start) {
        if ctx.object(link?).has_own(key) {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Collect every key visible on the ancestor chain
///
/// Own keys come first, then each ancestor's, nearest first. A key is
/// reported once; shadowed definitions further up are skipped.
pub fn chain_keys(ctx: &Context, value: Value) -> Result<Vec<StrId>, RuntimeError> {
    let Some(start) = value.to_object_id() else {
        return Ok(Vec::new());
    };

    let mut keys: Vec<StrId> = Vec::new();
    for link in ChainWalker::starting_at(ctx, start) {
        for key in ctx.object(link?).own_keys() {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
    }
    Ok(keys)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;

    fn tower_body(ctx: &mut Context, this: Value, args: &[Value]) -> Value {
        let distance = args.first().copied().unwrap_or_default();
        let name = args.get(1).copied().unwrap_or_default();
        ctx.set_str(this, "distance", distance);
        ctx.set_str(this, "name", name);
        Value::undefined()
    }

    fn replacing_body(ctx: &mut Context, _this: Value, _args: &[Value]) -> Value {
        let other = ctx.new_object();
        ctx.set_str(other, "replaced", Value::bool(true));
        other
    }

    #[test]
    fn test_construct_links_template() {
        let mut ctx = Context::new();
        let tower = ctx.register_ctor("Tower", tower_body);

        let i = construct(&mut ctx, tower, &[]).unwrap();
        assert!(i.is_object());
        assert_eq!(ctx.proto_of(i), Some(ctx.prototype_of(tower).unwrap()));
    }

    #[test]
    fn test_construct_applies_fields() {
        let mut ctx = Context::new();
        let tower = ctx.register_ctor("Tower", tower_body);
        let name = ctx.intern("tower1");

        let i = construct(&mut ctx, tower, &[Value::int(100), name]).unwrap();
        assert_eq!(ctx.get_str(i, "distance").unwrap(), Value::int(100));
        assert_eq!(ctx.get_str(i, "name").unwrap(), name);
    }

    #[test]
    fn test_construct_explicit_return_wins() {
        let mut ctx = Context::new();
        let ctor = ctx.register_ctor("Replacer", replacing_body);

        let result = construct(&mut ctx, ctor, &[]).unwrap();
        assert_eq!(ctx.get_str(result, "replaced").unwrap(), Value::bool(true));
        // The replacement is not linked to the template
        assert!(!instance_of(&ctx, result, ctor).unwrap());
    }

    #[test]
    fn test_construct_rejects_non_constructible() {
        let mut ctx = Context::new();
        let obj = ctx.new_object();

        for target in [Value::int(3), Value::null(), Value::undefined(), obj] {
            let err = construct(&mut ctx, target, &[]).unwrap_err();
            assert!(matches!(err, RuntimeError::NotConstructible { .. }));
        }
    }

    #[test]
    fn test_instance_of_primitives() {
        let mut ctx = Context::new();
        let tower = ctx.register_ctor("Tower", tower_body);
        let s = ctx.intern("tower1");

        for v in [
            Value::undefined(),
            Value::null(),
            Value::bool(true),
            Value::int(7),
            s,
        ] {
            assert!(!instance_of(&ctx, v, tower).unwrap());
        }
    }

    #[test]
    fn test_instance_of_fresh_instance() {
        let mut ctx = Context::new();
        let tower = ctx.register_ctor("Tower", tower_body);

        let i = construct(&mut ctx, tower, &[]).unwrap();
        assert!(instance_of(&ctx, i, tower).unwrap());
    }

    #[test]
    fn test_instance_of_unrelated_ctor() {
        let mut ctx = Context::new();
        let tower = ctx.register_ctor("Tower", tower_body);
        let other = ctx.register_ctor("Other", tower_body);

        let i = construct(&mut ctx, tower, &[]).unwrap();
        assert!(!instance_of(&ctx, i, other).unwrap());
    }

    #[test]
    fn test_instance_of_unlinked_literal() {
        let mut ctx = Context::new();
        let tower = ctx.register_ctor("Tower", tower_body);

        // Same shape as a tower, no link to the template
        let name = ctx.intern("tower2");
        let o = ctx.new_object();
        ctx.set_str(o, "distance", Value::int(100));
        ctx.set_str(o, "name", name);

        assert!(!instance_of(&ctx, o, tower).unwrap());
    }

    #[test]
    fn test_instance_of_multi_level() {
        let mut ctx = Context::new();
        let tower = ctx.register_ctor("Tower", tower_body);

        let i = construct(&mut ctx, tower, &[]).unwrap();
        let derived = ctx.new_object_with_proto(i).unwrap();

        // Template found two links up
        assert!(instance_of(&ctx, derived, tower).unwrap());
    }

    #[test]
    fn test_instance_of_requires_constructible() {
        let mut ctx = Context::new();
        let obj = ctx.new_object();

        let err = instance_of(&ctx, obj, Value::int(1)).unwrap_err();
        assert!(matches!(err, RuntimeError::NotConstructible { found: "number" }));
    }

    #[test]
    fn test_lookup_walks_chain() {
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
        assert_eq!(ctx.get_str(child, "d").unwrap(), Value::undefined());
    }

    #[test]
    fn test_lookup_shadowing() {
        let mut ctx = Context::new();

        let parent = ctx.new_object();
        ctx.set_str(parent, "x", Value::int(1));
        let child = ctx.new_object_with_proto(parent).unwrap();
        ctx.set_str(child, "x", Value::int(2));

        // Nearest definition wins; the ancestor is untouched
        assert_eq!(ctx.get_str(child, "x").unwrap(), Value::int(2));
        assert_eq!(ctx.get_str(parent, "x").unwrap(), Value::int(1));
    }

    #[test]
    fn test_lookup_on_primitive() {
        let mut ctx = Context::new();
        let key = ctx.intern_id("x");

        assert_eq!(lookup(&ctx, Value::int(5), key).unwrap(), Value::undefined());
        assert!(!has(&ctx, Value::null(), key).unwrap());
        assert!(chain_keys(&ctx, Value::bool(true)).unwrap().is_empty());
    }

    #[test]
    fn test_chain_keys_shadowed_once() {
        let mut ctx = Context::new();

        let parent = ctx.new_object();
        ctx.set_str(parent, "x", Value::int(1));
        ctx.set_str(parent, "y", Value::int(2));
        let child = ctx.new_object_with_proto(parent).unwrap();
        ctx.set_str(child, "x", Value::int(3));

        let x = ctx.intern_id("x");
        let y = ctx.intern_id("y");
        assert_eq!(chain_keys(&ctx, child).unwrap(), vec![x, y]);
    }

    #[test]
    fn test_cyclic_chain_detected() {
        let mut ctx = Context::new();
        let tower = ctx.register_ctor("Tower", tower_body);

        let a = ctx.new_object();
        let b = ctx.new_object_with_proto(a).unwrap();
        ctx.set_proto(a, b).unwrap();

        let key = ctx.intern_id("missing");
        assert_eq!(instance_of(&ctx, b, tower), Err(RuntimeError::CyclicChain));
        assert_eq!(lookup(&ctx, b, key), Err(RuntimeError::CyclicChain));
        assert_eq!(has(&ctx, b, key), Err(RuntimeError::CyclicChain));
        assert_eq!(chain_keys(&ctx, b), Err(RuntimeError::CyclicChain));
    }

    #[test]
    fn test_self_cycle_detected() {
        let mut ctx = Context::new();
        let a = ctx.new_object();
        ctx.set_proto(a, a).unwrap();

        let key = ctx.intern_id("k");
        assert_eq!(lookup(&ctx, a, key), Err(RuntimeError::CyclicChain));
    }

    #[test]
    fn test_lookup_present_key_before_cycle() {
        let mut ctx = Context::new();
        let a = ctx.new_object();
        ctx.set_str(a, "k", Value::int(9));
        ctx.set_proto(a, a).unwrap();

        // The own property is found before the walk revisits anything
        assert_eq!(ctx.get_str(a, "k").unwrap(), Value::int(9));
    }
}
