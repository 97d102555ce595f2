//! Protochain - a minimalist prototype-based object system
//!
//! Protochain models object delegation the way prototype-based
//! languages do it, with the machinery made explicit: every object
//! carries a single non-owning ancestor reference, constructors pair a
//! native body with a prototype template, and both construction and
//! the `instanceof`-style chain query are ordinary functions walking
//! ordinary links.
//!
//! # Features
//! - Handle-based value model; identity comparison is handle equality
//! - Constructors with an explicit receiver instead of implicit `this`
//! - Chain-walking property lookup with shadowing
//! - Cycle-guarded chain walks that fail fast instead of hanging
//! - Object freezing and key enumeration
//!
//! # Example
//! ```
//! use protochain::{Context, Value};
//!
//! let mut ctx = Context::new();
//! let tower = ctx.register_ctor("Tower", |ctx, this, args| {
//!     ctx.set_str(this, "distance", args[0]);
//!     Value::undefined()
//! });
//!
//! let t = ctx.construct(tower, &[Value::int(100)]).unwrap();
//! assert_eq!(ctx.get_str(t, "distance").unwrap(), Value::int(100));
//! assert!(ctx.instance_of(t, tower).unwrap());
//! ```

// Core modules
pub mod context;
pub mod value;

// Runtime support
pub mod runtime;

// Re-export main types
pub use context::{Context, ContextStats, RuntimeError};
pub use value::{CtorId, ObjectId, StrId, Value};
