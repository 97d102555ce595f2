//! Runtime support
//!
//! This module contains the core types of the object model:
//! - Object representation (ProtoObject, properties)
//! - String interning (StringTable)
//! - Constructor records and their prototype templates
//! - Ancestor-chain operations (construct, instance_of, lookup)

pub mod chain;
pub mod constructor;
pub mod object;
pub mod property;
pub mod string;

pub use chain::{ChainWalker, chain_keys, construct, has, instance_of, lookup};
pub use constructor::{Constructor, ConstructorBody};
pub use object::ProtoObject;
pub use property::{Property, PropertyTable};
pub use string::StringTable;
