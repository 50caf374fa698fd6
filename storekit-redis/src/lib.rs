//! Typed accessors over a Redis-like remote store.
//!
//! This crate provides two generic data-structure adapters, a typed hash
//! map ([`FieldMap`]) and a typed sorted queue ([`ZQueue`]), on top of one
//! client contract ([`StoreClient`]). Values are marshalled through
//! `storekit-core`'s wire codec; writes can refresh a container's TTL in
//! the same atomic pipeline. [`MemoryStore`] is an embedded client
//! implementation used by tests and server-less deployments.

pub mod client;
pub mod field_map;
pub mod memory;
pub mod zqueue;

pub use client::{Command, Reply, ScoreBound, ScoredMember, StoreClient};
pub use field_map::FieldMap;
pub use memory::MemoryStore;
pub use zqueue::{Element, ElementListExt, MAX_SAFE_SCORE, ZQueue};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::client::{Command, Reply, ScoreBound, ScoredMember, StoreClient};
    pub use crate::field_map::FieldMap;
    pub use crate::memory::MemoryStore;
    pub use crate::zqueue::{Element, ElementListExt, ZQueue};
    pub use storekit_core::codec::{Json, WireValue};
    pub use storekit_core::error::{Result, StoreError};
}
