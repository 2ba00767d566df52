//! Synchronization primitives.
//!
//! Thin wrappers over std or parking_lot mutexes, plus relaxed counters for
//! backend statistics.

pub(crate) mod atomics;
pub(crate) mod mutex;
