//! Cache module for storing API responses to disk
//!
//! This module provides a cache manager that persists JSON payloads to the
//! filesystem, one file per key, each stamped with its write time. Entries
//! are checked for staleness lazily at read time against a caller-supplied
//! maximum age; there is no background eviction.

mod manager;

pub use manager::CacheManager;
