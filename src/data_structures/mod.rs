//! Containers used for optimizer bookkeeping

pub mod hash_map;

pub use hash_map::{SlotKey, TwoTableMap, DEFAULT_CAPACITY};
