//! Granary In-Memory Driver
//!
//! A complete storage driver that keeps buckets and objects in process
//! memory. Useful for tests and as the reference behavior for the error
//! contract every driver follows.

pub mod memory;

pub use memory::MemoryDriver;
