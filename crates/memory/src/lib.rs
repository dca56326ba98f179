//! Memory file loading for Aide.
//!
//! Memory is a small, slowly-changing text file prepended to every prompt.
//! It is read fresh on each call and never cached.

pub mod loader;

pub use loader::{FsSource, MemoryLoad, MemoryLoader, MemorySource, load_memory};
