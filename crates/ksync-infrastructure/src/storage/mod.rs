//! Low-level file storage primitives.

mod atomic_json;

pub use atomic_json::JsonCollectionFile;
