//! Value module - In-memory representation of YAML/JSON documents.
//!
//! Resources are held as untyped trees so that any kind, including custom
//! resources, can flow through a transformation pass.

mod value;

pub use value::*;
