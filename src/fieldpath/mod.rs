//! Field path module - Locating and mutating fields in nested resources.
//!
//! A [`PathConfig`] names a field by path and scopes it to a set of resource
//! types; [`mutate_field`] walks a resource tree along that path and rewrites
//! the field it finds there.

mod config;
mod mutate;
mod path;

pub use config::*;
pub use mutate::*;
pub use path::*;
