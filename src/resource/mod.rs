//! Resource module - Type coordinates and identities of manifest documents.

mod gvk;
mod identity;

pub use gvk::*;
pub use identity::*;
