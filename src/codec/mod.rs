//! Codec module - Reading and writing streams of manifest documents.

mod decode;
mod encode;

pub use decode::*;
pub use encode::*;
