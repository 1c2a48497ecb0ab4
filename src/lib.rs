//! # kforge
//!
//! Assembles Kubernetes manifests into a deterministic multi-document stream.
//!
//! Resources are decoded from YAML or JSON files, ConfigMaps and Secrets are
//! generated from literals, env files, plain files and TLS pairs with a
//! content hash appended to their names, and cross-cutting labels and
//! annotations are injected along configurable field paths.
//!
//! ## Modules
//!
//! - [`value`] - Untyped YAML/JSON document trees
//! - [`resource`] - Group/version/kind and resource identities
//! - [`fieldpath`] - Field paths, path configs and the tree mutator
//! - [`resmap`] - The identity-keyed working set and its assembly
//! - [`codec`] - Multi-document decoding and deterministic encoding
//! - [`generate`] - ConfigMap and Secret generation
//! - [`transform`] - Label and annotation transformers
//! - [`manifest`] - The `kforge.yaml` declaration format
//! - [`fs`] - File system access

pub mod codec;
pub mod error;
pub mod fieldpath;
pub mod fs;
pub mod generate;
pub mod manifest;
pub mod resmap;
pub mod resource;
pub mod transform;
pub mod value;

pub use codec::{decode, encode};
pub use error::{Error, Result};
pub use fieldpath::{mutate_field, FieldPath, PathConfig};
pub use fs::{FileSystem, MemFs, RealFs};
pub use manifest::Manifest;
pub use resmap::{assemble, WorkingSet};
pub use resource::{Gvk, ResourceIdentity};
pub use transform::{MapTransformer, MultiTransformer, PrefixTransformer, Transformer};
pub use value::Value;
