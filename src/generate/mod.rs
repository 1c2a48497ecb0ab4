//! Generate module - ConfigMaps and Secrets built from source material.
//!
//! Every generated resource carries its declared name; the content hash is
//! computed alongside and returned as [`Generated::name`] so the caller can
//! check for collisions on the declared name before renaming.

mod hash;
mod source;
mod tls;

pub use hash::*;
pub use source::*;
pub use tls::*;

use base64::Engine as _;
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{Error, Result};
use crate::fs::FileSystem;
use crate::value::{Map, Value};

/// Secret type for generic secrets.
pub const SECRET_TYPE_OPAQUE: &str = "Opaque";
/// Secret type for TLS certificate/key pairs.
pub const SECRET_TYPE_TLS: &str = "kubernetes.io/tls";
/// Data key holding the certificate of a TLS secret.
pub const TLS_CERT_KEY: &str = "tls.crt";
/// Data key holding the private key of a TLS secret.
pub const TLS_PRIVATE_KEY_KEY: &str = "tls.key";

/// SourceSpec describes where generated data comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSpec {
    /// `key=value` pairs.
    Literal(Vec<String>),
    /// A file of `key=value` lines.
    EnvFile(String),
    /// Files read whole, as `path` or `key=path`.
    Files(Vec<String>),
    /// A certificate and private key file.
    Tls { cert_file: String, key_file: String },
}

impl SourceSpec {
    /// Resolves relative file paths against `base`. Empty paths stay empty.
    pub fn rooted_at(&self, base: &Path) -> SourceSpec {
        let join = |path: &str| -> String {
            if path.is_empty() {
                String::new()
            } else {
                base.join(path).to_string_lossy().into_owned()
            }
        };
        match self {
            SourceSpec::Literal(literals) => SourceSpec::Literal(literals.clone()),
            SourceSpec::EnvFile(path) => SourceSpec::EnvFile(join(path)),
            SourceSpec::Files(files) => SourceSpec::Files(
                files
                    .iter()
                    .map(|source| match source.split_once('=') {
                        Some((key, path)) => format!("{}={}", key, join(path)),
                        None => join(source),
                    })
                    .collect(),
            ),
            SourceSpec::Tls {
                cert_file,
                key_file,
            } => SourceSpec::Tls {
                cert_file: join(cert_file),
                key_file: join(key_file),
            },
        }
    }
}

/// Generated is a freshly built ConfigMap or Secret.
#[derive(Debug, Clone, PartialEq)]
pub struct Generated {
    /// The resource, still named with the declared name prefix.
    pub resource: Value,
    /// The name prefix the manifest declared.
    pub declared_name: String,
    /// The declared name followed by `-` and the content hash.
    pub name: String,
}

/// Builds a ConfigMap named `name_prefix` from `source`.
///
/// File contents that are not valid UTF-8 are stored base64-encoded under
/// `binaryData`.
pub fn make_config_map(
    fs: &dyn FileSystem,
    name_prefix: &str,
    source: &SourceSpec,
) -> Result<Generated> {
    let raw = match source {
        SourceSpec::Literal(literals) => from_literals(literals)?,
        SourceSpec::EnvFile(path) => from_env_file(fs, path)?,
        SourceSpec::Files(files) => from_files(fs, files)?,
        SourceSpec::Tls { .. } => {
            return Err(Error::InvalidTlsPair(
                "TLS sources can only generate secrets".to_string(),
            ))
        }
    };

    let mut data = BTreeMap::new();
    let mut binary_data = BTreeMap::new();
    for (key, bytes) in raw {
        match String::from_utf8(bytes) {
            Ok(text) => {
                data.insert(key, text);
            }
            Err(e) => {
                binary_data.insert(key, encode_base64(e.as_bytes()));
            }
        }
    }

    let hash = config_map_hash(name_prefix, &data, &binary_data)?;

    let mut resource = skeleton("ConfigMap", name_prefix);
    if !data.is_empty() {
        resource.set("data", Value::from(data));
    }
    if !binary_data.is_empty() {
        resource.set("binaryData", Value::from(binary_data));
    }

    Ok(Generated {
        resource: Value::Map(resource),
        declared_name: name_prefix.to_string(),
        name: format!("{}-{}", name_prefix, hash),
    })
}

/// Builds a Secret named `name_prefix` from `source`.
///
/// A TLS source checks both paths are set before touching the file system,
/// then validates the pair.
pub fn make_secret(
    fs: &dyn FileSystem,
    name_prefix: &str,
    source: &SourceSpec,
) -> Result<Generated> {
    let (secret_type, raw) = match source {
        SourceSpec::Literal(literals) => (SECRET_TYPE_OPAQUE, from_literals(literals)?),
        SourceSpec::EnvFile(path) => (SECRET_TYPE_OPAQUE, from_env_file(fs, path)?),
        SourceSpec::Files(files) => (SECRET_TYPE_OPAQUE, from_files(fs, files)?),
        SourceSpec::Tls {
            cert_file,
            key_file,
        } => (SECRET_TYPE_TLS, read_tls_pair(fs, cert_file, key_file)?),
    };

    let data: BTreeMap<String, String> = raw
        .into_iter()
        .map(|(key, bytes)| (key, encode_base64(&bytes)))
        .collect();
    let hash = secret_hash(name_prefix, secret_type, &data)?;

    let mut resource = skeleton("Secret", name_prefix);
    resource.set("type", secret_type);
    if !data.is_empty() {
        resource.set("data", Value::from(data));
    }

    Ok(Generated {
        resource: Value::Map(resource),
        declared_name: name_prefix.to_string(),
        name: format!("{}-{}", name_prefix, hash),
    })
}

fn read_tls_pair(fs: &dyn FileSystem, cert_file: &str, key_file: &str) -> Result<DataMap> {
    if key_file.is_empty() {
        return Err(Error::InvalidTlsPair("key must be specified".to_string()));
    }
    if cert_file.is_empty() {
        return Err(Error::InvalidTlsPair("certificate must be specified".to_string()));
    }
    let cert = fs.read_file(Path::new(cert_file))?;
    let key = fs.read_file(Path::new(key_file))?;
    validate_tls_pair(&cert, &key)?;

    let mut data = DataMap::new();
    data.insert(TLS_CERT_KEY.to_string(), cert);
    data.insert(TLS_PRIVATE_KEY_KEY.to_string(), key);
    Ok(data)
}

fn skeleton(kind: &str, name: &str) -> Map {
    let mut metadata = Map::new();
    metadata.set("name", name);

    let mut resource = Map::new();
    resource.set("apiVersion", "v1");
    resource.set("kind", kind);
    resource.set("metadata", metadata);
    resource
}

fn encode_base64(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}
