//! Manifest declarations consumed by the assembler.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::generate::SourceSpec;

/// Default manifest file name inside a manifest directory.
pub const MANIFEST_FILE_NAME: &str = "kforge.yaml";

/// Manifest lists the resources and generators of one directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// Prepended to the name of every resource in the output.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name_prefix: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub common_labels: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub common_annotations: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub configmaps: Vec<ConfigMapArgs>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub secrets: Vec<SecretArgs>,
}

impl Manifest {
    /// Parses a manifest from YAML.
    pub fn from_yaml(yaml: &[u8]) -> Result<Self> {
        serde_yaml::from_slice(yaml).map_err(|e| Error::Decode(format!("manifest: {}", e)))
    }
}

/// Source kind of a generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeneratorType {
    Literal,
    File,
    Env,
    Tls,
}

/// Source fields shared by ConfigMap and Secret declarations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Generic {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub literals: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub env: String,
}

impl Generic {
    fn literal_source(&self) -> SourceSpec {
        SourceSpec::Literal(self.literals.clone())
    }

    fn file_source(&self) -> SourceSpec {
        SourceSpec::Files(self.files.clone())
    }

    fn env_source(&self) -> SourceSpec {
        SourceSpec::EnvFile(self.env.clone())
    }
}

/// TLS pair for secrets of type `tls`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TlsFiles {
    #[serde(default)]
    pub cert_file: String,
    #[serde(default)]
    pub key_file: String,
}

/// A ConfigMap to generate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigMapArgs {
    pub name: String,
    #[serde(rename = "type")]
    pub generator_type: GeneratorType,
    #[serde(flatten)]
    pub generic: Generic,
}

impl ConfigMapArgs {
    /// Returns the source this declaration selects.
    pub fn source(&self) -> Result<SourceSpec> {
        match self.generator_type {
            GeneratorType::Literal => Ok(self.generic.literal_source()),
            GeneratorType::File => Ok(self.generic.file_source()),
            GeneratorType::Env => Ok(self.generic.env_source()),
            GeneratorType::Tls => Err(Error::InvalidTlsPair(format!(
                "configmap {:?}: TLS sources can only generate secrets",
                self.name
            ))),
        }
    }
}

/// A Secret to generate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretArgs {
    pub name: String,
    #[serde(rename = "type")]
    pub generator_type: GeneratorType,
    #[serde(flatten)]
    pub generic: Generic,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls: Option<TlsFiles>,
}

impl SecretArgs {
    /// Returns the source this declaration selects.
    ///
    /// A `tls` secret without a `tls` block yields empty paths, which fail
    /// later as an invalid TLS pair.
    pub fn source(&self) -> SourceSpec {
        match self.generator_type {
            GeneratorType::Literal => self.generic.literal_source(),
            GeneratorType::File => self.generic.file_source(),
            GeneratorType::Env => self.generic.env_source(),
            GeneratorType::Tls => {
                let tls = self.tls.clone().unwrap_or_default();
                SourceSpec::Tls {
                    cert_file: tls.cert_file,
                    key_file: tls.key_file,
                }
            }
        }
    }
}
