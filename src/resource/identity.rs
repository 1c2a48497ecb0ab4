//! Resource identity and its extraction from a document.

use std::fmt;

use super::gvk::Gvk;
use crate::error::{Error, Result};
use crate::value::Value;

/// ResourceIdentity is the working-set key: type coordinates plus name.
///
/// For generated ConfigMaps and Secrets the name is the one the manifest
/// declared, before any hash suffix is applied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceIdentity {
    pub gvk: Gvk,
    pub name: String,
}

impl ResourceIdentity {
    /// Creates a new ResourceIdentity.
    pub fn new(gvk: Gvk, name: impl Into<String>) -> Self {
        ResourceIdentity {
            gvk,
            name: name.into(),
        }
    }

    /// Extracts the identity of a resource from `apiVersion`, `kind` and
    /// `metadata.name`.
    pub fn of(resource: &Value) -> Result<Self> {
        let map = resource.as_map().ok_or_else(|| {
            Error::MalformedResource(format!(
                "expected a map at the document root, got {}",
                resource.type_name()
            ))
        })?;

        let api_version = required_string(resource, &["apiVersion"])?;
        let kind = required_string(resource, &["kind"])?;
        let gvk = Gvk::from_api_version(api_version, kind)?;
        if gvk.version.is_empty() {
            return Err(Error::MalformedResource(format!(
                "apiVersion {:?} has no version",
                api_version
            )));
        }

        if !matches!(map.get("metadata"), Some(Value::Map(_))) {
            return Err(Error::MalformedResource(format!(
                "{} has no metadata map",
                gvk
            )));
        }
        let name = required_string(resource, &["metadata", "name"])?;

        Ok(ResourceIdentity::new(gvk, name))
    }
}

fn required_string<'a>(resource: &'a Value, path: &[&str]) -> Result<&'a str> {
    match resource.lookup(path) {
        Some(Value::String(s)) if !s.is_empty() => Ok(s),
        Some(Value::String(_)) | None | Some(Value::Null) => Err(Error::MalformedResource(
            format!("missing required field {}", path.join(".")),
        )),
        Some(other) => Err(Error::MalformedResource(format!(
            "field {} must be a string, got {}",
            path.join("."),
            other.type_name()
        ))),
    }
}

impl fmt::Display for ResourceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?}", self.gvk, self.name)
    }
}
