//! Type coordinates and the selector used to scope path configs.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// Gvk identifies the schema type of a resource: group, version and kind.
///
/// An empty group denotes the core API group. When used as a selector, an
/// empty field matches anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Gvk {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub group: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
}

impl Gvk {
    /// Creates a new Gvk.
    pub fn new(
        group: impl Into<String>,
        version: impl Into<String>,
        kind: impl Into<String>,
    ) -> Self {
        Gvk {
            group: group.into(),
            version: version.into(),
            kind: kind.into(),
        }
    }

    /// Creates a selector that matches a kind in any group or version.
    pub fn kind(kind: impl Into<String>) -> Self {
        Gvk {
            kind: kind.into(),
            ..Default::default()
        }
    }

    /// Parses an `apiVersion` string plus kind.
    ///
    /// `apps/v1` yields group `apps`, `v1` yields the core group.
    pub fn from_api_version(api_version: &str, kind: impl Into<String>) -> Result<Self> {
        let (group, version) = match api_version.split_once('/') {
            None => ("", api_version),
            Some((_, v)) if v.contains('/') => {
                return Err(Error::MalformedResource(format!(
                    "unexpected apiVersion {:?}: more than one '/'",
                    api_version
                )))
            }
            Some((g, v)) => (g, v),
        };
        Ok(Gvk::new(group, version, kind))
    }

    /// Returns the `apiVersion` form of the group and version.
    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }

    /// Returns true if `selector` selects this Gvk.
    ///
    /// A missing selector is a wildcard. Otherwise every non-empty field of
    /// the selector must equal the corresponding field exactly, so
    /// `{kind: Deployment}` selects `extensions/v1beta1 Deployment` while
    /// `{group: apps, kind: Deployment}` does not.
    pub fn is_selected(&self, selector: Option<&Gvk>) -> bool {
        let Some(selector) = selector else {
            return true;
        };
        if !selector.group.is_empty() && self.group != selector.group {
            return false;
        }
        if !selector.version.is_empty() && self.version != selector.version {
            return false;
        }
        if !selector.kind.is_empty() && self.kind != selector.kind {
            return false;
        }
        true
    }
}

impl fmt::Display for Gvk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}, Kind={}", self.group, self.version, self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_from_api_version() {
        assert_eq!(
            Gvk::from_api_version("apps/v1", "Deployment").unwrap(),
            Gvk::new("apps", "v1", "Deployment")
        );
        assert_eq!(
            Gvk::from_api_version("v1", "Service").unwrap(),
            Gvk::new("", "v1", "Service")
        );
        assert!(matches!(
            Gvk::from_api_version("a/b/c", "Thing"),
            Err(Error::MalformedResource(_))
        ));
    }

    #[test]
    fn test_api_version() {
        assert_eq!(Gvk::new("apps", "v1", "Deployment").api_version(), "apps/v1");
        assert_eq!(Gvk::new("", "v1", "ConfigMap").api_version(), "v1");
    }

    #[test]
    fn test_selector_wildcard() {
        let gvk = Gvk::new("apps", "v1", "Deployment");
        assert!(gvk.is_selected(None));
        assert!(gvk.is_selected(Some(&Gvk::default())));
    }

    #[test]
    fn test_selector_partial_fields() {
        let deployment = Gvk::new("extensions", "v1beta1", "Deployment");
        assert!(deployment.is_selected(Some(&Gvk::kind("Deployment"))));
        assert!(!deployment.is_selected(Some(&Gvk::new("apps", "", "Deployment"))));
        assert!(deployment.is_selected(Some(&Gvk::new("", "v1beta1", ""))));
        assert!(!deployment.is_selected(Some(&Gvk::kind("Service"))));
    }

    #[test]
    fn test_display() {
        assert_eq!(Gvk::new("", "v1", "Secret").to_string(), "/v1, Kind=Secret");
    }
}
