//! Transform module - Cross-cutting rewrites of a working set.
//!
//! A transformer walks every resource and applies its change at each path
//! config selecting that resource's type. [`MapTransformer`] is the one used
//! for common labels and annotations, [`PrefixTransformer`] for `namePrefix`.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{Error, Result};
use crate::fieldpath::{
    mutate_field, MutateFn, PathConfig, DEFAULT_ANNOTATION_PATH_CONFIGS, DEFAULT_LABEL_PATH_CONFIGS,
};
use crate::resmap::WorkingSet;
use crate::value::{Map, Value};

/// Transformer rewrites resources in a working set in place.
pub trait Transformer {
    fn transform(&self, ws: &mut WorkingSet) -> Result<()>;
}

/// MapTransformer merges a set of string pairs into the map found at each
/// applicable path. Existing keys are overwritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapTransformer {
    pub map: BTreeMap<String, String>,
    pub path_configs: Vec<PathConfig>,
}

impl MapTransformer {
    /// Creates a MapTransformer over explicit path configs.
    pub fn new(map: BTreeMap<String, String>, path_configs: Vec<PathConfig>) -> Self {
        MapTransformer { map, path_configs }
    }

    /// Adds `labels` at the default label paths.
    pub fn labels(labels: BTreeMap<String, String>) -> Self {
        Self::new(labels, DEFAULT_LABEL_PATH_CONFIGS.clone())
    }

    /// Adds `annotations` at the default annotation paths.
    pub fn annotations(annotations: BTreeMap<String, String>) -> Self {
        Self::new(annotations, DEFAULT_ANNOTATION_PATH_CONFIGS.clone())
    }

    fn merge_into(&self, current: Value, at: &str) -> Result<Value> {
        let mut target = match current {
            Value::Null => Map::new(),
            Value::Map(map) => map,
            other => {
                return Err(Error::unexpected_shape(
                    at,
                    format!("expected a map, found {}", other.type_name()),
                ))
            }
        };
        for (key, value) in &self.map {
            target.set(key.clone(), value.as_str());
        }
        Ok(Value::Map(target))
    }
}

impl Transformer for MapTransformer {
    fn transform(&self, ws: &mut WorkingSet) -> Result<()> {
        if self.map.is_empty() {
            return Ok(());
        }
        for (id, resource) in ws.iter_mut() {
            let Some(root) = resource.as_map_mut() else {
                return Err(Error::MalformedResource(format!("{} is not a map", id)));
            };
            for config in self.path_configs.iter().filter(|c| c.applies_to(&id.gvk)) {
                let at = format!("{} {}", id, config.path);
                let merge: &MutateFn<'_> = &|current| self.merge_into(current, &at);
                mutate_field(
                    root,
                    config.path.as_slice(),
                    config.create_if_not_present,
                    &[merge],
                )?;
            }
        }
        debug!(keys = self.map.len(), resources = ws.len(), "merged map into resources");
        Ok(())
    }
}

/// PrefixTransformer prepends a prefix to the string at each applicable path.
///
/// Only the document changes: the working set keeps the resource under its
/// original identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixTransformer {
    pub prefix: String,
    pub path_configs: Vec<PathConfig>,
}

impl PrefixTransformer {
    pub fn new(prefix: impl Into<String>, path_configs: Vec<PathConfig>) -> Self {
        PrefixTransformer {
            prefix: prefix.into(),
            path_configs,
        }
    }

    /// Prefixes `metadata/name` of every resource.
    pub fn names(prefix: impl Into<String>) -> Self {
        Self::new(prefix, vec![PathConfig::new(None, "metadata/name", false)])
    }

    fn prepend(&self, current: Value, at: &str) -> Result<Value> {
        match current {
            Value::String(name) => Ok(Value::String(format!("{}{}", self.prefix, name))),
            other => Err(Error::unexpected_shape(
                at,
                format!("expected a string, found {}", other.type_name()),
            )),
        }
    }
}

impl Transformer for PrefixTransformer {
    fn transform(&self, ws: &mut WorkingSet) -> Result<()> {
        if self.prefix.is_empty() {
            return Ok(());
        }
        for (id, resource) in ws.iter_mut() {
            let Some(root) = resource.as_map_mut() else {
                return Err(Error::MalformedResource(format!("{} is not a map", id)));
            };
            for config in self.path_configs.iter().filter(|c| c.applies_to(&id.gvk)) {
                let at = format!("{} {}", id, config.path);
                let prepend: &MutateFn<'_> = &|current| self.prepend(current, &at);
                mutate_field(
                    root,
                    config.path.as_slice(),
                    config.create_if_not_present,
                    &[prepend],
                )?;
            }
        }
        debug!(prefix = %self.prefix, resources = ws.len(), "prefixed resource names");
        Ok(())
    }
}

/// MultiTransformer runs transformers in order, stopping at the first error.
#[derive(Default)]
pub struct MultiTransformer {
    transformers: Vec<Box<dyn Transformer>>,
}

impl MultiTransformer {
    pub fn new() -> Self {
        MultiTransformer::default()
    }

    /// Appends a transformer, returning `self` for chaining.
    pub fn with(mut self, transformer: impl Transformer + 'static) -> Self {
        self.transformers.push(Box::new(transformer));
        self
    }

    pub fn len(&self) -> usize {
        self.transformers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transformers.is_empty()
    }
}

impl Transformer for MultiTransformer {
    fn transform(&self, ws: &mut WorkingSet) -> Result<()> {
        for transformer in &self.transformers {
            transformer.transform(ws)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::decode;
    use crate::resource::{Gvk, ResourceIdentity};
    use crate::value::from_yaml;
    use pretty_assertions::assert_eq;

    fn pairs(items: &[(&str, &str)]) -> BTreeMap<String, String> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn deployment_id() -> ResourceIdentity {
        ResourceIdentity::new(Gvk::new("apps", "v1", "Deployment"), "web")
    }

    const BARE_DEPLOYMENT: &str = "apiVersion: apps/v1\nkind: Deployment\nmetadata:\n  name: web\n";

    #[test]
    fn test_labels_on_bare_deployment() {
        let mut ws = decode(BARE_DEPLOYMENT.as_bytes()).unwrap();
        MapTransformer::new(
            pairs(&[("tier", "backend")]),
            vec![PathConfig::new(None, "metadata/labels", true)],
        )
        .transform(&mut ws)
        .unwrap();
        assert_eq!(
            ws.get(&deployment_id()).unwrap(),
            &from_yaml(
                "apiVersion: apps/v1\nkind: Deployment\nmetadata:\n  name: web\n  labels:\n    tier: backend\n"
            )
            .unwrap()
        );
    }

    #[test]
    fn test_selector_skips_other_kinds() {
        let mut ws = decode(BARE_DEPLOYMENT.as_bytes()).unwrap();
        let before = ws.clone();
        MapTransformer::new(
            pairs(&[("tier", "backend")]),
            vec![PathConfig::new(Some(Gvk::kind("Service")), "metadata/labels", true)],
        )
        .transform(&mut ws)
        .unwrap();
        assert_eq!(ws, before);
    }

    #[test]
    fn test_default_labels() {
        let mut ws = decode(
            concat!(
                "apiVersion: apps/v1\nkind: Deployment\nmetadata:\n  name: web\n  labels:\n    app: old\n",
                "spec:\n  selector:\n    matchLabels:\n      app: old\n",
                "  template:\n    metadata:\n      labels:\n        app: old\n",
                "---\n",
                "apiVersion: v1\nkind: Service\nmetadata:\n  name: web\nspec:\n  ports:\n  - port: 80\n",
            )
            .as_bytes(),
        )
        .unwrap();
        MapTransformer::labels(pairs(&[("app", "web"), ("env", "prod")]))
            .transform(&mut ws)
            .unwrap();

        let deployment = ws.get(&deployment_id()).unwrap();
        for path in [
            &["metadata", "labels"][..],
            &["spec", "selector", "matchLabels"],
            &["spec", "template", "metadata", "labels"],
        ] {
            assert_eq!(
                deployment.lookup(path),
                from_yaml("app: web\nenv: prod\n").ok().as_ref(),
                "{path:?}"
            );
        }

        let service = ws
            .get(&ResourceIdentity::new(Gvk::new("", "v1", "Service"), "web"))
            .unwrap();
        assert_eq!(
            service.lookup(&["spec", "selector"]),
            from_yaml("app: web\nenv: prod\n").ok().as_ref()
        );
        assert_eq!(
            service.lookup(&["spec", "ports"]),
            from_yaml("- port: 80\n").ok().as_ref()
        );
    }

    #[test]
    fn test_volume_claim_templates_fan_out() {
        let mut ws = decode(
            concat!(
                "apiVersion: apps/v1\nkind: StatefulSet\nmetadata:\n  name: db\n",
                "spec:\n  volumeClaimTemplates:\n",
                "  - metadata:\n      name: data\n      labels:\n        disk: ssd\n",
                "  - spec:\n      storageClassName: fast\n",
            )
            .as_bytes(),
        )
        .unwrap();
        MapTransformer::labels(pairs(&[("app", "db")]))
            .transform(&mut ws)
            .unwrap();

        let id = ResourceIdentity::new(Gvk::new("apps", "v1", "StatefulSet"), "db");
        let claims = ws
            .get(&id)
            .unwrap()
            .lookup(&["spec", "volumeClaimTemplates"])
            .and_then(Value::as_list)
            .unwrap();
        assert_eq!(
            claims[0].lookup(&["metadata", "labels", "app"]).and_then(Value::as_str),
            Some("db")
        );
        assert_eq!(
            claims[0].lookup(&["metadata", "labels", "disk"]).and_then(Value::as_str),
            Some("ssd")
        );
        // Element without metadata is left alone: that path is not created.
        assert_eq!(claims[1], from_yaml("spec:\n  storageClassName: fast\n").unwrap());
    }

    #[test]
    fn test_null_labels_are_replaced() {
        let mut ws = decode(
            b"apiVersion: apps/v1\nkind: Deployment\nmetadata:\n  name: web\n  labels:\n",
        )
        .unwrap();
        MapTransformer::labels(pairs(&[("a", "b")]))
            .transform(&mut ws)
            .unwrap();
        assert_eq!(
            ws.get(&deployment_id())
                .unwrap()
                .lookup(&["metadata", "labels", "a"])
                .and_then(Value::as_str),
            Some("b")
        );
    }

    #[test]
    fn test_scalar_labels_fail() {
        let mut ws = decode(
            b"apiVersion: apps/v1\nkind: Deployment\nmetadata:\n  name: web\n  labels: oops\n",
        )
        .unwrap();
        let err = MapTransformer::labels(pairs(&[("a", "b")]))
            .transform(&mut ws)
            .unwrap_err();
        assert!(matches!(err, Error::UnexpectedShape { .. }), "{err:?}");
    }

    #[test]
    fn test_multi_transformer() {
        let mut ws = decode(BARE_DEPLOYMENT.as_bytes()).unwrap();
        let multi = MultiTransformer::new()
            .with(MapTransformer::labels(pairs(&[("app", "web")])))
            .with(MapTransformer::annotations(pairs(&[("owner", "team-a")])));
        assert_eq!(multi.len(), 2);
        multi.transform(&mut ws).unwrap();

        let deployment = ws.get(&deployment_id()).unwrap();
        assert_eq!(
            deployment.lookup(&["metadata", "annotations", "owner"]).and_then(Value::as_str),
            Some("team-a")
        );
        assert_eq!(
            deployment
                .lookup(&["spec", "template", "metadata", "labels", "app"])
                .and_then(Value::as_str),
            Some("web")
        );
    }

    #[test]
    fn test_name_prefix_keeps_identity() {
        let mut ws = decode(
            concat!(
                "apiVersion: apps/v1\nkind: Deployment\nmetadata:\n  name: web\n",
                "---\n",
                "apiVersion: v1\nkind: Service\nmetadata:\n  name: web\n",
            )
            .as_bytes(),
        )
        .unwrap();
        PrefixTransformer::names("staging-").transform(&mut ws).unwrap();

        let service_id = ResourceIdentity::new(Gvk::new("", "v1", "Service"), "web");
        for id in [deployment_id(), service_id] {
            let resource = ws.get(&id).unwrap();
            assert_eq!(
                resource.lookup(&["metadata", "name"]).and_then(Value::as_str),
                Some("staging-web"),
                "{id}"
            );
        }
        assert_eq!(ws.len(), 2);
    }

    #[test]
    fn test_empty_prefix_is_a_no_op() {
        let mut ws = decode(BARE_DEPLOYMENT.as_bytes()).unwrap();
        let before = ws.clone();
        PrefixTransformer::names("").transform(&mut ws).unwrap();
        assert_eq!(ws, before);
    }

    #[test]
    fn test_prefix_on_non_string_name_fails() {
        let mut ws = decode(BARE_DEPLOYMENT.as_bytes()).unwrap();
        ws.get_mut(&deployment_id())
            .and_then(|d| d.lookup_mut(&["metadata"]))
            .and_then(Value::as_map_mut)
            .unwrap()
            .set("name", Value::List(vec![]));
        let err = PrefixTransformer::names("p-").transform(&mut ws).unwrap_err();
        assert!(matches!(err, Error::UnexpectedShape { .. }), "{err:?}");
    }

    #[test]
    fn test_empty_map_is_a_no_op() {
        let mut ws = decode(BARE_DEPLOYMENT.as_bytes()).unwrap();
        let before = ws.clone();
        MapTransformer::labels(BTreeMap::new()).transform(&mut ws).unwrap();
        assert_eq!(ws, before);
    }
}
