//! Path configs: where cross-cutting fields are injected.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use super::path::FieldPath;
use crate::resource::Gvk;

/// PathConfig declares a field path to mutate and which resources it applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathConfig {
    /// Resources this path applies to; `None` applies it to every resource.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gvk: Option<Gvk>,
    pub path: FieldPath,
    #[serde(default)]
    pub create_if_not_present: bool,
}

impl PathConfig {
    /// Creates a new PathConfig.
    pub fn new(gvk: Option<Gvk>, path: impl Into<FieldPath>, create_if_not_present: bool) -> Self {
        PathConfig {
            gvk,
            path: path.into(),
            create_if_not_present,
        }
    }

    /// Returns true if this config applies to resources of type `gvk`.
    pub fn applies_to(&self, gvk: &Gvk) -> bool {
        gvk.is_selected(self.gvk.as_ref())
    }
}

const POD_TEMPLATE_KINDS: &[&str] = &[
    "Deployment",
    "ReplicaSet",
    "DaemonSet",
    "StatefulSet",
    "Job",
];
const SELECTOR_KINDS: &[&str] = &["Deployment", "ReplicaSet", "DaemonSet", "StatefulSet"];

/// Label paths applied when no explicit path configs are given.
pub static DEFAULT_LABEL_PATH_CONFIGS: Lazy<Vec<PathConfig>> = Lazy::new(|| {
    let mut configs = vec![
        PathConfig::new(None, "metadata/labels", true),
        PathConfig::new(Some(Gvk::new("", "v1", "Service")), "spec/selector", true),
    ];
    configs.extend(
        SELECTOR_KINDS
            .iter()
            .map(|kind| PathConfig::new(Some(Gvk::kind(*kind)), "spec/selector/matchLabels", true)),
    );
    configs.extend(POD_TEMPLATE_KINDS.iter().map(|kind| {
        PathConfig::new(Some(Gvk::kind(*kind)), "spec/template/metadata/labels", true)
    }));
    configs.push(PathConfig::new(
        Some(Gvk::kind("CronJob")),
        "spec/jobTemplate/spec/template/metadata/labels",
        true,
    ));
    configs.push(PathConfig::new(
        Some(Gvk::kind("StatefulSet")),
        "spec/volumeClaimTemplates/metadata/labels",
        false,
    ));
    configs
});

/// Annotation paths applied when no explicit path configs are given.
pub static DEFAULT_ANNOTATION_PATH_CONFIGS: Lazy<Vec<PathConfig>> = Lazy::new(|| {
    let mut configs = vec![PathConfig::new(None, "metadata/annotations", true)];
    configs.extend(POD_TEMPLATE_KINDS.iter().map(|kind| {
        PathConfig::new(Some(Gvk::kind(*kind)), "spec/template/metadata/annotations", true)
    }));
    configs.push(PathConfig::new(
        Some(Gvk::kind("CronJob")),
        "spec/jobTemplate/spec/template/metadata/annotations",
        true,
    ));
    configs
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_applies_to() {
        let service = PathConfig::new(Some(Gvk::new("", "v1", "Service")), "spec/selector", true);
        assert!(service.applies_to(&Gvk::new("", "v1", "Service")));
        assert!(!service.applies_to(&Gvk::new("apps", "v1", "Deployment")));
        assert!(PathConfig::new(None, "metadata/labels", true).applies_to(&Gvk::kind("Anything")));
    }

    #[test]
    fn test_default_label_configs_cover_pod_templates() {
        let deployment = Gvk::new("apps", "v1", "Deployment");
        let paths: Vec<String> = DEFAULT_LABEL_PATH_CONFIGS
            .iter()
            .filter(|pc| pc.applies_to(&deployment))
            .map(|pc| pc.path.to_string())
            .collect();
        assert_eq!(
            paths,
            vec![
                "metadata/labels",
                "spec/selector/matchLabels",
                "spec/template/metadata/labels",
            ]
        );
    }

    #[test]
    fn test_default_annotation_configs_skip_selectors() {
        assert!(DEFAULT_ANNOTATION_PATH_CONFIGS
            .iter()
            .all(|pc| !pc.path.to_string().contains("selector")));
    }

    #[test]
    fn test_deserialize_path_config() {
        let pc: PathConfig = serde_yaml::from_str(
            "gvk:\n  kind: Ingress\npath: metadata/annotations\ncreateIfNotPresent: true\n",
        )
        .unwrap();
        assert_eq!(
            pc,
            PathConfig::new(Some(Gvk::kind("Ingress")), "metadata/annotations", true)
        );
    }
}
