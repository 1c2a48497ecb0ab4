//! Resource map module - The identity-keyed working set and its assembly.
//!
//! A [`WorkingSet`] lives for a single pass: it is populated from decoded
//! documents and generated ConfigMaps/Secrets, mutated by transformers, then
//! encoded and dropped.

mod assemble;


pub use assemble::*;

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::resource::ResourceIdentity;
use crate::value::Value;

/// WorkingSet maps resource identities to resource documents.
///
/// Iteration order is the identity order (group, version, kind, name), which
/// is also the order resources are encoded in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkingSet {
    resources: BTreeMap<ResourceIdentity, Value>,
}

impl WorkingSet {
    /// Creates an empty WorkingSet.
    pub fn new() -> Self {
        WorkingSet {
            resources: BTreeMap::new(),
        }
    }

    /// Returns the number of resources.
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Returns true if there are no resources.
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Returns true if a resource with this identity is present.
    pub fn contains(&self, id: &ResourceIdentity) -> bool {
        self.resources.contains_key(id)
    }

    /// Gets the resource stored under `id`.
    pub fn get(&self, id: &ResourceIdentity) -> Option<&Value> {
        self.resources.get(id)
    }

    /// Gets a mutable reference to the resource stored under `id`.
    pub fn get_mut(&mut self, id: &ResourceIdentity) -> Option<&mut Value> {
        self.resources.get_mut(id)
    }

    /// Inserts a resource under the identity extracted from its own fields.
    ///
    /// Fails with [`Error::DuplicateIdentity`] if the slot is taken.
    pub fn insert(&mut self, resource: Value) -> Result<ResourceIdentity> {
        let id = ResourceIdentity::of(&resource)?;
        self.insert_as(id.clone(), resource)?;
        Ok(id)
    }

    /// Inserts a resource under an explicit identity, refusing to overwrite.
    pub fn insert_as(&mut self, id: ResourceIdentity, resource: Value) -> Result<()> {
        if self.resources.contains_key(&id) {
            return Err(Error::DuplicateIdentity(id));
        }
        self.resources.insert(id, resource);
        Ok(())
    }

    /// Stores a resource under `id`, replacing any resource already there.
    pub fn set(&mut self, id: ResourceIdentity, resource: Value) -> Option<Value> {
        self.resources.insert(id, resource)
    }

    /// Removes the resource stored under `id`.
    pub fn remove(&mut self, id: &ResourceIdentity) -> Option<Value> {
        self.resources.remove(id)
    }

    /// Returns an iterator over identities and resources in identity order.
    pub fn iter(&self) -> impl Iterator<Item = (&ResourceIdentity, &Value)> {
        self.resources.iter()
    }

    /// Returns a mutable iterator over identities and resources.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&ResourceIdentity, &mut Value)> {
        self.resources.iter_mut()
    }

    /// Returns an iterator over identities in order.
    pub fn identities(&self) -> impl Iterator<Item = &ResourceIdentity> {
        self.resources.keys()
    }
}

impl IntoIterator for WorkingSet {
    type Item = (ResourceIdentity, Value);
    type IntoIter = std::collections::btree_map::IntoIter<ResourceIdentity, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.resources.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::Gvk;
    use crate::value::from_yaml;

    fn config_map(name: &str, value: &str) -> Value {
        from_yaml(&format!(
            "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: {name}\ndata:\n  k: {value}\n"
        ))
        .unwrap()
    }

    #[test]
    fn test_insert_and_get() {
        let mut ws = WorkingSet::new();
        let id = ws.insert(config_map("app-config", "a")).unwrap();
        assert_eq!(id, ResourceIdentity::new(Gvk::new("", "v1", "ConfigMap"), "app-config"));
        assert!(ws.contains(&id));
        assert_eq!(ws.len(), 1);
    }

    #[test]
    fn test_duplicate_identity_is_rejected() {
        let mut ws = WorkingSet::new();
        ws.insert(config_map("app-config", "a")).unwrap();
        let err = ws.insert(config_map("app-config", "b")).unwrap_err();
        assert!(matches!(err, Error::DuplicateIdentity(ref id) if id.name == "app-config"));
        assert!(err.to_string().contains("duplicate name"));
        assert_eq!(ws.len(), 1);
    }

    #[test]
    fn test_set_overwrites() {
        let mut ws = WorkingSet::new();
        let id = ws.insert(config_map("app-config", "a")).unwrap();
        let old = ws.set(id.clone(), config_map("app-config", "b"));
        assert_eq!(old, Some(config_map("app-config", "a")));
        assert_eq!(ws.get(&id), Some(&config_map("app-config", "b")));
    }

    #[test]
    fn test_insert_requires_identity() {
        let mut ws = WorkingSet::new();
        let doc = from_yaml("apiVersion: v1\nkind: ConfigMap\ndata: {}\n").unwrap();
        assert!(matches!(ws.insert(doc), Err(Error::MalformedResource(_))));
        assert!(ws.is_empty());
    }
}
