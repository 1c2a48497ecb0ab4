use std::path::Path;

use tracing::{debug, info};

use crate::codec::decode_into;
use crate::error::{Error, Result};
use crate::fs::FileSystem;
use crate::generate::{make_config_map, make_secret, Generated};
use crate::manifest::Manifest;
use crate::resource::ResourceIdentity;
use crate::value::Value;

use super::WorkingSet;

/// Inserts a generated resource into `ws`.
///
/// The identity is taken from the declared name, so two generators declaring
/// the same name collide even when their contents (and so their hashed names)
/// differ. On success the stored resource carries the hashed name.
pub fn add_generated(ws: &mut WorkingSet, generated: Generated) -> Result<ResourceIdentity> {
    let Generated {
        mut resource,
        name,
        ..
    } = generated;
    let id = ResourceIdentity::of(&resource)?;
    if ws.contains(&id) {
        return Err(Error::DuplicateIdentity(id));
    }
    rename(&mut resource, &name)?;
    debug!(resource = %id, name = %name, "adding generated resource");
    ws.insert_as(id.clone(), resource)?;
    Ok(id)
}

fn rename(resource: &mut Value, name: &str) -> Result<()> {
    let metadata = resource
        .lookup_mut(&["metadata"])
        .and_then(Value::as_map_mut)
        .ok_or_else(|| Error::MalformedResource("metadata must be a map".to_string()))?;
    metadata.set("name", name);
    Ok(())
}

/// Synthesizes every ConfigMap and then every Secret the manifest declares.
///
/// Source paths are resolved against `base_dir`.
pub fn add_generated_from_manifest(
    fs: &dyn FileSystem,
    base_dir: &Path,
    manifest: &Manifest,
    ws: &mut WorkingSet,
) -> Result<()> {
    for args in &manifest.configmaps {
        let source = args.source()?.rooted_at(base_dir);
        add_generated(ws, make_config_map(fs, &args.name, &source)?)?;
    }
    for args in &manifest.secrets {
        let source = args.source().rooted_at(base_dir);
        add_generated(ws, make_secret(fs, &args.name, &source)?)?;
    }
    Ok(())
}

/// Reads and decodes every resource file the manifest lists.
pub fn load_resources(
    fs: &dyn FileSystem,
    base_dir: &Path,
    manifest: &Manifest,
    ws: &mut WorkingSet,
) -> Result<()> {
    for resource in &manifest.resources {
        let path = base_dir.join(resource);
        if fs.stat(&path)?.is_dir {
            return Err(Error::Decode(format!(
                "{}: resource path is a directory",
                path.display()
            )));
        }
        let contents = fs.read_file(&path)?;
        decode_into(&contents, ws).map_err(|e| match e {
            Error::Decode(message) => Error::Decode(format!("{}: {}", path.display(), message)),
            other => other,
        })?;
        debug!(path = %path.display(), "loaded resource file");
    }
    Ok(())
}

/// Builds the working set for a manifest: resource files first, then
/// generated ConfigMaps and Secrets. The first failure aborts.
pub fn assemble(fs: &dyn FileSystem, base_dir: &Path, manifest: &Manifest) -> Result<WorkingSet> {
    let mut ws = WorkingSet::new();
    load_resources(fs, base_dir, manifest, &mut ws)?;
    add_generated_from_manifest(fs, base_dir, manifest, &mut ws)?;
    info!(resources = ws.len(), "assembled working set");
    Ok(ws)
}
