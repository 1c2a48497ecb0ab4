//! Recursive field mutation over untyped trees.

use crate::error::{Error, Result};
use crate::value::{Map, Value};

/// MutateFn rewrites the value found at the end of a field path.
pub type MutateFn<'a> = dyn Fn(Value) -> Result<Value> + 'a;

/// Applies `fns` in order to the field at `path` below `map`.
///
/// A missing segment is skipped unless `create_if_not_present` is set, in
/// which case an empty map is inserted there. Lists on the way are fanned
/// out: every element is visited with the remaining path, and each element
/// must be a map. A scalar where the path needs structure is an
/// [`Error::UnexpectedShape`].
///
/// The field at the end of the path is only replaced once every function has
/// succeeded, but maps created along the way and list elements visited before
/// a failure keep their changes.
pub fn mutate_field(
    map: &mut Map,
    path: &[String],
    create_if_not_present: bool,
    fns: &[&MutateFn<'_>],
) -> Result<()> {
    walk(map, path, 0, create_if_not_present, fns)
}

fn walk(
    map: &mut Map,
    path: &[String],
    depth: usize,
    create_if_not_present: bool,
    fns: &[&MutateFn<'_>],
) -> Result<()> {
    let Some(key) = path.get(depth) else {
        return Ok(());
    };

    if !map.has(key) {
        if !create_if_not_present {
            return Ok(());
        }
        map.set(key.clone(), Map::new());
    }
    let Some(slot) = map.get_mut(key) else {
        return Ok(());
    };

    if depth + 1 == path.len() {
        let mut current = slot.clone();
        for f in fns {
            current = f(current)?;
        }
        *slot = current;
        return Ok(());
    }

    match slot {
        Value::Map(child) => walk(child, path, depth + 1, create_if_not_present, fns),
        Value::List(items) => {
            for (i, item) in items.iter_mut().enumerate() {
                let Value::Map(child) = item else {
                    return Err(Error::unexpected_shape(
                        format!("{}[{}]", path[..=depth].join("/"), i),
                        format!("expected list elements to be maps, got {}", item.type_name()),
                    ));
                };
                walk(child, path, depth + 1, create_if_not_present, fns)?;
            }
            Ok(())
        }
        other => Err(Error::unexpected_shape(
            path[..=depth].join("/"),
            format!("cannot descend into {}", other.type_name()),
        )),
    }
}
