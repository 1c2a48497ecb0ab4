//! Deterministic YAML encoding of a working set.

use crate::error::{Error, Result};
use crate::resmap::WorkingSet;

/// Separator written between consecutive documents.
pub const DOCUMENT_SEPARATOR: &str = "---\n";

/// Encodes every resource as a YAML document in identity order.
///
/// Documents are separated by a `---` line; nothing precedes the first
/// document and nothing follows the last. Map keys are written sorted, so
/// equal working sets always encode to identical bytes.
pub fn encode(ws: &WorkingSet) -> Result<Vec<u8>> {
    let mut out = String::new();
    for (i, (id, resource)) in ws.iter().enumerate() {
        let doc = serde_yaml::to_string(resource).map_err(|e| Error::Encode {
            identity: id.clone(),
            message: e.to_string(),
        })?;
        if i > 0 {
            out.push_str(DOCUMENT_SEPARATOR);
        }
        out.push_str(&doc);
    }
    Ok(out.into_bytes())
}
