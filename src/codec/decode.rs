//! Multi-document YAML/JSON decoding.

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::resmap::WorkingSet;
use crate::resource::ResourceIdentity;
use crate::value::Value;

/// Decodes a stream of documents into a new WorkingSet.
pub fn decode(input: &[u8]) -> Result<WorkingSet> {
    let mut ws = WorkingSet::new();
    decode_into(input, &mut ws)?;
    Ok(ws)
}

/// Decodes a stream of documents into `into`.
///
/// The stream is either YAML (documents separated by `---`) or, when it
/// starts with `{`, a sequence of concatenated JSON objects. Empty documents
/// are skipped. The whole stream is parsed before anything is inserted, so a
/// malformed document or a duplicate identity leaves `into` untouched.
pub fn decode_into(input: &[u8], into: &mut WorkingSet) -> Result<()> {
    let documents = parse_documents(input)?;

    let mut staged: Vec<(ResourceIdentity, Value)> = Vec::with_capacity(documents.len());
    for doc in documents {
        let id = ResourceIdentity::of(&doc)?;
        if into.contains(&id) || staged.iter().any(|(seen, _)| *seen == id) {
            return Err(Error::DuplicateIdentity(id));
        }
        staged.push((id, doc));
    }

    debug!(count = staged.len(), "decoded resources");
    for (id, doc) in staged {
        into.insert_as(id, doc)?;
    }
    Ok(())
}

fn parse_documents(input: &[u8]) -> Result<Vec<Value>> {
    let text = std::str::from_utf8(input)
        .map_err(|e| Error::Decode(format!("input is not valid UTF-8: {}", e)))?;
    let trimmed = text.trim_start_matches('\u{feff}').trim_start();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    let mut documents = Vec::new();
    if trimmed.starts_with('{') {
        for (i, item) in serde_json::Deserializer::from_str(trimmed)
            .into_iter::<Value>()
            .enumerate()
        {
            let value = item.map_err(|e| Error::Decode(format!("JSON document {}: {}", i + 1, e)))?;
            documents.push(value);
        }
    } else {
        for (i, doc) in serde_yaml::Deserializer::from_str(trimmed).enumerate() {
            let value = Value::deserialize(doc)
                .map_err(|e| Error::Decode(format!("YAML document {}: {}", i + 1, e)))?;
            if !value.is_null() {
                documents.push(value);
            }
        }
    }
    Ok(documents)
}
