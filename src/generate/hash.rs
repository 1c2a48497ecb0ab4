//! Content hashes for generated resource names.

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

use crate::error::{Error, Result};

/// Length of the hash suffix appended to generated names.
pub const HASH_LEN: usize = 10;

// Field order is alphabetical so the JSON is stable without relying on map ordering.
#[derive(Serialize)]
struct ConfigMapHashInput<'a> {
    #[serde(rename = "binaryData", skip_serializing_if = "Option::is_none")]
    binary_data: Option<&'a BTreeMap<String, String>>,
    data: &'a BTreeMap<String, String>,
    kind: &'static str,
    name: &'a str,
}

#[derive(Serialize)]
struct SecretHashInput<'a> {
    data: &'a BTreeMap<String, String>,
    kind: &'static str,
    name: &'a str,
    #[serde(rename = "type")]
    secret_type: &'a str,
}

/// Hashes a ConfigMap's name prefix and sorted contents.
///
/// `binary_data` holds base64 values and only takes part in the hash when
/// non-empty, so text-only ConfigMaps hash the same as they always have.
pub fn config_map_hash(
    name: &str,
    data: &BTreeMap<String, String>,
    binary_data: &BTreeMap<String, String>,
) -> Result<String> {
    let input = ConfigMapHashInput {
        binary_data: (!binary_data.is_empty()).then_some(binary_data),
        data,
        kind: "ConfigMap",
        name,
    };
    hash_json(name, &input)
}

/// Hashes a Secret's name prefix, type and sorted base64 contents.
pub fn secret_hash(
    name: &str,
    secret_type: &str,
    data: &BTreeMap<String, String>,
) -> Result<String> {
    let input = SecretHashInput {
        data,
        kind: "Secret",
        name,
        secret_type,
    };
    hash_json(name, &input)
}

fn hash_json<T: Serialize>(name: &str, input: &T) -> Result<String> {
    let json = serde_json::to_vec(input).map_err(|source| Error::Hash {
        name: name.to_string(),
        source,
    })?;
    Ok(encode_hash(&hex::encode(Sha256::digest(&json))))
}

/// Shortens a hex digest and swaps the characters that would let it read as
/// a number or a word.
fn encode_hash(hex: &str) -> String {
    hex.chars()
        .take(HASH_LEN)
        .map(|c| match c {
            '0' => 'g',
            '1' => 'h',
            '3' => 'k',
            'a' => 'm',
            'e' => 't',
            other => other,
        })
        .collect()
}
