//! Reading key/value data out of literal, env-file and file sources.

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{Error, Result};
use crate::fs::FileSystem;

/// Maximum length of a ConfigMap or Secret data key.
pub const MAX_KEY_LEN: usize = 253;

/// Data collected from a source, keyed and sorted by data key.
pub type DataMap = BTreeMap<String, Vec<u8>>;

/// Returns an error unless `key` is usable as a ConfigMap or Secret data key.
pub fn validate_key(key: &str) -> Result<()> {
    let valid_chars = key
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if key.is_empty()
        || key.len() > MAX_KEY_LEN
        || !valid_chars
        || key == "."
        || key == ".."
        || key.starts_with("..")
    {
        return Err(Error::InvalidKey(key.to_string()));
    }
    Ok(())
}

/// Parses a `key=value` literal. Matching quotes around the value are removed.
pub fn parse_literal(source: &str) -> Result<(String, String)> {
    let Some((key, value)) = source.split_once('=') else {
        return Err(Error::invalid_literal(source, "expected key=value"));
    };
    if key.is_empty() {
        return Err(Error::invalid_literal(source, "key must not be empty"));
    }
    Ok((key.to_string(), strip_quotes(value).to_string()))
}

fn strip_quotes(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

/// Collects literal sources. A key given twice is an error.
pub fn from_literals(sources: &[String]) -> Result<DataMap> {
    let mut data = DataMap::new();
    for source in sources {
        let (key, value) = parse_literal(source)?;
        insert_unique(&mut data, key, value.into_bytes())?;
    }
    Ok(data)
}

/// Reads an env file: one `key=value` per line.
///
/// Blank lines and `#` comments are skipped; a later assignment to the same
/// key wins.
pub fn from_env_file(fs: &dyn FileSystem, path: &str) -> Result<DataMap> {
    let contents = fs.read_file(Path::new(path))?;
    let text = String::from_utf8(contents).map_err(|_| {
        Error::invalid_literal(path, "env file is not valid UTF-8")
    })?;

    let mut data = DataMap::new();
    for (i, line) in text.lines().enumerate() {
        let line = if i == 0 { line.trim_start_matches('\u{feff}') } else { line };
        let line = line.trim_start();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            return Err(Error::invalid_literal(
                format!("{}:{}", path, i + 1),
                format!("expected key=value, got {:?}", line),
            ));
        };
        validate_key(key)?;
        data.insert(key.to_string(), value.as_bytes().to_vec());
    }
    Ok(data)
}

/// Parses a file source: either `path` or `key=path`.
pub fn parse_file_source(source: &str) -> Result<(String, String)> {
    match source.split_once('=') {
        Some((key, path)) => {
            if key.is_empty() || path.is_empty() {
                return Err(Error::InvalidFileSource(source.to_string()));
            }
            Ok((key.to_string(), path.to_string()))
        }
        None => {
            let key = Path::new(source)
                .file_name()
                .and_then(|name| name.to_str())
                .ok_or_else(|| Error::InvalidFileSource(source.to_string()))?;
            Ok((key.to_string(), source.to_string()))
        }
    }
}

/// Reads each file source in full. A key given twice is an error.
pub fn from_files(fs: &dyn FileSystem, sources: &[String]) -> Result<DataMap> {
    let mut data = DataMap::new();
    for source in sources {
        let (key, path) = parse_file_source(source)?;
        let contents = fs.read_file(Path::new(&path))?;
        insert_unique(&mut data, key, contents)?;
    }
    Ok(data)
}

fn insert_unique(data: &mut DataMap, key: String, value: Vec<u8>) -> Result<()> {
    validate_key(&key)?;
    if data.contains_key(&key) {
        return Err(Error::DuplicateDataKey(key));
    }
    data.insert(key, value);
    Ok(())
}
