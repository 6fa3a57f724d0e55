//! Newline-delimited `Key: Value` block parsing.
//!
//! Two operator-facing text formats share this shape: HTTP header blocks and
//! plugin config / per-photo parameter blocks. Both are validated before
//! dispatch ever sees them: a line without a colon and a duplicated key are
//! rejected.

use std::collections::BTreeMap;

use crate::errors::{Result, ValidationError};

/// Parses an HTTP header block, preserving line order.
///
/// Blank lines are skipped. Rejects lines without a colon and duplicate
/// header names.
pub fn parse_header_block(block: &str) -> Result<Vec<(String, String)>> {
    let mut headers: Vec<(String, String)> = Vec::new();
    for line in block.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| ValidationError::HeaderFormat(line.to_string()))?;
        let name = name.trim();
        if headers.iter().any(|(existing, _)| existing == name) {
            return Err(ValidationError::DuplicateHeader(name.to_string()).into());
        }
        headers.push((name.to_string(), value.trim().to_string()));
    }
    Ok(headers)
}

/// Parses a `key: value` config block into an ordered map.
///
/// Blank lines are skipped. Rejects lines without a colon and duplicate keys.
pub fn parse_kv_block(block: &str) -> Result<BTreeMap<String, String>> {
    let mut map = BTreeMap::new();
    for line in block.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (key, value) = line
            .split_once(':')
            .ok_or_else(|| ValidationError::ParameterFormat(line.to_string()))?;
        let key = key.trim().to_string();
        if map.contains_key(&key) {
            return Err(ValidationError::DuplicateKey(key).into());
        }
        map.insert(key, value.trim().to_string());
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;

    #[test]
    fn test_parse_header_block_valid() {
        let headers =
            parse_header_block("Authorization: Bearer 123\nContent-Type: application/json")
                .unwrap();
        assert_eq!(
            headers,
            vec![
                ("Authorization".to_string(), "Bearer 123".to_string()),
                ("Content-Type".to_string(), "application/json".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_header_block_skips_blank_lines() {
        let headers = parse_header_block("\nAccept: */*\n\n").unwrap();
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn test_header_without_colon_is_rejected() {
        let err = parse_header_block("Authorization Bearer 123").unwrap_err();
        match err {
            Error::Validation(ValidationError::HeaderFormat(line)) => {
                assert_eq!(line, "Authorization Bearer 123")
            }
            other => panic!("Expected HeaderFormat error, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_header_is_rejected() {
        let err =
            parse_header_block("Authorization: Bearer x\nAuthorization: Bearer y").unwrap_err();
        match err {
            Error::Validation(ValidationError::DuplicateHeader(name)) => {
                assert_eq!(name, "Authorization")
            }
            other => panic!("Expected DuplicateHeader error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_block_is_valid() {
        assert!(parse_header_block("").unwrap().is_empty());
        assert!(parse_kv_block("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_kv_block_valid() {
        let map = parse_kv_block("endpoint: https://example.com\napi_key: ${API_KEY}").unwrap();
        assert_eq!(map.get("endpoint").unwrap(), "https://example.com");
        assert_eq!(map.get("api_key").unwrap(), "${API_KEY}");
    }

    #[test]
    fn test_kv_value_may_contain_colons() {
        let map = parse_kv_block("url: https://example.com:8443/x").unwrap();
        assert_eq!(map.get("url").unwrap(), "https://example.com:8443/x");
    }

    #[test]
    fn test_duplicate_kv_key_is_rejected() {
        let err = parse_kv_block("key: a\nkey: b").unwrap_err();
        match err {
            Error::Validation(ValidationError::DuplicateKey(key)) => assert_eq!(key, "key"),
            other => panic!("Expected DuplicateKey error, got {:?}", other),
        }
    }
}
