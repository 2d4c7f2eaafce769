//! Serde helper functions for request deserialization.
//!
//! These handle the quirks of query strings and loosely-typed JSON bodies:
//! empty strings become `None`, numbers may arrive as strings, and tag lists
//! may arrive either as an array or as one comma-separated string.

use serde::{Deserialize, Deserializer};

/// Deserialize an optional string, treating empty strings as None.
pub fn deserialize_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    Ok(s.filter(|s| !s.trim().is_empty()))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IntOrString {
    Int(i64),
    Str(String),
}

/// Deserialize a positive integer leniently.
///
/// Accepts a JSON number or a numeric string. Anything that is not a
/// positive integer (garbage, zero, negatives) yields `None` rather than an
/// error, so callers can fall back to a default.
pub fn deserialize_positive_int<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<IntOrString> = Option::deserialize(deserializer)?;
    let value = match raw {
        Some(IntOrString::Int(n)) => Some(n),
        Some(IntOrString::Str(s)) => s.trim().parse::<i64>().ok(),
        None => None,
    };
    Ok(value.filter(|n| *n > 0).map(|n| n as u64))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TagsInput {
    List(Vec<String>),
    Csv(String),
}

/// Deserialize tags from either `["a", "b"]` or `"a, b"`.
///
/// Tags are trimmed, empty tags are dropped and duplicates removed while
/// keeping first-seen order.
pub fn deserialize_tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<TagsInput> = Option::deserialize(deserializer)?;
    let candidates: Vec<String> = match raw {
        Some(TagsInput::List(list)) => list,
        Some(TagsInput::Csv(csv)) => csv.split(',').map(str::to_string).collect(),
        None => Vec::new(),
    };

    let mut tags: Vec<String> = Vec::new();
    for tag in candidates {
        let tag = tag.trim();
        if !tag.is_empty() && !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }
    Ok(tags)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct TestStruct {
        #[serde(default, deserialize_with = "deserialize_optional_string")]
        string_field: Option<String>,
        #[serde(default, deserialize_with = "deserialize_positive_int")]
        number_field: Option<u64>,
        #[serde(default, deserialize_with = "deserialize_tags")]
        tags: Vec<String>,
    }

    #[test]
    fn test_empty_string_becomes_none() {
        let parsed: TestStruct = serde_json::from_str(r#"{"string_field": "  "}"#).unwrap();
        assert_eq!(parsed.string_field, None);

        let parsed: TestStruct = serde_json::from_str(r#"{"string_field": "hi"}"#).unwrap();
        assert_eq!(parsed.string_field, Some("hi".to_string()));
    }

    #[test]
    fn test_positive_int_from_number_or_string() {
        let parsed: TestStruct = serde_json::from_str(r#"{"number_field": 4}"#).unwrap();
        assert_eq!(parsed.number_field, Some(4));

        let parsed: TestStruct = serde_json::from_str(r#"{"number_field": " 7 "}"#).unwrap();
        assert_eq!(parsed.number_field, Some(7));
    }

    #[test]
    fn test_positive_int_rejects_garbage_without_error() {
        for raw in [r#""abc""#, "0", "-3", r#""""#, "null"] {
            let json = format!(r#"{{"number_field": {raw}}}"#);
            let parsed: TestStruct = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed.number_field, None, "input {raw}");
        }
    }

    #[test]
    fn test_tags_from_csv() {
        let parsed: TestStruct =
            serde_json::from_str(r#"{"tags": "rust, design,, rust , art"}"#).unwrap();
        assert_eq!(parsed.tags, vec!["rust", "design", "art"]);
    }

    #[test]
    fn test_tags_from_list() {
        let parsed: TestStruct = serde_json::from_str(r#"{"tags": [" a ", "b", "a"]}"#).unwrap();
        assert_eq!(parsed.tags, vec!["a", "b"]);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let parsed: TestStruct = serde_json::from_str("{}").unwrap();
        assert_eq!(
            parsed,
            TestStruct {
                string_field: None,
                number_field: None,
                tags: Vec::new(),
            }
        );
    }
}
