// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! JSON request body validation.
//!
//! Each route that accepts a body declares a [`FieldSpec`]. A body is
//! accepted only if it is a JSON object that contains every mandatory field
//! and nothing outside the mandatory and optional fields. Values are not
//! interpreted here.

use std::collections::BTreeSet;

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use serde_json::{Map, Value};

use crate::error::{ApiError, Result};

/// A validated request document.
pub type Document = Map<String, Value>;

/// Message for bodies that are not a JSON object.
pub const NO_JSON_OBJECT: &str = "no JSON object";

/// Mandatory and optional field names of a request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Fields that must be present.
    pub mandatory: &'static [&'static str],
    /// Fields that may be present.
    pub optional: &'static [&'static str],
}

impl FieldSpec {
    /// Declare a field specification.
    pub const fn new(
        mandatory: &'static [&'static str],
        optional: &'static [&'static str],
    ) -> Self {
        Self {
            mandatory,
            optional,
        }
    }

    fn allows(&self, key: &str) -> bool {
        self.mandatory.iter().chain(self.optional).any(|k| *k == key)
    }
}

/// Parse a body as a JSON object and check it against the specification.
///
/// Missing mandatory fields are reported before unknown fields.
pub fn validate_body(body: &[u8], spec: &FieldSpec) -> Result<Document> {
    let doc = match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(doc)) => doc,
        _ => return Err(ApiError::invalid(NO_JSON_OBJECT)),
    };
    validate_document(doc, spec)
}

/// Validate an already parsed JSON object.
pub fn validate_document(doc: Document, spec: &FieldSpec) -> Result<Document> {
    let missing: Vec<&str> = spec
        .mandatory
        .iter()
        .copied()
        .filter(|key| !doc.contains_key(*key))
        .collect();
    if !missing.is_empty() {
        return Err(ApiError::invalid(format!(
            "missing element(s) {}",
            quote_list(missing.into_iter())
        )));
    }
    let unknown: BTreeSet<&str> = doc
        .keys()
        .map(String::as_str)
        .filter(|key| !spec.allows(key))
        .collect();
    if !unknown.is_empty() {
        return Err(ApiError::invalid(format!(
            "unknown element(s) {}",
            quote_list(unknown.into_iter())
        )));
    }
    Ok(doc)
}

/// Validate a body that may be omitted. An empty body yields `None`.
pub fn optional_body(body: &[u8], spec: &FieldSpec) -> Result<Option<Document>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    validate_body(body, spec).map(Some)
}

fn quote_list<'a>(keys: impl Iterator<Item = &'a str>) -> String {
    keys.map(|k| format!("'{k}'"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Raw request body, with body read failures mapped to API errors.
///
/// Reading fails with 413 when the body limit is exceeded.
#[derive(Debug, Clone)]
pub struct RawBody(pub Bytes);

impl<S> FromRequest<S> for RawBody
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self> {
        Bytes::from_request(req, state)
            .await
            .map(RawBody)
            .map_err(body_rejection)
    }
}

fn body_rejection(rejection: BytesRejection) -> ApiError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::UploadTooLarge(rejection.body_text())
    } else {
        ApiError::invalid(rejection.body_text())
    }
}

// ============================================================================
// Document accessors
// ============================================================================

/// String value of a field that passed validation.
pub fn require_str<'a>(doc: &'a Document, key: &str) -> Result<&'a str> {
    doc.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| ApiError::invalid(format!("'{key}' not a string")))
}

/// Optional string value; `null` counts as absent.
pub fn optional_str<'a>(doc: &'a Document, key: &str) -> Result<Option<&'a str>> {
    match doc.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(_) => Err(ApiError::invalid(format!("'{key}' not a string"))),
    }
}

/// Optional list value; `null` counts as absent.
pub fn optional_list(doc: &Document, key: &str) -> Result<Option<Vec<Value>>> {
    match doc.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(items)) => Ok(Some(items.clone())),
        Some(_) => Err(ApiError::invalid(format!("{key} not a list"))),
    }
}

/// Optional list of strings; `null` counts as absent.
pub fn optional_str_list(doc: &Document, key: &str) -> Result<Option<Vec<String>>> {
    let Some(items) = optional_list(doc, key)? else {
        return Ok(None);
    };
    items
        .into_iter()
        .map(|item| match item {
            Value::String(s) => Ok(s),
            _ => Err(ApiError::invalid(format!("{key} not a list of strings"))),
        })
        .collect::<Result<Vec<_>>>()
        .map(Some)
}

/// JSON truthiness: `null`, `false`, `0`, `""`, `[]` and `{}` are false.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const LOGIN: FieldSpec = FieldSpec::new(&["username", "password"], &[]);
    const REGISTER: FieldSpec = FieldSpec::new(&["username", "password"], &["verify"]);
    const UPDATE: FieldSpec = FieldSpec::new(&[], &["name", "members"]);

    fn message(err: ApiError) -> String {
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        err.to_string()
    }

    #[test]
    fn test_valid_body() {
        let doc = validate_body(br#"{"username": "a", "password": "b"}"#, &LOGIN).unwrap();
        assert_eq!(doc.len(), 2);
        assert_eq!(doc["username"], json!("a"));
    }

    #[test]
    fn test_optional_subsets_accepted() {
        validate_body(br#"{"username": "a", "password": "b"}"#, &REGISTER).unwrap();
        validate_body(br#"{"username": "a", "password": "b", "verify": true}"#, &REGISTER)
            .unwrap();
        validate_body(b"{}", &UPDATE).unwrap();
        validate_body(br#"{"members": []}"#, &UPDATE).unwrap();
    }

    #[test]
    fn test_not_an_object() {
        for body in ["", "not json", "[1, 2]", "\"text\"", "null"] {
            let err = validate_body(body.as_bytes(), &LOGIN).unwrap_err();
            assert_eq!(message(err), NO_JSON_OBJECT);
        }
    }

    #[test]
    fn test_missing_mandatory_fields() {
        let err = validate_body(b"{}", &LOGIN).unwrap_err();
        assert_eq!(message(err), "missing element(s) 'username', 'password'");
    }

    #[test]
    fn test_unknown_fields() {
        let body = br#"{"username": "a", "password": "b", "zeta": 1, "alpha": 2}"#;
        let err = validate_body(body, &LOGIN).unwrap_err();
        assert_eq!(message(err), "unknown element(s) 'alpha', 'zeta'");
    }

    #[test]
    fn test_missing_reported_before_unknown() {
        let err = validate_body(br#"{"username": "a", "extra": 1}"#, &LOGIN).unwrap_err();
        assert_eq!(message(err), "missing element(s) 'password'");
    }

    #[test]
    fn test_null_counts_as_present() {
        let doc = validate_body(br#"{"username": "a", "password": null}"#, &LOGIN).unwrap();
        assert_eq!(doc["password"], Value::Null);
    }

    #[test]
    fn test_optional_body() {
        const CANCEL: FieldSpec = FieldSpec::new(&["reason"], &[]);
        assert!(optional_body(b"", &CANCEL).unwrap().is_none());
        assert!(optional_body(b"  \n", &CANCEL).unwrap().is_none());
        let doc = optional_body(br#"{"reason": "x"}"#, &CANCEL).unwrap().unwrap();
        assert_eq!(doc["reason"], json!("x"));
        assert!(optional_body(br#"{"messgae": "x"}"#, &CANCEL).is_err());
    }

    #[test]
    fn test_list_accessors() {
        let doc = validate_body(br#"{"members": "bob"}"#, &UPDATE).unwrap();
        let err = optional_str_list(&doc, "members").unwrap_err();
        assert!(message(err).contains("members not a list"));

        let doc = validate_body(br#"{"members": ["a", "b"]}"#, &UPDATE).unwrap();
        assert_eq!(
            optional_str_list(&doc, "members").unwrap(),
            Some(vec!["a".to_string(), "b".to_string()])
        );

        let doc = validate_body(br#"{"members": null}"#, &UPDATE).unwrap();
        assert_eq!(optional_str_list(&doc, "members").unwrap(), None);
    }

    #[test]
    fn test_truthy() {
        for value in [json!(null), json!(false), json!(0), json!(""), json!([]), json!({})] {
            assert!(!truthy(&value), "{value}");
        }
        for value in [json!(true), json!(1), json!("no"), json!([0]), json!({"a": 1})] {
            assert!(truthy(&value), "{value}");
        }
    }
}
