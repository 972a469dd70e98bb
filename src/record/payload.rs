use std::collections::HashMap;

use axum::{
    body::Bytes,
    extract::{FromRequest, Multipart, Request},
    http::{header::CONTENT_TYPE, StatusCode},
};
use serde_json::{Map, Value};

use super::RecordError;
use crate::error::ApiError;

/// A sparse write body. JSON objects land in `fields` as-is; multipart forms
/// put text parts in `fields` as strings and file parts in `blobs`.
#[derive(Debug, Clone, Default)]
pub struct Payload {
    pub fields: Map<String, Value>,
    pub blobs: HashMap<String, Vec<u8>>,
}

impl Payload {
    pub fn from_json(value: Value) -> Result<Self, RecordError> {
        match value {
            Value::Object(fields) => Ok(Self { fields, blobs: HashMap::new() }),
            _ => Err(RecordError::InvalidPayload("expected a JSON object".to_string())),
        }
    }

    pub fn from_slice(body: &[u8]) -> Result<Self, RecordError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(RecordError::InvalidPayload("request body is empty".to_string()));
        }
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| RecordError::InvalidPayload(format!("invalid JSON: {}", e)))?;
        Self::from_json(value)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key) || self.blobs.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn blob(&self, key: &str) -> Option<&[u8]> {
        self.blobs.get(key).map(Vec::as_slice)
    }

    /// Set a value only when the key is absent or null
    pub fn set_default(&mut self, key: &str, value: Value) {
        match self.fields.get(key) {
            Some(v) if !v.is_null() => {}
            _ => {
                self.fields.insert(key.to_string(), value);
            }
        }
    }

    pub fn set(&mut self, key: &str, value: Value) {
        self.fields.insert(key.to_string(), value);
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.fields.remove(key)
    }

    /// Id list under `key`. `None` when the key is absent; null counts as an
    /// empty list. Form values may be `1,2,3` or a JSON array string.
    pub fn id_list(&self, key: &str) -> Result<Option<Vec<i64>>, RecordError> {
        let invalid = || RecordError::InvalidValue {
            field: key.to_string(),
            reason: "expected a list of integer ids".to_string(),
        };

        let value = match self.fields.get(key) {
            None => return Ok(None),
            Some(v) => v,
        };

        let ids = match value {
            Value::Null => vec![],
            Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    Value::Number(n) => n.as_i64().ok_or_else(invalid),
                    Value::String(s) => s.trim().parse::<i64>().map_err(|_| invalid()),
                    _ => Err(invalid()),
                })
                .collect::<Result<Vec<_>, _>>()?,
            Value::String(s) => {
                let trimmed = s.trim();
                if trimmed.starts_with('[') {
                    serde_json::from_str::<Vec<i64>>(trimmed).map_err(|_| invalid())?
                } else {
                    trimmed
                        .split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(|s| s.parse::<i64>().map_err(|_| invalid()))
                        .collect::<Result<Vec<_>, _>>()?
                }
            }
            Value::Number(n) => vec![n.as_i64().ok_or_else(invalid)?],
            _ => return Err(invalid()),
        };

        let mut unique = Vec::with_capacity(ids.len());
        for id in ids {
            if !unique.contains(&id) {
                unique.push(id);
            }
        }
        Ok(Some(unique))
    }

    /// Nested object list under `key`, e.g. `charges` on a case. Form values
    /// may carry it as a JSON string.
    pub fn object_list(&self, key: &str) -> Result<Option<Vec<Map<String, Value>>>, RecordError> {
        let invalid = || RecordError::InvalidValue {
            field: key.to_string(),
            reason: "expected a list of objects".to_string(),
        };

        let value = match self.fields.get(key) {
            None => return Ok(None),
            Some(Value::String(s)) => serde_json::from_str::<Value>(s).map_err(|_| invalid())?,
            Some(v) => v.clone(),
        };

        match value {
            Value::Null => Ok(Some(vec![])),
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::Object(map) => Ok(map),
                    _ => Err(invalid()),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Some),
            _ => Err(invalid()),
        }
    }

    /// Nested single object under `key`, e.g. `person` on a toxicology report
    pub fn object(&self, key: &str) -> Result<Option<Payload>, RecordError> {
        let value = match self.fields.get(key) {
            None | Some(Value::Null) => return Ok(None),
            Some(Value::String(s)) => serde_json::from_str::<Value>(s).map_err(|_| RecordError::InvalidValue {
                field: key.to_string(),
                reason: "expected an object".to_string(),
            })?,
            Some(v) => v.clone(),
        };
        match value {
            Value::Object(fields) => Ok(Some(Payload { fields, blobs: HashMap::new() })),
            _ => Err(RecordError::InvalidValue {
                field: key.to_string(),
                reason: "expected an object".to_string(),
            }),
        }
    }

    async fn from_multipart(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut payload = Payload::default();
        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            if field.file_name().is_some() {
                let data = field.bytes().await.map_err(multipart_error)?;
                payload.blobs.insert(name, data.to_vec());
            } else {
                let text = field.text().await.map_err(multipart_error)?;
                payload.fields.insert(name, Value::String(text));
            }
        }
        Ok(payload)
    }
}

fn multipart_error(err: axum::extract::multipart::MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::payload_too_large(err.body_text())
    } else {
        ApiError::bad_request(err.body_text())
    }
}

#[axum::async_trait]
impl<S> FromRequest<S> for Payload
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.starts_with("multipart/form-data"))
            .unwrap_or(false);

        if is_multipart {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| ApiError::bad_request(e.body_text()))?;
            return Self::from_multipart(multipart).await;
        }

        let body = Bytes::from_request(req, state).await.map_err(|e| {
            if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
                ApiError::payload_too_large(e.body_text())
            } else {
                ApiError::bad_request(e.body_text())
            }
        })?;
        Ok(Self::from_slice(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> Payload {
        Payload::from_json(value).unwrap()
    }

    #[test]
    fn rejects_non_objects_and_empty_bodies() {
        assert!(Payload::from_json(json!([1, 2])).is_err());
        assert!(Payload::from_slice(b"  ").is_err());
        assert!(Payload::from_slice(b"{not json").is_err());
        assert!(Payload::from_slice(b"{}").is_ok());
    }

    #[test]
    fn id_lists_distinguish_absent_from_empty() {
        let p = payload(json!({ "role_ids": [], "victim_ids": null }));
        assert_eq!(p.id_list("role_ids").unwrap(), Some(vec![]));
        assert_eq!(p.id_list("victim_ids").unwrap(), Some(vec![]));
        assert_eq!(p.id_list("suspect_ids").unwrap(), None);
    }

    #[test]
    fn id_lists_accept_form_encodings_and_dedupe() {
        let p = payload(json!({ "a": "1, 2,2", "b": "[3,4]", "c": ["5", 6] }));
        assert_eq!(p.id_list("a").unwrap(), Some(vec![1, 2]));
        assert_eq!(p.id_list("b").unwrap(), Some(vec![3, 4]));
        assert_eq!(p.id_list("c").unwrap(), Some(vec![5, 6]));
        assert!(payload(json!({ "a": ["x"] })).id_list("a").is_err());
    }

    #[test]
    fn set_default_keeps_supplied_values() {
        let mut p = payload(json!({ "created_by": "clerk@example.com", "updated_by": null }));
        p.set_default("created_by", json!("admin@example.com"));
        p.set_default("updated_by", json!("admin@example.com"));
        assert_eq!(p.get("created_by"), Some(&json!("clerk@example.com")));
        assert_eq!(p.get("updated_by"), Some(&json!("admin@example.com")));
    }

    #[test]
    fn nested_objects() {
        let p = payload(json!({
            "charges": [{ "charge_title": "Assault" }],
            "person": "{\"name\": \"X\"}"
        }));
        assert_eq!(p.object_list("charges").unwrap().map(|l| l.len()), Some(1));
        assert_eq!(p.object("person").unwrap().and_then(|o| o.get("name").cloned()), Some(json!("X")));
        assert!(p.object("police_report").unwrap().is_none());
    }
}
