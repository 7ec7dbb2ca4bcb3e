//! Request descriptors
//!
//! A [`RequestDescriptor`] captures one logical call: endpoint, method,
//! payload and extra headers. It is immutable once built and is replayed
//! verbatim when the dispatcher retries after a refresh; only the
//! `Authorization` value differs between attempts.

use estatedesk_domain::constants::UNAUTHENTICATED_PREFIX;
use reqwest::header::HeaderMap;
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde_json::Value;

use super::errors::ApiError;

/// Body of a logical request
#[derive(Debug, Clone, Default)]
pub enum Payload {
    #[default]
    Empty,
    /// Query parameters for `GET`, JSON body otherwise
    Json(Value),
    /// `multipart/form-data` body
    Form(FormData),
}

/// One logical API call
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    endpoint: String,
    method: Method,
    payload: Payload,
    headers: HeaderMap,
}

impl RequestDescriptor {
    pub fn new(endpoint: impl Into<String>, method: Method) -> Self {
        Self { endpoint: endpoint.into(), method, payload: Payload::Empty, headers: HeaderMap::new() }
    }

    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        self.payload = Payload::Json(data);
        self
    }

    #[must_use]
    pub fn with_form(mut self, form: FormData) -> Self {
        self.payload = Payload::Form(form);
        self
    }

    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Whether the endpoint is in the `auth/` namespace, which never carries
    /// a bearer token and never triggers a refresh
    pub fn is_unauthenticated(&self) -> bool {
        is_unauthenticated(&self.endpoint)
    }
}

/// Whether `endpoint` lies in the unauthenticated namespace
#[must_use]
pub fn is_unauthenticated(endpoint: &str) -> bool {
    endpoint.trim_start_matches('/').starts_with(UNAUTHENTICATED_PREFIX)
}

/// Join the API root and an endpoint path with exactly one `/`
#[must_use]
pub fn join_url(base_url: &str, endpoint: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), endpoint.trim_start_matches('/'))
}

/// Encode a JSON object as query parameters
///
/// Strings are sent verbatim, numbers and booleans in their display form,
/// arrays as comma-separated scalars and nested objects as JSON text. `null`
/// values are skipped.
///
/// # Errors
/// Returns `ApiError::InvalidRequest` if `data` is not an object or `null`
pub fn encode_query(data: &Value) -> Result<Vec<(String, String)>, ApiError> {
    let object = match data {
        Value::Null => return Ok(Vec::new()),
        Value::Object(object) => object,
        other => {
            return Err(ApiError::InvalidRequest(format!(
                "query parameters must be a JSON object, got {other}"
            )))
        }
    };

    Ok(object
        .iter()
        .filter_map(|(key, value)| encode_query_value(value).map(|encoded| (key.clone(), encoded)))
        .collect())
}

fn encode_query_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Array(items) => {
            Some(items.iter().filter_map(encode_query_value).collect::<Vec<_>>().join(","))
        }
        Value::String(text) => Some(text.clone()),
        Value::Bool(_) | Value::Number(_) | Value::Object(_) => Some(value.to_string()),
    }
}

#[derive(Debug, Clone)]
enum FormPart {
    Text { name: String, value: String },
    File { name: String, file_name: String, mime: Option<String>, bytes: Vec<u8> },
}

/// Replayable multipart form
///
/// `reqwest::multipart::Form` is consumed by sending, so the parts are kept
/// here and a fresh form is built for every attempt.
#[derive(Debug, Clone, Default)]
pub struct FormData {
    parts: Vec<FormPart>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(FormPart::Text { name: name.into(), value: value.into() });
        self
    }

    #[must_use]
    pub fn file(
        mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        mime: Option<String>,
        bytes: Vec<u8>,
    ) -> Self {
        self.parts.push(FormPart::File {
            name: name.into(),
            file_name: file_name.into(),
            mime,
            bytes,
        });
        self
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Build a sendable multipart form
    ///
    /// The boundary and `Content-Type` header are chosen by `reqwest`.
    ///
    /// # Errors
    /// Returns `ApiError::InvalidRequest` for an unparseable MIME type
    pub fn to_multipart(&self) -> Result<Form, ApiError> {
        self.parts.iter().try_fold(Form::new(), |form, part| match part {
            FormPart::Text { name, value } => Ok(form.text(name.clone(), value.clone())),
            FormPart::File { name, file_name, mime, bytes } => {
                let mut file = Part::bytes(bytes.clone()).file_name(file_name.clone());
                if let Some(mime) = mime {
                    file = file.mime_str(mime).map_err(|e| {
                        ApiError::InvalidRequest(format!("invalid MIME type {mime}: {e}"))
                    })?;
                }
                Ok(form.part(name.clone(), file))
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn auth_namespace_is_unauthenticated() {
        assert!(is_unauthenticated("auth/token"));
        assert!(is_unauthenticated("/auth/refresh"));
        assert!(!is_unauthenticated("properties"));
        assert!(!is_unauthenticated("users/auth/settings"));
        assert!(!is_unauthenticated("authors"));
    }

    #[test]
    fn join_url_normalises_slashes() {
        assert_eq!(join_url("http://h/api/", "/properties"), "http://h/api/properties");
        assert_eq!(join_url("http://h/api", "properties/7"), "http://h/api/properties/7");
    }

    #[test]
    fn query_encoding_follows_value_kind() {
        let pairs = encode_query(&json!({
            "search": "elm court",
            "page": 2,
            "archived": false,
            "status": ["active", "pending"],
            "owner": null,
            "filter": {"city": "Oslo"}
        }))
        .unwrap();

        let lookup = |key: &str| pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str());
        assert_eq!(lookup("search"), Some("elm court"));
        assert_eq!(lookup("page"), Some("2"));
        assert_eq!(lookup("archived"), Some("false"));
        assert_eq!(lookup("status"), Some("active,pending"));
        assert_eq!(lookup("owner"), None);
        assert_eq!(lookup("filter"), Some(r#"{"city":"Oslo"}"#));
    }

    #[test]
    fn query_encoding_rejects_non_objects() {
        assert!(encode_query(&Value::Null).unwrap().is_empty());
        assert!(matches!(encode_query(&json!([1, 2])), Err(ApiError::InvalidRequest(_))));
    }

    #[test]
    fn form_data_can_be_built_repeatedly() {
        let form = FormData::new().text("title", "Lease").file(
            "document",
            "lease.pdf",
            Some("application/pdf".into()),
            b"%PDF".to_vec(),
        );

        assert_eq!(form.len(), 2);
        assert!(form.to_multipart().is_ok());
        assert!(form.to_multipart().is_ok());
    }

    #[test]
    fn form_data_rejects_bad_mime() {
        let form = FormData::new().file("document", "x.bin", Some("not a mime".into()), vec![1]);
        assert!(matches!(form.to_multipart(), Err(ApiError::InvalidRequest(_))));
    }
}
