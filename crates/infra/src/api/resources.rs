//! Resource wrappers over the dispatcher
//!
//! Each call sends one request and unwraps one field of the success body
//! (`{"property": {...}}` → `Property`).

use std::sync::Arc;

use estatedesk_domain::{NewProperty, Property, PropertyUpdate, User};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::client::ApiClient;
use super::errors::ApiError;
use super::request::FormData;

/// Take `field` out of a success body and decode it
///
/// # Errors
/// Returns `ApiError::Decode` if the field is missing or has the wrong shape
pub fn unwrap_field<T: DeserializeOwned>(mut body: Value, field: &str) -> Result<T, ApiError> {
    let value = body
        .get_mut(field)
        .map(Value::take)
        .ok_or_else(|| ApiError::Decode(format!("missing field `{field}` in response")))?;

    serde_json::from_value(value).map_err(|e| ApiError::Decode(format!("field `{field}`: {e}")))
}

/// `properties/...` endpoints
pub struct PropertiesApi {
    client: Arc<ApiClient>,
}

impl PropertiesApi {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// List properties, optionally filtered by query parameters
    pub async fn list(&self, filter: Option<Value>) -> Result<Vec<Property>, ApiError> {
        let body = self.client.request("properties", filter, Method::GET, None).await?;
        unwrap_field(body, "properties")
    }

    pub async fn get(&self, id: &str) -> Result<Property, ApiError> {
        let body: Value = self.client.get(&format!("properties/{id}")).await?;
        unwrap_field(body, "property")
    }

    pub async fn create(&self, property: &NewProperty) -> Result<Property, ApiError> {
        let body: Value = self.client.post("properties", property).await?;
        unwrap_field(body, "property")
    }

    pub async fn update(&self, id: &str, update: &PropertyUpdate) -> Result<Property, ApiError> {
        let body: Value = self.client.patch(&format!("properties/{id}"), update).await?;
        unwrap_field(body, "property")
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        let _: Value = self.client.delete(&format!("properties/{id}")).await?;
        Ok(())
    }

    /// Attach a document to a property
    ///
    /// Returns the stored document record as sent by the backend.
    pub async fn upload_document(
        &self,
        id: &str,
        file_name: &str,
        content_type: Option<&str>,
        bytes: Vec<u8>,
    ) -> Result<Value, ApiError> {
        let form = FormData::new().file(
            "document",
            file_name,
            content_type.map(str::to_string),
            bytes,
        );
        let body = self
            .client
            .request_form_data(&format!("properties/{id}/documents"), form, Method::POST)
            .await?;
        unwrap_field(body, "document")
    }
}

/// `users/...` endpoints
pub struct UsersApi {
    client: Arc<ApiClient>,
}

impl UsersApi {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// The signed-in user
    pub async fn current_user(&self) -> Result<User, ApiError> {
        let body: Value = self.client.get("users/me").await?;
        unwrap_field(body, "user")
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn unwraps_named_field() {
        let body = json!({"user": {"id": "u1", "email": "me@example.com"}});
        let user: User = unwrap_field(body, "user").unwrap();
        assert_eq!(user.id, "u1");
        assert_eq!(user.name, None);
    }

    #[test]
    fn missing_field_is_a_decode_error() {
        let err = unwrap_field::<User>(json!({"account": {}}), "user").unwrap_err();
        assert!(matches!(err, ApiError::Decode(ref msg) if msg.contains("user")));

        let err = unwrap_field::<User>(Value::Null, "user").unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }
}
