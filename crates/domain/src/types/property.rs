//! Property records managed from the dashboard

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A managed property
///
/// Fields the dashboard does not interpret are kept in `extra` so a
/// read-modify-write cycle does not drop them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: String,
    pub name: String,
    pub address: Option<String>,
    pub unit_count: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Payload for creating a property
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProperty {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_count: Option<u32>,
}

/// Partial update for a property; absent fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_count: Option<u32>,
}
