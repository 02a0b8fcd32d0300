//! Client (customer) records as exchanged with the backend.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A customer the invoices are billed to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    /// GST identification number, absent for unregistered clients.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gstin: Option<String>,
}

/// Payload for creating a client. The backend assigns the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientCreate {
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gstin: Option<String>,
}

/// Partial-update payload for a client. Absent fields stay unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gstin: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_roundtrip() {
        let client = Client {
            id: Uuid::new_v4(),
            name: "Acme Traders".to_string(),
            email: "billing@acme.example".to_string(),
            phone: "+91 98765 43210".to_string(),
            address: "14 MG Road, Pune".to_string(),
            gstin: Some("27AAAPA1234A1Z5".to_string()),
        };

        let json = serde_json::to_string(&client).unwrap();
        let back: Client = serde_json::from_str(&json).unwrap();
        assert_eq!(client, back);
    }

    #[test]
    fn test_client_wire_names_are_camel_case() {
        let client = Client {
            id: Uuid::new_v4(),
            name: "Acme".to_string(),
            email: String::new(),
            phone: String::new(),
            address: String::new(),
            gstin: None,
        };

        let json = serde_json::to_value(&client).unwrap();
        assert!(json.get("gstin").is_none());
        assert!(json.get("name").is_some());
    }

    #[test]
    fn test_update_skips_absent_fields() {
        let update = ClientUpdate {
            name: Some("Acme Traders Pvt Ltd".to_string()),
            ..Default::default()
        };

        let json = serde_json::to_string(&update).unwrap();
        assert_eq!(json, r#"{"name":"Acme Traders Pvt Ltd"}"#);
    }
}
