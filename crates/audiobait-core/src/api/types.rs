//! Wire types for the backend API.

use serde::{Deserialize, Serialize};

/// Reply to `/authenticate_device`.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct TokenResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub messages: Vec<String>,
    #[serde(default)]
    pub token: String,
}

impl TokenResponse {
    pub fn message(&self) -> &str {
        self.messages.first().map(String::as_str).unwrap_or("unknown")
    }
}

/// File metadata plus the signed token needed to download it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileResponse {
    pub file: FileInfo,
    pub jwt: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    pub details: FileDetails,
    #[serde(rename = "type", default)]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDetails {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub original_name: String,
}
