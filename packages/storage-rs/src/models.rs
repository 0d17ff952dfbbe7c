use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    #[serde(rename = "Key")]
    pub key: String,
    #[serde(rename = "Id", default)]
    pub id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    #[serde(rename = "statusCode", default)]
    pub status_code: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    pub message: String,
}
