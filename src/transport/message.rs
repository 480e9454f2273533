use serde::{Deserialize, Serialize};

/// Field the server stamps onto every telemetry write.
pub const SERVER_TIMESTAMP_FIELD: &str = "serverTimestamp";

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct UpdateResponse {
    pub status: String,
}

impl UpdateResponse {
    pub fn success() -> Self {
        Self {
            status: "success".to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct CommandResponse {
    pub success: bool,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct HealthResponse {
    pub status: String,
}
