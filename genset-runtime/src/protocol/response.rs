use serde_derive::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

/// Command reply.
///
/// Every command is answered with exactly one reply, serialized as a single
/// JSON line.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl Response {
    /// Successful reply with a message.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: Status::Success,
            message: Some(message.into()),
            data: None,
        }
    }

    /// Successful reply carrying data.
    pub fn data<T: serde::Serialize>(data: &T) -> Self {
        match serde_json::to_value(data) {
            Ok(data) => Self {
                status: Status::Success,
                message: None,
                data: Some(data),
            },
            Err(e) => Self::error(format!("Failed to serialize reply: {}", e)),
        }
    }

    /// Error reply.
    pub fn error(message: impl std::fmt::Display) -> Self {
        Self {
            status: Status::Error,
            message: Some(message.to_string()),
            data: None,
        }
    }

    #[inline]
    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }

    /// Encode the reply as a single JSON line without line terminator.
    pub fn to_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
