use serde::Serialize;

/// Response envelope shared by every endpoint: a `status` flag, an
/// optional human-readable `message`, and the payload's own fields
/// flattened alongside them.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub status: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub payload: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(payload: T) -> Self {
        Self {
            status: true,
            message: None,
            payload: Some(payload),
        }
    }

    pub fn success_with_message(payload: T, message: impl Into<String>) -> Self {
        Self {
            status: true,
            message: Some(message.into()),
            payload: Some(payload),
        }
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            status: true,
            message: Some(message.into()),
            payload: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: false,
            message: Some(message.into()),
            payload: None,
        }
    }
}
