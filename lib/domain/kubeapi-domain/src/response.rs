use serde::{Deserialize, Serialize};

pub const CODE_OK: i32 = 200;
pub const CODE_BAD_REQUEST: i32 = 400;
pub const CODE_ERROR: i32 = 500;

/// Response envelope handed to the HTTP layer.
///
/// Failure envelopes carry no `data` key at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            code: CODE_OK,
            message: "success".to_string(),
            data: Some(data),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            code: CODE_ERROR,
            message: message.into(),
            data: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            code: CODE_BAD_REQUEST,
            message: message.into(),
            data: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.code == CODE_OK
    }
}

impl<T> From<anyhow::Result<T>> for ApiResponse<T> {
    fn from(result: anyhow::Result<T>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(err) => Self::error(format!("{err:#}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_envelope_has_data() {
        let value = serde_json::to_value(ApiResponse::ok(vec![1, 2])).unwrap();
        assert_eq!(value["code"], CODE_OK);
        assert_eq!(value["message"], "success");
        assert_eq!(value["data"], serde_json::json!([1, 2]));
    }

    #[test]
    fn error_envelope_omits_data() {
        let value = serde_json::to_value(ApiResponse::<Vec<i32>>::error("boom")).unwrap();
        assert_eq!(value["code"], CODE_ERROR);
        assert_eq!(value["message"], "boom");
        assert!(value.get("data").is_none());
    }

    #[test]
    fn from_result_keeps_context_chain() {
        let result: anyhow::Result<()> =
            Err(anyhow::anyhow!("connection refused")).map_err(|e| e.context("list namespaces"));
        let response = ApiResponse::from(result);
        assert!(!response.is_ok());
        assert_eq!(response.message, "list namespaces: connection refused");
    }
}
