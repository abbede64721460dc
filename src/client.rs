use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

use crate::table::Row;

/// One turn of the refinement conversation. The log is append only; prior
/// turns are never rewritten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: String,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        ChatTurn {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Body of `POST /refine`. Field names follow the backend's wire contract.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefineRequest {
    pub selected_rows: Vec<Row>,
    pub full_table: Vec<Row>,
    pub chat_history: Vec<ChatTurn>,
    /// Second table copy one backend variant reads; not sent by default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all_rows: Option<Vec<Row>>,
}

/// Success body of `POST /process`. Extra fields (model name, industry) are
/// ignored; missing arrays collapse to empty like the original client did.
#[derive(Debug, Default, Deserialize)]
pub struct ExtractResponse {
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Row>,
}

/// Success body of `POST /refine`.
#[derive(Debug, Default, Deserialize)]
pub struct RefineResponse {
    #[serde(default)]
    pub rows: Vec<Row>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: String,
}

#[derive(Error, Debug)]
pub enum ClientError {
    /// Non-2xx with the backend's own error text (or a status fallback).
    #[error("{0}")]
    Server(String),

    #[error("could not reach backend: {0}")]
    Transport(String),

    #[error("invalid response from backend: {0}")]
    Payload(String),
}

/// Blocking client for the two extraction endpoints. One agent, reused.
pub struct ApiClient {
    agent: ureq::Agent,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(10))
            .timeout_read(Duration::from_secs(600))
            .timeout_write(Duration::from_secs(600))
            .build();
        ApiClient {
            agent,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Requests a fresh extraction of the uploaded file.
    pub fn process(&self, filename: &str) -> Result<ExtractResponse, ClientError> {
        info!("Requesting re-extraction of {filename}");
        self.post_json("/process", &serde_json::json!({ "filename": filename }))
    }

    /// Sends selected rows, the full table and the conversation for refinement.
    pub fn refine(&self, request: &RefineRequest) -> Result<RefineResponse, ClientError> {
        info!(
            "Refining {} rows, chat history of {} turns",
            request.selected_rows.len(),
            request.chat_history.len()
        );
        self.post_json("/refine", request)
    }

    fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<T, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("POST {url}");
        match self
            .agent
            .post(&url)
            .set("content-type", "application/json")
            .send_json(body)
        {
            Ok(response) => response
                .into_json::<T>()
                .map_err(|e| ClientError::Payload(e.to_string())),
            Err(ureq::Error::Status(status, response)) => {
                let text = response.into_string().unwrap_or_default();
                let message = serde_json::from_str::<ErrorBody>(&text)
                    .ok()
                    .map(|b| b.error)
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| format!("backend returned status {status}"));
                debug!("POST {url} failed: {status} {message}");
                Err(ClientError::Server(message))
            }
            Err(ureq::Error::Transport(err)) => Err(ClientError::Transport(err.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::CellValue;
    use pretty_assertions::assert_eq;

    #[test]
    fn refine_request_uses_wire_names() {
        let request = RefineRequest {
            selected_rows: vec![vec![CellValue::Text("a".to_string())]],
            full_table: vec![vec![CellValue::Text("a".to_string())]],
            chat_history: vec![ChatTurn::user("fix units")],
            all_rows: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["selectedRows"][0][0], "a");
        assert_eq!(json["fullTable"][0][0], "a");
        assert_eq!(json["chatHistory"][0]["role"], "user");
        assert_eq!(json["chatHistory"][0]["content"], "fix units");
        assert!(json.get("allRows").is_none());
    }

    #[test]
    fn extract_response_tolerates_extra_and_missing_fields() {
        let body = r#"{"columns": ["A"], "rows": [["x", 1]], "model_used": "LLaMA"}"#;
        let parsed: ExtractResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.columns, vec!["A".to_string()]);
        assert_eq!(parsed.rows.len(), 1);

        let parsed: ExtractResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.columns.is_empty());
        assert!(parsed.rows.is_empty());
    }

    #[test]
    fn error_body_falls_back_to_status_text() {
        let parsed: ErrorBody = serde_json::from_str(r#"{"error": "bad file"}"#).unwrap();
        assert_eq!(parsed.error, "bad file");
        let parsed: ErrorBody = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed.error, "");
    }
}
