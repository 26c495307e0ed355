//! AMI response parsing.

use std::collections::HashMap;

/// A response block received from the telephony server.
#[derive(Debug, Clone)]
pub struct AmiResponse {
    response: String,
    action_id: Option<String>,
    headers: HashMap<String, String>,
}

impl AmiResponse {
    /// Parse a blank-line terminated block of `Key: Value` lines.
    ///
    /// Returns `None` when the block carries no `Response` header (event
    /// blocks and the connection banner fall in this category).
    pub fn parse(block: &str) -> Option<Self> {
        let mut headers = HashMap::new();
        for line in block.lines() {
            let line = line.trim_end_matches('\r');
            if line.is_empty() {
                continue;
            }
            if let Some((key, value)) = line.split_once(':') {
                headers.insert(key.trim().to_string(), value.trim().to_string());
            }
        }
        let response = headers.remove("Response")?;
        let action_id = headers.remove("ActionID");
        Some(Self {
            response,
            action_id,
            headers,
        })
    }

    pub fn is_success(&self) -> bool {
        self.response == "Success"
    }

    pub fn action_id(&self) -> Option<&str> {
        self.action_id.as_deref()
    }

    /// Server-provided message, falling back to the raw response word.
    pub fn message(&self) -> &str {
        self.headers
            .get("Message")
            .map(String::as_str)
            .unwrap_or(&self.response)
    }
}
