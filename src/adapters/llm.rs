use crate::core::TextGenerator;
use crate::utils::error::{Result, SiteError};
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// OpenAI-compatible chat-completions client.
pub struct ChatClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: AnswerMessage,
}

#[derive(Deserialize)]
struct AnswerMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatClient {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            api_key,
        }
    }
}

#[async_trait::async_trait]
impl TextGenerator for ChatClient {
    async fn generate(&self, model: &str, prompt: &str) -> Result<String> {
        let body = ChatRequest {
            model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        tracing::debug!("Chat completion status: {}", status);

        if !status.is_success() {
            return Err(SiteError::UpstreamError {
                status: status.as_u16(),
                url: self.endpoint.clone(),
            });
        }

        let parsed: ChatResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| SiteError::ValidationError {
                message: "chat completion returned no content".to_string(),
            })
    }
}
