use reqwest::Client as HttpClient;
use thiserror::Error;
use url::Url;

use super::models::{ChatMessage, OllamaChatRequest, OllamaChatResponse};

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("URL parsing failed: {0}")]
    Url(#[from] url::ParseError),
    #[error("assistant returned an empty reply")]
    EmptyReply,
}

// Thin passthrough to a local Ollama server. The scoring engine never touches
// this; it exists purely for the conversational sidebar.
#[derive(Clone)]
pub struct OllamaService {
    http_client: HttpClient,
    base_url: String,
    model: String,
    system_prompt: String,
}

impl OllamaService {
    pub fn new(base_url: String, model: String, system_prompt: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            base_url,
            model,
            system_prompt,
        }
    }

    pub fn offline_reply(&self) -> String {
        format!(
            "The assistant is not available right now. Please ensure the Ollama \
             service is running and the `{}` model is pulled.",
            self.model
        )
    }

    pub async fn chat(
        &self,
        history: &[ChatMessage],
        user_text: &str,
    ) -> Result<String, ChatError> {
        let endpoint = Url::parse(&self.base_url)?.join("api/chat")?;

        let mut messages = vec![ChatMessage {
            role: "system".to_string(),
            content: self.system_prompt.clone(),
        }];
        messages.extend(history.iter().cloned());
        messages.push(ChatMessage {
            role: "user".to_string(),
            content: user_text.to_string(),
        });

        let request = OllamaChatRequest {
            model: self.model.clone(),
            messages,
            stream: false,
        };

        let response = self
            .http_client
            .post(endpoint)
            .json(&request)
            .send()
            .await?
            .error_for_status()?;
        let body: OllamaChatResponse = response.json().await?;

        let reply = body
            .message
            .map(|message| message.content.trim().to_string())
            .unwrap_or_default();
        if reply.is_empty() {
            return Err(ChatError::EmptyReply);
        }
        Ok(reply)
    }
}
