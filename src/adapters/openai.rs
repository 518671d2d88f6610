use crate::domain::model::{ContentPart, InvokerRequest};
use crate::domain::ports::{ConfigProvider, ModelInvoker};
use crate::utils::error::{GenError, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

/// `ModelInvoker` for an OpenAI-compatible chat-completions endpoint with
/// vision input. One POST per invocation, no internal retries.
pub struct OpenAiInvoker<C: ConfigProvider> {
    config: C,
    client: Client,
}

impl<C: ConfigProvider> OpenAiInvoker<C> {
    pub fn new(config: C) -> Self {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { config, client }
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.api_base().trim_end_matches('/')
        )
    }
}

#[async_trait]
impl<C: ConfigProvider> ModelInvoker for OpenAiInvoker<C> {
    async fn invoke(&self, request: &InvokerRequest) -> Result<String> {
        let payload = ChatRequest {
            model: self.config.model_id(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: MessageContent::Text(&request.system),
                },
                ChatMessage {
                    role: "user",
                    content: MessageContent::Parts(
                        request.parts.iter().map(ChatPart::from).collect(),
                    ),
                },
            ],
            response_format: ResponseFormat { format: "json_object" },
        };

        tracing::debug!(url = %self.completions_url(), model = payload.model, "POST chat completion");

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(self.config.api_key())
            .json(&payload)
            .send()
            .await
            .map_err(|e| GenError::ModelUnavailable {
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(classify_http_failure(status));
        }

        let envelope: ChatResponse =
            response.json().await.map_err(|e| GenError::ModelUnavailable {
                reason: format!("unreadable completion envelope: {}", e),
            })?;

        extract_text(envelope)
    }
}

fn classify_http_failure(status: StatusCode) -> GenError {
    match status {
        StatusCode::TOO_MANY_REQUESTS => GenError::RateLimited,
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GenError::ModelUnavailable {
            reason: format!("authentication rejected (HTTP {})", status.as_u16()),
        },
        other => GenError::ModelUnavailable {
            reason: format!("model endpoint returned HTTP {}", other.as_u16()),
        },
    }
}

fn extract_text(envelope: ChatResponse) -> Result<String> {
    let choice = envelope
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| GenError::ModelRefused {
            reason: "completion contained no choices".to_string(),
        })?;

    if let Some(refusal) = choice.message.refusal {
        return Err(GenError::ModelRefused { reason: refusal });
    }

    match choice.message.content {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(GenError::ModelRefused {
            reason: "completion contained no text".to_string(),
        }),
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: MessageContent<'a>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum MessageContent<'a> {
    Text(&'a str),
    Parts(Vec<ChatPart<'a>>),
}

#[derive(Serialize)]
#[serde(tag = "type")]
enum ChatPart<'a> {
    #[serde(rename = "text")]
    Text { text: &'a str },
    #[serde(rename = "image_url")]
    ImageUrl { image_url: ImageUrl<'a> },
}

#[derive(Serialize)]
struct ImageUrl<'a> {
    url: &'a str,
}

impl<'a> From<&'a ContentPart> for ChatPart<'a> {
    fn from(part: &'a ContentPart) -> Self {
        match part {
            ContentPart::Text(text) => ChatPart::Text { text },
            ContentPart::ImageUrl(url) => ChatPart::ImageUrl {
                image_url: ImageUrl { url },
            },
        }
    }
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}
