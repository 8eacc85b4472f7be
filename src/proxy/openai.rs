//! OpenAI pass-through route
//!
//! Two upstream passes against the same image: a concise description for
//! `debugDescription` (the not-visible cross-check depends on it), then the
//! caller's prompt.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use super::{ErrorResponse, ProxyState};
use crate::prompt::describe_prompt;

const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";
const MODEL: &str = "gpt-4o";
const MAX_TOKENS: u32 = 100;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenAiProxyRequest {
    pub prompt: String,
    pub image_base64: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenAiProxyResponse {
    pub text: String,
    pub debug_description: String,
}

/// Chat completion request body
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    max_tokens: u32,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: Vec<ContentBlock<'a>>,
}

#[derive(Serialize)]
#[serde(tag = "type")]
enum ContentBlock<'a> {
    #[serde(rename = "text")]
    Text { text: &'a str },
    #[serde(rename = "image_url")]
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

type HandlerError = (StatusCode, Json<ErrorResponse>);

/// Handle `POST /api/openai-proxy`
pub async fn openai_proxy(
    State(state): State<Arc<ProxyState>>,
    Json(request): Json<OpenAiProxyRequest>,
) -> Result<Json<OpenAiProxyResponse>, HandlerError> {
    let Some(api_key) = state.openai_key.as_deref() else {
        tracing::error!("openai proxy request without API key configured");
        return Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new("OpenAI API key not set.")),
        ));
    };

    // Pass 1: auxiliary scene description
    let debug_description = chat_completion(
        &state.client,
        api_key,
        describe_prompt(),
        &request.image_base64,
    )
    .await
    .unwrap_or_else(|e| {
        tracing::warn!(error = %e, "debug description pass failed");
        String::new()
    });

    // Pass 2: the caller's prompt
    let text = chat_completion(&state.client, api_key, &request.prompt, &request.image_base64)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "openai upstream call failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Failed to contact OpenAI.")),
            )
        })?;

    Ok(Json(OpenAiProxyResponse {
        text,
        debug_description,
    }))
}

/// One upstream chat-completion call with an inline image
async fn chat_completion(
    client: &reqwest::Client,
    api_key: &str,
    prompt: &str,
    image_base64: &str,
) -> crate::Result<String> {
    let request = ChatRequest {
        model: MODEL,
        messages: vec![Message {
            role: "user",
            content: vec![
                ContentBlock::Text { text: prompt },
                ContentBlock::ImageUrl {
                    image_url: ImageUrl {
                        url: format!("data:image/png;base64,{image_base64}"),
                    },
                },
            ],
        }],
        max_tokens: MAX_TOKENS,
    };

    let response = client
        .post(CHAT_COMPLETIONS_URL)
        .header("Authorization", format!("Bearer {api_key}"))
        .json(&request)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(crate::Error::Vision(format!(
            "OpenAI error {status}: {body}"
        )));
    }

    let result: ChatResponse = response.json().await?;
    Ok(result
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .unwrap_or_default())
}
