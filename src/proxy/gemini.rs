//! Gemini pass-through route

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use super::{ErrorResponse, ProxyState};

const MODEL: &str = "gemini-2.5-flash";

/// Default prompt when the caller does not supply one
const DEFAULT_PROMPT: &str = "What do you see in the image? Only respond with a list of objects \
     detected in the image in less than three words for each object, also include their positions \
     and directions on how to get them to the center.";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiVisionRequest {
    #[serde(default)]
    pub image_base64: Option<String>,
    #[serde(default)]
    pub prompt: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GeminiVisionResponse {
    pub text: String,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
enum Part<'a> {
    Text(&'a str),
    #[serde(rename_all = "camelCase")]
    InlineData { mime_type: &'a str, data: &'a str },
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

type HandlerError = (StatusCode, Json<ErrorResponse>);

/// Handle `POST /api/gemini-vision`
pub async fn gemini_vision(
    State(state): State<Arc<ProxyState>>,
    Json(request): Json<GeminiVisionRequest>,
) -> Result<Json<GeminiVisionResponse>, HandlerError> {
    let Some(image) = request.image_base64.filter(|i| !i.is_empty()) else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("No image provided.")),
        ));
    };

    let Some(api_key) = state.gemini_key.as_deref() else {
        tracing::error!("gemini proxy request without API key configured");
        return Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new("Gemini API key not set.")),
        ));
    };

    let prompt = request.prompt.as_deref().unwrap_or(DEFAULT_PROMPT);

    let body = GenerateRequest {
        contents: vec![Content {
            parts: vec![
                Part::Text(prompt),
                Part::InlineData {
                    mime_type: "image/jpeg",
                    data: &image,
                },
            ],
        }],
    };

    let url = format!(
        "https://generativelanguage.googleapis.com/v1beta/models/{MODEL}:generateContent?key={api_key}"
    );

    let text = async {
        let response = state.client.post(&url).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(crate::Error::Vision(format!(
                "Gemini error {status}: {body}"
            )));
        }

        let result: GenerateResponse = response.json().await?;
        let text = result
            .candidates
            .into_iter()
            .next()
            .map(|c| {
                c.content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .unwrap_or_default();
        Ok(text)
    }
    .await
    .map_err(|e: crate::Error| {
        tracing::error!(error = %e, "gemini upstream call failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new(
                "Failed to analyze image with Gemini Vision.",
            )),
        )
    })?;

    Ok(Json(GeminiVisionResponse { text }))
}
