//! Gemini client for the three practice use-cases
//!
//! Thin compositions over `models/{model}:generateContent`:
//! - `transcribe`: audio bytes in, transcript text out (verbatim)
//! - `generate_feedback`: question + answer in, critique text out (verbatim)
//! - `generate_problem`: difficulty in, parsed [`ProblemSpec`] out, with a
//!   difficulty-scoped fallback when the response JSON is malformed
//!
//! Every call runs through the configured [`RetryPolicy`].

use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::GeminiConfig;
use crate::error::ApiError;
use crate::problem::{Difficulty, ProblemSpec};
use crate::retry::RetryPolicy;

static FENCE_OPEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"```(?:json)?\s*").unwrap());
static FENCE_CLOSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"```\s*$").unwrap());

// ============================================================================
// WIRE TYPES
// ============================================================================

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(rename = "inline_data", skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

impl Part {
    fn text(content: impl Into<String>) -> Self {
        Self {
            text: Some(content.into()),
            inline_data: None,
        }
    }

    fn inline_data(mime_type: &str, data: String) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData {
                mime_type: mime_type.to_string(),
                data,
            }),
        }
    }
}

#[derive(Debug, Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

// ============================================================================
// CLIENT
// ============================================================================

/// Client for the generative-language API.
pub struct GeminiClient {
    client: Client,
    config: GeminiConfig,
    retry: RetryPolicy,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let retry = config.retry_policy();

        Ok(Self {
            client,
            config,
            retry,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.api_base.trim_end_matches('/'),
            self.config.model
        )
    }

    /// Single `generateContent` round-trip: non-2xx becomes
    /// [`ApiError::Http`] with status and body before any retry
    /// classification; the generated text is pulled from the first
    /// candidate's first part.
    async fn generate(&self, request: &GenerateContentRequest) -> Result<String, ApiError> {
        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.config.api_key.as_str())])
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Http { status, body });
        }

        let parsed: GenerateContentResponse = response.json().await?;
        parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text)
            .ok_or(ApiError::EmptyResponse)
    }

    /// Transcribe recorded audio. Returns the transcript text verbatim.
    pub async fn transcribe(&self, audio: &[u8], mime_type: &str) -> Result<String, ApiError> {
        debug!("transcribing {} bytes of {}", audio.len(), mime_type);

        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part::text(
                        "Please transcribe the following audio content. Only return the \
                         transcribed text, nothing else.",
                    ),
                    Part::inline_data(mime_type, BASE64.encode(audio)),
                ],
            }],
            generation_config: None,
        };

        self.retry.run(|| self.generate(&request)).await
    }

    /// Generate interview feedback on an answer. Returns the critique
    /// text verbatim.
    pub async fn generate_feedback(
        &self,
        question: &str,
        answer: &str,
    ) -> Result<String, ApiError> {
        debug!("generating feedback for a {}-char answer", answer.len());

        let prompt = format!(
            "You are an experienced HR interviewer providing constructive feedback on \
             interview responses. Analyze the candidate's answer for clarity, relevance, \
             structure, and professionalism. Provide specific, actionable feedback to help \
             them improve.\n\n\
             Question: \"{question}\"\n\n\
             Candidate's Answer: \"{answer}\"\n\n\
             Please provide detailed feedback on this interview response in 2-3 sentences. \
             Focus on what they did well and what they can improve."
        );

        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part::text(prompt)],
            }],
            generation_config: Some(GenerationConfig {
                max_output_tokens: 300,
                temperature: 0.7,
            }),
        };

        self.retry.run(|| self.generate(&request)).await
    }

    /// Generate a coding problem at the requested difficulty.
    ///
    /// A malformed generation response never surfaces: the response text
    /// is fence-stripped and parsed, and on failure the fallback problem
    /// for `difficulty` is returned instead.
    pub async fn generate_problem(&self, difficulty: Difficulty) -> Result<ProblemSpec, ApiError> {
        debug!("generating {} problem", difficulty);

        let prompt = format!(
            "Generate a unique DSA problem with {difficulty} difficulty level. Return ONLY \
             a valid JSON object with this exact structure (no markdown formatting, no code \
             blocks, just the JSON):\n\n\
             {{\n\
             \x20 \"title\": \"Problem Title\",\n\
             \x20 \"description\": \"Problem description\",\n\
             \x20 \"difficulty\": \"{difficulty}\",\n\
             \x20 \"examples\": [\n\
             \x20   {{\n\
             \x20     \"input\": \"example input\",\n\
             \x20     \"output\": \"example output\",\n\
             \x20     \"explanation\": \"explanation\"\n\
             \x20   }}\n\
             \x20 ],\n\
             \x20 \"constraints\": [\"constraint1\", \"constraint2\"],\n\
             \x20 \"hints\": [\"hint1\", \"hint2\"]\n\
             }}\n\n\
             Make sure the JSON is valid and well-formatted. Do not include any text before \
             or after the JSON."
        );

        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part::text(prompt)],
            }],
            generation_config: Some(GenerationConfig {
                max_output_tokens: 500,
                temperature: 0.8,
            }),
        };

        let text = self.retry.run(|| self.generate(&request)).await?;
        Ok(parse_problem_text(&text, difficulty))
    }
}

/// Remove markdown code-fence wrappers the model sometimes adds despite
/// being told not to.
fn strip_code_fences(text: &str) -> String {
    let stripped = FENCE_OPEN.replace(text.trim(), "");
    FENCE_CLOSE.replace(&stripped, "").trim().to_string()
}

fn parse_problem_text(text: &str, difficulty: Difficulty) -> ProblemSpec {
    let cleaned = strip_code_fences(text);
    match serde_json::from_str::<ProblemSpec>(&cleaned) {
        Ok(problem) => problem,
        Err(e) => {
            warn!("failed to parse generated problem JSON: {}", e);
            ProblemSpec::fallback(difficulty)
        }
    }
}
