use crate::config::{Config, GenerationSettings};
use crate::error::FitError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use tokio::time::sleep;

const HARM_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];
const BLOCK_THRESHOLD: &str = "BLOCK_MEDIUM_AND_ABOVE";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    /// Base64 payload
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Part {
    Text { text: String },
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text { text: text.into() }
    }

    pub fn image(mime_type: impl Into<String>, base64_data: impl Into<String>) -> Self {
        Part::Inline {
            inline_data: InlineData { mime_type: mime_type.into(), data: base64_data.into() },
        }
    }
}

/// One structured-output call: prompt parts, optional system instruction and
/// the response schema the model must follow.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub parts: Vec<Part>,
    pub system_instruction: Option<String>,
    pub response_schema: Option<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_k: u32,
    top_p: f32,
    max_output_tokens: u32,
    response_mime_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
}

#[derive(Debug, Serialize)]
struct SafetySetting {
    category: &'static str,
    threshold: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    generation_config: GenerationConfig,
    safety_settings: Vec<SafetySetting>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
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

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    generation: GenerationSettings,
    max_retries: u32,
    retry_backoff: std::time::Duration,
    dump_dir: Option<PathBuf>,
}

impl GeminiClient {
    pub fn new(config: &Config) -> Result<Self, FitError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            generation: config.generation,
            max_retries: config.max_retries,
            retry_backoff: config.retry_backoff,
            dump_dir: config.dump_dir.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sends the request and returns the model's text. Only transient
    /// failures are retried, and only when retries are configured.
    pub async fn generate(&self, request: &GenerationRequest, stage_name: &str) -> Result<String, FitError> {
        let mut attempt = 0;
        loop {
            match self.generate_attempt(request, stage_name).await {
                Ok(text) => return Ok(text),
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    attempt += 1;
                    log::warn!("{stage_name}: attempt {attempt}/{} failed: {e}", self.max_retries + 1);
                    sleep(self.retry_backoff * 2u32.pow(attempt - 1)).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn build_payload(&self, request: &GenerationRequest) -> GeminiRequest {
        GeminiRequest {
            contents: vec![Content { parts: request.parts.clone() }],
            system_instruction: request
                .system_instruction
                .as_ref()
                .map(|text| Content { parts: vec![Part::text(text.clone())] }),
            generation_config: GenerationConfig {
                temperature: self.generation.temperature,
                top_k: self.generation.top_k,
                top_p: self.generation.top_p,
                max_output_tokens: self.generation.max_output_tokens,
                response_mime_type: "application/json",
                response_schema: request.response_schema.clone(),
            },
            safety_settings: HARM_CATEGORIES
                .iter()
                .map(|&category| SafetySetting { category, threshold: BLOCK_THRESHOLD })
                .collect(),
        }
    }

    async fn generate_attempt(&self, request: &GenerationRequest, stage_name: &str) -> Result<String, FitError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let payload = self.build_payload(request);

        log::debug!("{stage_name}: POST {url}");
        let res = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let err_text = res.text().await.unwrap_or_default();
            log::error!("{stage_name}: API Error {status}: {err_text}");
            let message = serde_json::from_str::<ErrorEnvelope>(&err_text)
                .map(|e| e.error.message)
                .unwrap_or(err_text);
            return Err(FitError::Service { status: status.as_u16(), message });
        }

        let body: GeminiResponse = res.json().await?;
        let text = extract_text(body)?;
        self.dump_response(stage_name, &text);
        Ok(text)
    }

    fn dump_response(&self, stage_name: &str, text: &str) {
        let Some(dir) = &self.dump_dir else { return };
        let safe_stage = stage_name.replace(' ', "_").replace('/', "-");
        let path = dir.join(format!("llm_response_{}_{}.json", safe_stage, uuid::Uuid::new_v4()));

        if let Err(e) = fs::create_dir_all(dir).and_then(|_| fs::write(&path, text)) {
            log::warn!("Failed to dump response to {}: {}", path.display(), e);
        } else {
            log::info!("LLM response dumped to '{}'", path.display());
        }
    }
}

fn extract_text(body: GeminiResponse) -> Result<String, FitError> {
    let Some(candidate) = body.candidates.into_iter().next() else {
        let reason = body
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .unwrap_or_else(|| "no candidates returned".into());
        return Err(FitError::EmptyResponse(reason));
    };

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        let reason = candidate.finish_reason.unwrap_or_else(|| "no text content returned".into());
        return Err(FitError::EmptyResponse(reason));
    }
    Ok(text)
}
