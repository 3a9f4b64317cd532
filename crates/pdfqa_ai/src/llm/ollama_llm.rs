use std::time::Duration;

use pdfqa_core::error::AppError;
use serde::{Deserialize, Serialize};

use super::{Llm, SamplingOptions};
use crate::ollama::OllamaClient;

#[derive(Debug, Clone)]
pub struct OllamaLlm {
    client: OllamaClient,
    timeout: Duration,
}

impl OllamaLlm {
    pub fn new(client: OllamaClient) -> Self {
        Self {
            client,
            // CPU-only generation of a few hundred tokens routinely takes minutes.
            timeout: Duration::from_secs(300),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Clone, Serialize)]
struct GenerateOptions {
    num_predict: u32,
    temperature: f32,
    top_p: f32,
    repeat_penalty: f32,
}

#[derive(Debug, Clone, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    // The prompt is complete and ends with the answer marker; skip chat templating.
    raw: bool,
    options: GenerateOptions,
}

#[derive(Debug, Clone, Deserialize)]
struct GenerateResponse {
    response: String,
}

impl Llm for OllamaLlm {
    fn generate(
        &self,
        model: &str,
        prompt: &str,
        sampling: &SamplingOptions,
    ) -> Result<String, AppError> {
        let url = format!("{}/api/generate", self.client.base_url());
        let req = GenerateRequest {
            model,
            prompt,
            stream: false,
            raw: true,
            options: GenerateOptions {
                num_predict: sampling.max_new_tokens,
                temperature: sampling.temperature,
                top_p: sampling.top_p,
                repeat_penalty: sampling.repetition_penalty,
            },
        };

        let resp = ureq::post(&url)
            .timeout(self.timeout)
            .send_json(serde_json::to_value(req).map_err(|e| {
                AppError::model("AI_GENERATION_FAILED", "Failed to encode generation request")
                    .with_details(e.to_string())
            })?);

        match resp {
            Ok(r) if r.status() == 200 => {
                let v: GenerateResponse = r.into_json().map_err(|e| {
                    AppError::model("AI_GENERATION_FAILED", "Failed to decode generation response")
                        .with_details(e.to_string())
                })?;
                Ok(v.response)
            }
            Ok(r) => Err(
                AppError::model("AI_GENERATION_FAILED", "Generation request failed")
                    .with_details(format!("status={}; model={model}", r.status())),
            ),
            Err(ureq::Error::Status(status, _)) => Err(
                AppError::model("AI_GENERATION_FAILED", "Generation request failed")
                    .with_details(format!("status={status}; model={model}")),
            ),
            Err(e) => Err(
                AppError::model("AI_GENERATION_FAILED", "Failed to call generation endpoint")
                    .with_details(e.to_string())
                    .with_retryable(true),
            ),
        }
    }
}
