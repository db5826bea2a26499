//! Groq vision client implementing the extraction service.

use std::path::Path;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use recibo_core::error::ExtractError;
use recibo_core::extract::{ExtractedFields, ReceiptExtractor};

const GROQ_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
const MODEL: &str = "llama-3.2-90b-vision-preview";

const SYSTEM_PROMPT: &str = "\
Eres un asistente que analiza fotos de tickets de compra de supermercados españoles.
Debes extraer exactamente dos datos:
1. El nombre del proveedor/supermercado (por ejemplo: Mercadona, Carrefour, Lidl, Dia, Aldi, Ahorramas, Eroski, Alcampo, Consum, BonArea)
2. La fecha de la compra en formato YYYY-MM-DD

Responde SOLO con un JSON valido con este formato exacto, sin texto adicional:
{\"provider\": \"NombreProveedor\", \"date\": \"YYYY-MM-DD\"}

Si no puedes detectar el proveedor, usa null para provider.
Si no puedes detectar la fecha, usa null para date.";

/// Receipt extractor backed by the Groq vision chat-completions API.
pub struct GroqVisionClient {
    http: reqwest::Client,
    api_key: String,
}

impl GroqVisionClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl ReceiptExtractor for GroqVisionClient {
    async fn extract(&self, image: &Path) -> Result<ExtractedFields, ExtractError> {
        let bytes = tokio::fs::read(image)
            .await
            .map_err(|e| ExtractError::InvalidImage(format!("{}: {e}", image.display())))?;
        let data_url = format!("data:{};base64,{}", mime_type(image), BASE64.encode(&bytes));

        let body = json!({
            "model": MODEL,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                {
                    "role": "user",
                    "content": [
                        { "type": "text", "text": "Analiza este ticket de compra y extrae el proveedor y la fecha." },
                        { "type": "image_url", "image_url": { "url": data_url } }
                    ]
                }
            ],
            "temperature": 0.1,
            "max_tokens": 256
        });

        let response = self
            .http
            .post(GROQ_API_URL)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ExtractError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ExtractError::Transport(format!(
                "Groq API returned {}",
                response.status()
            )));
        }

        let reply: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ExtractError::Transport(e.to_string()))?;

        let content = reply["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or("");
        debug!("vision service reply: {content}");

        Ok(parse_model_reply(content))
    }
}

/// Pull the raw fields out of the model reply. Any malformed response is
/// treated as "no data extracted", never as a hard failure.
fn parse_model_reply(content: &str) -> ExtractedFields {
    #[derive(Deserialize, Default)]
    struct RawFields {
        provider: Option<String>,
        date: Option<String>,
    }

    let json_str = strip_code_fences(content.trim());
    let raw: RawFields = serde_json::from_str(&json_str).unwrap_or_default();

    ExtractedFields {
        provider: raw.provider,
        date_text: raw.date,
    }
}

/// The model may wrap its JSON in markdown code fences.
fn strip_code_fences(content: &str) -> String {
    if !content.starts_with("```") {
        return content.to_string();
    }

    content
        .lines()
        .skip(1)
        .take_while(|line| !line.starts_with("```"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn mime_type(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        _ => "image/jpeg",
    }
}
