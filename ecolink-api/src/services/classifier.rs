//! AI classification client
//!
//! Sends an observation's identifying signal (a species name, or the
//! uploaded image itself) to an external generative model and asks for a
//! structured rarity judgment. The upstream model replies with free-form
//! text that is merely expected to contain one JSON object, so the reply is
//! parsed defensively: the first well-formed brace-delimited object found
//! anywhere in the text is extracted before parsing.
//!
//! Classification is best-effort and never blocks a submission: transport
//! errors, timeouts, malformed replies, and out-of-range rarity values all
//! degrade to the default classification (most-common tier, generic
//! description).

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::Serialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

/// Description used when no usable classification was obtained
pub const FALLBACK_DESCRIPTION: &str = "No classification available";

/// Rarity tier bounds
const MIN_RARITY: i64 = 1;
const MAX_RARITY: i64 = 5;

/// Classifier configuration
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Classification endpoint; `None` disables remote classification and
    /// every request resolves to the default
    pub endpoint: Option<String>,
    /// Bearer credential for the model endpoint, if required
    pub api_key: Option<String>,
    /// Bound on the upstream call; a timeout degrades to the default
    pub timeout: Duration,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            timeout: Duration::from_secs(20),
        }
    }
}

/// A rarity judgment for an observed plant or animal
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    /// Rarity tier in 1..=5 (1 = very common)
    pub rarity: i64,
    pub description: String,
}

impl Classification {
    /// Safe default: most-common tier with a generic description
    pub fn fallback() -> Self {
        Self {
            rarity: MIN_RARITY,
            description: FALLBACK_DESCRIPTION.to_string(),
        }
    }
}

/// AI classification client
pub struct ClassifierClient {
    config: ClassifierConfig,
    http: reqwest::Client,
}

impl ClassifierClient {
    pub fn new(config: ClassifierConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_default();

        Self { config, http }
    }

    /// Classify a plant by its declared name
    pub async fn classify_name(&self, name: &str) -> Classification {
        let prompt = format!(
            "Classify the plant species named \"{}\" by how rarely it is \
             observed in the wild. Reply with a JSON object of the form \
             {{\"rarity\": <integer 1-5, 1 = very common>, \"description\": \
             <one sentence about the species>}}.",
            name
        );

        self.request(json!({ "prompt": prompt }))
            .await
            .unwrap_or_else(Classification::fallback)
    }

    /// Classify an animal from its photo
    pub async fn classify_image(&self, bytes: &[u8], content_type: &str) -> Classification {
        let prompt = "Identify the animal in the attached image and classify \
                      how rarely it is observed in the wild. Reply with a \
                      JSON object of the form {\"rarity\": <integer 1-5, 1 = \
                      very common>, \"description\": <one sentence about the \
                      animal>}.";

        let body = json!({
            "prompt": prompt,
            "image": BASE64.encode(bytes),
            "mime_type": content_type,
        });

        self.request(body).await.unwrap_or_else(Classification::fallback)
    }

    /// Perform the upstream call; `None` on any failure
    async fn request(&self, body: Value) -> Option<Classification> {
        let endpoint = self.config.endpoint.as_deref()?;

        let mut request = self.http.post(endpoint).json(&body);
        if let Some(api_key) = &self.config.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("Classifier request failed: {}", e);
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!("Classifier returned status {}", status);
            return None;
        }

        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                warn!("Failed to read classifier response: {}", e);
                return None;
            }
        };

        debug!(reply = %text, "Classifier reply");

        let classification = parse_classification(&text);
        if classification.is_none() {
            warn!("Classifier reply contained no usable classification");
        }
        classification
    }
}

/// Parse a classification out of a free-form model reply
fn parse_classification(text: &str) -> Option<Classification> {
    let object = extract_first_json_object(text)?;
    let value: Value = serde_json::from_str(object).ok()?;

    let rarity = match value.get("rarity") {
        Some(Value::Number(n)) => n.as_i64()?,
        Some(Value::String(s)) => s.trim().parse::<i64>().ok()?,
        _ => return None,
    };

    if !(MIN_RARITY..=MAX_RARITY).contains(&rarity) {
        return None;
    }

    let description = value
        .get("description")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| FALLBACK_DESCRIPTION.to_string());

    Some(Classification {
        rarity,
        description,
    })
}

/// Extract the first well-formed brace-delimited JSON object from `text`
///
/// Brace matching is string- and escape-aware so braces inside string
/// literals do not terminate the object early.
pub fn extract_first_json_object(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    let start = text.find('{')?;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &b) in bytes[start..].iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }

        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }

    None
}
