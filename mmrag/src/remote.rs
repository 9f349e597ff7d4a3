//! HTTP-backed encoders for remote embedding services.
//!
//! This module is only available when the `remote` feature is enabled.
//! [`HttpTextEncoder`] speaks the OpenAI-style `/v1/embeddings` protocol;
//! [`HttpImageEncoder`] posts base64-encoded RGB images to an image
//! embedding endpoint, validating and canonicalizing the bytes locally
//! before any network round-trip.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::encoder::{ImageEncoder, TextEncoder};
use crate::error::{MmError, Result};
use crate::fusion::l2_normalize;

/// The default OpenAI-compatible embeddings endpoint.
const OPENAI_EMBEDDINGS_URL: &str = "https://api.openai.com/v1/embeddings";

/// The default text embedding model.
const DEFAULT_TEXT_MODEL: &str = "text-embedding-3-small";

/// The default dimensionality for `text-embedding-3-small`.
const DEFAULT_TEXT_DIMENSIONS: usize = 1536;

fn text_error(message: impl Into<String>) -> MmError {
    MmError::Encoding { modality: "text".to_string(), message: message.into() }
}

fn image_error(message: impl Into<String>) -> MmError {
    MmError::Encoding { modality: "image".to_string(), message: message.into() }
}

/// A [`TextEncoder`] backed by an OpenAI-style embeddings API.
///
/// # Example
///
/// ```rust,ignore
/// use mmrag::remote::HttpTextEncoder;
///
/// let encoder = HttpTextEncoder::new("sk-...")?;
/// let vector = encoder.encode("hello world").await?;
/// assert_eq!(vector.len(), encoder.dimensions());
/// ```
pub struct HttpTextEncoder {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    dimensions: usize,
    /// If set, passed to the API for Matryoshka dimension truncation.
    request_dimensions: Option<usize>,
}

impl HttpTextEncoder {
    /// Create a new encoder with the given API key and the default
    /// endpoint, model, and dimensions.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(text_error("API key must not be empty"));
        }
        Ok(Self {
            client: reqwest::Client::new(),
            endpoint: OPENAI_EMBEDDINGS_URL.to_string(),
            api_key,
            model: DEFAULT_TEXT_MODEL.to_string(),
            dimensions: DEFAULT_TEXT_DIMENSIONS,
            request_dimensions: None,
        })
    }

    /// Create a new encoder using the `OPENAI_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| text_error("OPENAI_API_KEY environment variable not set"))?;
        Self::new(api_key)
    }

    /// Point the encoder at a different OpenAI-compatible endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the output dimensions (Matryoshka support).
    pub fn with_dimensions(mut self, dims: usize) -> Self {
        self.dimensions = dims;
        self.request_dimensions = Some(dims);
        self
    }
}

#[derive(Serialize)]
struct TextEmbeddingRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
}

#[derive(Deserialize)]
struct TextEmbeddingResponse {
    data: Vec<TextEmbeddingData>,
}

#[derive(Deserialize)]
struct TextEmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

#[async_trait]
impl TextEncoder for HttpTextEncoder {
    async fn encode(&self, text: &str) -> Result<Vec<f32>> {
        if text.is_empty() {
            return Err(text_error("input text must not be empty"));
        }
        let vectors = self.encode_batch(&[text]).await?;
        vectors.into_iter().next().ok_or_else(|| text_error("API returned empty response"))
    }

    async fn encode_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        if texts.iter().any(|t| t.is_empty()) {
            return Err(text_error("input text must not be empty"));
        }

        debug!(batch_size = texts.len(), model = %self.model, "encoding text batch");

        let request_body = TextEmbeddingRequest {
            model: &self.model,
            input: texts.to_vec(),
            dimensions: self.request_dimensions,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "text embedding request failed");
                text_error(format!("request failed: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            error!(%status, "text embedding API error");
            return Err(text_error(format!("API returned {status}: {detail}")));
        }

        let parsed: TextEmbeddingResponse = response
            .json()
            .await
            .map_err(|e| text_error(format!("failed to parse response: {e}")))?;

        let mut vectors: Vec<Vec<f32>> =
            parsed.data.into_iter().map(|d| d.embedding).collect();
        for vector in &mut vectors {
            l2_normalize(vector);
        }
        Ok(vectors)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// An [`ImageEncoder`] backed by a remote image embedding endpoint.
///
/// Bytes are decoded and converted to 3-channel RGB locally; bytes that
/// do not decode as an image resolve to `Ok(None)` without touching the
/// network. The canonical RGB image is re-encoded as PNG and posted
/// base64-encoded.
pub struct HttpImageEncoder {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    model: Option<String>,
    dimensions: usize,
}

impl HttpImageEncoder {
    /// Create a new encoder posting to `endpoint`, which must return
    /// vectors of length `dimensions`.
    pub fn new(endpoint: impl Into<String>, dimensions: usize) -> Result<Self> {
        let endpoint = endpoint.into();
        if endpoint.is_empty() {
            return Err(image_error("endpoint must not be empty"));
        }
        if dimensions == 0 {
            return Err(image_error("dimensions must be greater than zero"));
        }
        Ok(Self {
            client: reqwest::Client::new(),
            endpoint,
            api_key: None,
            model: None,
            dimensions,
        })
    }

    /// Set a bearer token for the endpoint.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the model name sent with each request.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Decode arbitrary bytes into canonical RGB PNG bytes, or `None`
    /// when the bytes are not a decodable image.
    fn canonicalize(&self, bytes: &[u8]) -> Option<Vec<u8>> {
        let decoded = match image::load_from_memory(bytes) {
            Ok(img) => img,
            Err(e) => {
                warn!(error = %e, "image bytes could not be decoded");
                return None;
            }
        };
        let rgb = image::DynamicImage::ImageRgb8(decoded.to_rgb8());

        let mut png = Vec::new();
        let mut cursor = std::io::Cursor::new(&mut png);
        if let Err(e) = rgb.write_to(&mut cursor, image::ImageFormat::Png) {
            warn!(error = %e, "failed to re-encode image as png");
            return None;
        }
        Some(png)
    }
}

#[derive(Serialize)]
struct ImageEmbeddingRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
    image: String,
}

#[derive(Deserialize)]
struct ImageEmbeddingResponse {
    embedding: Vec<f32>,
}

#[async_trait]
impl ImageEncoder for HttpImageEncoder {
    async fn encode(&self, image: &[u8]) -> Result<Option<Vec<f32>>> {
        let Some(png) = self.canonicalize(image) else {
            return Ok(None);
        };

        debug!(payload_bytes = png.len(), "encoding image");

        let request_body =
            ImageEmbeddingRequest { model: self.model.as_deref(), image: BASE64.encode(&png) };

        let mut request = self.client.post(&self.endpoint).json(&request_body);
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await.map_err(|e| {
            error!(error = %e, "image embedding request failed");
            image_error(format!("request failed: {e}"))
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(%status, "image embedding API error");
            return Err(image_error(format!("API returned {status}: {body}")));
        }

        let parsed: ImageEmbeddingResponse = response
            .json()
            .await
            .map_err(|e| image_error(format!("failed to parse response: {e}")))?;

        let mut vector = parsed.embedding;
        l2_normalize(&mut vector);
        Ok(Some(vector))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
