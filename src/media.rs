use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

// 1. MediaStorage Contract
/// MediaStorage
///
/// Defines the abstract contract for the external media host that story images
/// are uploaded to. This trait allows us to swap the concrete implementation
/// from the real Cloudinary client in production to the in-memory Mock during
/// testing, without affecting the calling handlers.
#[async_trait]
pub trait MediaStorage: Send + Sync {
    /// Uploads an image and returns its public URL.
    ///
    /// # Arguments
    /// * `data`: The raw file bytes from the multipart submission.
    /// * `content_type`: The client-reported MIME type (pre-filtered to image/*).
    async fn upload_image(&self, data: Vec<u8>, content_type: &str) -> Result<String, String>;
}

// 2. The Real Implementation (Cloudinary)
/// CloudinaryClient
///
/// The concrete implementation using Cloudinary's unsigned upload API. The
/// upload preset is configured server-side on the Cloudinary account, which is
/// what constrains file types and sizes; we only forward the bytes.
#[derive(Clone)]
pub struct CloudinaryClient {
    client: reqwest::Client,
    upload_url: String,
    upload_preset: String,
}

/// The subset of Cloudinary's upload response we care about.
#[derive(Deserialize)]
struct CloudinaryUploadResponse {
    secure_url: String,
}

impl CloudinaryClient {
    /// Constructs the client for the configured Cloudinary account.
    pub fn new(cloud_name: &str, upload_preset: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            upload_url: format!("https://api.cloudinary.com/v1_1/{cloud_name}/image/upload"),
            upload_preset: upload_preset.to_string(),
        }
    }
}

#[async_trait]
impl MediaStorage for CloudinaryClient {
    async fn upload_image(&self, data: Vec<u8>, content_type: &str) -> Result<String, String> {
        let file_part = reqwest::multipart::Part::bytes(data)
            .file_name("story-image")
            .mime_str(content_type)
            .map_err(|e| e.to_string())?;

        let form = reqwest::multipart::Form::new()
            .part("file", file_part)
            .text("upload_preset", self.upload_preset.clone())
            .text("folder", "irisehub/stories");

        let response = self
            .client
            .post(&self.upload_url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if !response.status().is_success() {
            return Err(format!("media host returned {}", response.status()));
        }

        let upload = response
            .json::<CloudinaryUploadResponse>()
            .await
            .map_err(|e| e.to_string())?;

        Ok(upload.secure_url)
    }
}

// 3. The Mock Implementation (For Unit Tests)
/// MockMediaStorage
///
/// A mock implementation of `MediaStorage` used exclusively for unit and
/// integration testing. This lets us test the submission handler without a
/// network connection to the media host.
#[derive(Clone)]
pub struct MockMediaStorage {
    /// When true, all operations return a simulated failure.
    pub should_fail: bool,
}

impl MockMediaStorage {
    pub fn new() -> Self {
        Self { should_fail: false }
    }

    pub fn new_failing() -> Self {
        Self { should_fail: true }
    }
}

impl Default for MockMediaStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaStorage for MockMediaStorage {
    async fn upload_image(&self, _data: Vec<u8>, _content_type: &str) -> Result<String, String> {
        if self.should_fail {
            return Err("Mock Media Error: Simulation requested".to_string());
        }

        // Deterministic-looking URL for mock assertions.
        Ok(format!(
            "https://media.example.test/irisehub/stories/{}.jpg",
            Uuid::new_v4()
        ))
    }
}

/// MediaState
///
/// The concrete type used to share the media host access across the application
/// state.
pub type MediaState = Arc<dyn MediaStorage>;
