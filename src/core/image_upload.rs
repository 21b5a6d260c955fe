use crate::core::http::{read_failure, PlatformClient, IMAGE_UPLOAD_PATH};
use crate::domain::model::Token;
use crate::domain::payload::ImageUrl;
use crate::utils::error::{Result, SmartstoreError};
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

#[derive(Debug, Deserialize)]
struct UploadResponse {
    #[serde(default)]
    images: Vec<ImageUrl>,
}

#[derive(Debug)]
struct UploadFailure {
    /// 平台上傳端點回應的狀態碼；下載原圖失敗時為 `None`
    status: Option<StatusCode>,
    message: String,
}

impl From<String> for UploadFailure {
    fn from(message: String) -> Self {
        Self {
            status: None,
            message,
        }
    }
}

/// 把外部圖片搬到平台的圖片伺服器
#[derive(Debug, Clone)]
pub struct ImageUploader {
    http: PlatformClient,
    concurrency: usize,
}

impl ImageUploader {
    pub fn new(http: PlatformClient, concurrency: usize) -> Self {
        Self {
            http,
            concurrency: concurrency.max(1),
        }
    }

    /// 併發上傳全部圖片，回傳的託管網址與輸入順序一致。
    /// 任何一張失敗就中止其餘上傳並回傳 `UploadError`；
    /// 平台以 401 拒絕權杖時改回傳 `AuthError`。
    pub async fn upload_all(&self, token: &Token, urls: &[String]) -> Result<Vec<String>> {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();
        let mut task_index = HashMap::with_capacity(urls.len());

        tracing::info!(
            "🖼️ Uploading {} images (concurrency {})",
            urls.len(),
            self.concurrency
        );

        for (index, url) in urls.iter().cloned().enumerate() {
            let http = self.http.clone();
            let bearer = token.value.clone();
            let semaphore = Arc::clone(&semaphore);

            let handle = tasks.spawn(async move {
                let result = match semaphore.acquire_owned().await {
                    Ok(_permit) => upload_one(&http, &bearer, &url).await,
                    Err(e) => Err(UploadFailure::from(e.to_string())),
                };
                (index, url, result)
            });
            task_index.insert(handle.id(), index);
        }

        let mut hosted: Vec<Option<String>> = vec![None; urls.len()];
        while let Some(joined) = tasks.join_next().await {
            let (index, url, result) = match joined {
                Ok(done) => done,
                Err(e) => {
                    tasks.abort_all();
                    let index = task_index.get(&e.id()).copied().unwrap_or_default();
                    return Err(SmartstoreError::UploadError {
                        index,
                        url: urls.get(index).cloned().unwrap_or_default(),
                        message: format!("upload task failed: {}", e),
                    });
                }
            };

            match result {
                Ok(hosted_url) => {
                    tracing::debug!("🖼️ Image #{} hosted at {}", index + 1, hosted_url);
                    hosted[index] = Some(hosted_url);
                }
                Err(UploadFailure { status, message }) => {
                    tasks.abort_all();
                    tracing::error!("❌ Image #{} upload failed: {}", index + 1, message);
                    if status == Some(StatusCode::UNAUTHORIZED) {
                        return Err(SmartstoreError::auth(message));
                    }
                    return Err(SmartstoreError::UploadError {
                        index,
                        url,
                        message,
                    });
                }
            }
        }

        Ok(hosted.into_iter().flatten().collect())
    }
}

async fn upload_one(
    http: &PlatformClient,
    bearer: &str,
    url: &str,
) -> std::result::Result<String, UploadFailure> {
    let source = http
        .http()
        .get(url)
        .send()
        .await
        .map_err(|e| format!("download failed: {}", e))?;
    if !source.status().is_success() {
        return Err(format!("download failed: {}", source.status()).into());
    }

    let content_type = source
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .filter(|value| value.starts_with("image/"))
        .map(str::to_string)
        .unwrap_or_else(|| guess_content_type(url).to_string());
    let bytes = source
        .bytes()
        .await
        .map_err(|e| format!("download failed: {}", e))?;

    let part = Part::bytes(bytes.to_vec())
        .file_name(file_name(url))
        .mime_str(&content_type)
        .map_err(|e| format!("invalid content type '{}': {}", content_type, e))?;
    let form = Form::new().part("imageFiles", part);

    let response = http
        .http()
        .post(http.endpoint(IMAGE_UPLOAD_PATH))
        .bearer_auth(bearer)
        .multipart(form)
        .send()
        .await
        .map_err(|e| e.to_string())?;

    if !response.status().is_success() {
        let (status, message) = read_failure(response).await;
        return Err(UploadFailure {
            status: Some(status),
            message: format!("{} ({})", message, status),
        });
    }

    let body: UploadResponse = response
        .json()
        .await
        .map_err(|e| format!("malformed upload response: {}", e))?;
    body.images
        .into_iter()
        .next()
        .map(|image| image.url)
        .ok_or_else(|| UploadFailure::from("upload response contained no image url".to_string()))
}

fn file_name(url: &str) -> String {
    url.split(['?', '#'])
        .next()
        .and_then(|path| path.rsplit('/').next())
        .filter(|name| !name.is_empty())
        .unwrap_or("image.jpg")
        .to_string()
}

fn guess_content_type(url: &str) -> &'static str {
    let name = file_name(url).to_ascii_lowercase();
    match name.rsplit('.').next() {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "image/jpeg",
    }
}
