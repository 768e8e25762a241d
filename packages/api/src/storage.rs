//! Blob uploads (avatars and CVs) to Firebase Storage.

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use url::form_urlencoded::byte_serialize;

use crate::timer::with_timeout;
use crate::ApiError;

const STORAGE_BASE: &str = "https://firebasestorage.googleapis.com/v0/b";

/// A file picked in the browser.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Upload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Storage path of a user's avatar.
pub fn avatar_path(uid: &str) -> String {
    format!("profile_images/{}", uid)
}

/// Storage path of a user's CV.
pub fn cv_path(uid: &str, file_name: &str) -> String {
    format!("cvs/{}_{}", uid, file_name)
}

pub trait BlobStorage {
    /// Store `upload` at `path` and return its download URL.
    fn upload(
        &self,
        path: &str,
        upload: &Upload,
        id_token: &str,
    ) -> impl Future<Output = Result<String, ApiError>>;
}

#[derive(Clone, Debug)]
pub struct FirebaseStorage {
    http: Client,
    bucket: String,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectMetadata {
    name: String,
    #[serde(default)]
    download_tokens: Option<String>,
}

/// Percent-encode one path segment; `/` included.
fn encode(s: &str) -> String {
    byte_serialize(s.as_bytes()).collect::<String>().replace('+', "%20")
}

impl FirebaseStorage {
    pub fn new(bucket: &str, timeout: Duration) -> Self {
        Self {
            http: Client::new(),
            bucket: bucket.to_string(),
            timeout,
        }
    }

    fn download_url(&self, name: &str, token: Option<&str>) -> String {
        let mut url = format!("{}/{}/o/{}?alt=media", STORAGE_BASE, self.bucket, encode(name));
        if let Some(token) = token {
            url.push_str("&token=");
            url.push_str(token);
        }
        url
    }
}

impl BlobStorage for FirebaseStorage {
    async fn upload(&self, path: &str, upload: &Upload, id_token: &str) -> Result<String, ApiError> {
        let url = format!("{}/{}/o?name={}", STORAGE_BASE, self.bucket, encode(path));
        let request = self
            .http
            .post(url)
            .bearer_auth(id_token)
            .header(reqwest::header::CONTENT_TYPE, upload.content_type.as_str())
            .body(upload.bytes.clone());

        let metadata: ObjectMetadata = with_timeout(self.timeout, async {
            let response = request.send().await?;
            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(ApiError::from_status(status.as_u16(), &body));
            }
            Ok(response.json::<ObjectMetadata>().await?)
        })
        .await?;

        tracing::info!(path, bytes = upload.bytes.len(), "uploaded file");
        Ok(self.download_url(&metadata.name, metadata.download_tokens.as_deref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        assert_eq!(avatar_path("u1"), "profile_images/u1");
        assert_eq!(cv_path("u1", "cv.pdf"), "cvs/u1_cv.pdf");
    }

    #[test]
    fn test_download_url_encodes_name() {
        let storage = FirebaseStorage::new("ideady.appspot.com", Duration::from_secs(10));
        assert_eq!(
            storage.download_url("cvs/u1_my cv.pdf", Some("tok")),
            "https://firebasestorage.googleapis.com/v0/b/ideady.appspot.com/o/cvs%2Fu1_my%20cv.pdf?alt=media&token=tok"
        );
    }
}
