// Sunbeam client - remote file store of the team's data pipeline
use crate::application::data_source::DataSource;
use crate::domain::canonical_path::CanonicalPath;
use crate::domain::file::File;
use crate::domain::result::{FetchError, FetchResult};
use async_trait::async_trait;

#[derive(Debug, Clone)]
pub struct SunbeamClient {
    client: reqwest::Client,
    base_url: String,
}

impl SunbeamClient {
    pub fn new(base_url: String) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// `{base}/files/{origin}/{event}/{source}/{name}`
    pub fn file_url(&self, path: &CanonicalPath) -> String {
        let mut url = format!("{}/files", self.base_url);
        for component in path.unwrap() {
            url.push('/');
            url.push_str(&urlencoding::encode(&component));
        }
        url
    }

    async fn fetch(&self, path: &CanonicalPath) -> Result<File, FetchError> {
        let url = self.file_url(path);
        tracing::debug!("Fetching {} from {}", path, url);

        let response = self
            .client
            .get(&url)
            .query(&[("file_type", "json")])
            .send()
            .await
            .map_err(|e| FetchError::Transport {
                url: url.clone(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let reason = if body.is_empty() {
                status.canonical_reason().unwrap_or("unknown error").to_string()
            } else {
                body
            };
            return Err(FetchError::Status {
                url,
                status: status.as_u16(),
                reason,
            });
        }

        response.json::<File>().await.map_err(|e| FetchError::Decode {
            url,
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl DataSource for SunbeamClient {
    async fn get(&self, path: &CanonicalPath) -> FetchResult<File> {
        let result = self.fetch(path).await;
        if let Err(error) = &result {
            tracing::warn!("Could not fetch {}: {}", path, error);
        }
        result.into()
    }
}
