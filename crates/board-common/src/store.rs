/// Content store: fetches the announcements and site-content documents.
///
/// Both documents are requested concurrently and a snapshot only exists once both have
/// loaded. Failures are returned once, with no retries.
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::error::CommonError;
use crate::model::{AnnouncementDocument, ContentDocument};

#[derive(Debug, Clone)]
pub enum ContentSource {
    Directory(PathBuf),
    Http { base_url: String, timeout: Duration },
}

impl ContentSource {
    /// `http://` and `https://` locations become URL sources, anything else a directory.
    pub fn parse(location: &str, timeout: Duration) -> Self {
        let trimmed = location.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            Self::Http {
                base_url: trimmed.trim_end_matches('/').to_string(),
                timeout,
            }
        } else {
            Self::Directory(PathBuf::from(trimmed))
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Directory(dir) => dir.display().to_string(),
            Self::Http { base_url, .. } => base_url.clone(),
        }
    }
}

/// Both documents as loaded at one point in time.
#[derive(Debug, Clone)]
pub struct ContentSnapshot {
    pub announcements: AnnouncementDocument,
    pub content: ContentDocument,
    /// SHA-256 over both raw bodies, hex encoded.
    pub digest: String,
}

pub struct ContentStore {
    source: ContentSource,
    announcements_file: String,
    content_file: String,
    http: reqwest::Client,
}

impl ContentStore {
    pub fn new(
        source: ContentSource,
        announcements_file: impl Into<String>,
        content_file: impl Into<String>,
    ) -> Result<Self, CommonError> {
        let http = reqwest::Client::builder()
            .user_agent("nero-board/content-store")
            .build()?;
        Ok(Self {
            source,
            announcements_file: announcements_file.into(),
            content_file: content_file.into(),
            http,
        })
    }

    pub fn source(&self) -> &ContentSource {
        &self.source
    }

    pub async fn load_snapshot(&self) -> Result<ContentSnapshot, CommonError> {
        let (announcements_raw, content_raw) = futures::try_join!(
            self.fetch_raw(&self.announcements_file),
            self.fetch_raw(&self.content_file),
        )?;

        let announcements: AnnouncementDocument =
            decode(&self.announcements_file, &announcements_raw)?;
        let content: ContentDocument = decode(&self.content_file, &content_raw)?;
        let digest = digest(&announcements_raw, &content_raw);

        info!(
            source = %self.source.describe(),
            announcements = announcements.announcements.len(),
            portfolio = content.portfolio.len(),
            timeline = content.about.timeline.len(),
            "content snapshot loaded"
        );

        Ok(ContentSnapshot {
            announcements,
            content,
            digest,
        })
    }

    async fn fetch_raw(&self, name: &str) -> Result<String, CommonError> {
        match &self.source {
            ContentSource::Directory(dir) => read_file(&dir.join(name)).await,
            ContentSource::Http { base_url, timeout } => {
                let url = format!("{base_url}/{name}");
                debug!(url, "fetching document");
                let resp = self.http.get(&url).timeout(*timeout).send().await?;
                let status = resp.status();
                if !status.is_success() {
                    return Err(CommonError::FetchStatus {
                        origin: url,
                        status: status.as_u16(),
                    });
                }
                Ok(resp.text().await?)
            }
        }
    }
}

async fn read_file(path: &Path) -> Result<String, CommonError> {
    debug!(path = %path.display(), "reading document");
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| CommonError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })
}

fn decode<T: DeserializeOwned>(name: &str, raw: &str) -> Result<T, CommonError> {
    serde_json::from_str(raw).map_err(|e| CommonError::Json {
        origin: name.to_string(),
        message: e.to_string(),
    })
}

fn digest(announcements_raw: &str, content_raw: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(announcements_raw.as_bytes());
    hasher.update(b"|");
    hasher.update(content_raw.as_bytes());
    format!("{:x}", hasher.finalize())
}
