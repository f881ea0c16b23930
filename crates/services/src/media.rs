use std::env;
use std::path::PathBuf;

use async_trait::async_trait;
use reqwest::Client;

use quiz_core::model::{MediaUri, Question};

use crate::error::MediaError;

/// Resolves and warms question illustrations. A question without an image is
/// a normal outcome, not an error.
#[async_trait]
pub trait MediaGateway: Send + Sync {
    fn resolve_image_url(&self, question: &Question) -> Option<MediaUri>;

    /// Fetch `uri` ahead of display.
    ///
    /// # Errors
    ///
    /// Returns `MediaError` if the media cannot be reached.
    async fn prefetch(&self, uri: &MediaUri) -> Result<(), MediaError>;
}

#[derive(Clone, Debug)]
pub struct MediaConfig {
    /// Base that relative image references are joined onto.
    pub base: MediaUri,
}

impl MediaConfig {
    /// Reads `QUIZ_MEDIA_BASE_URL`: an `http(s)` URL or a local directory.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let raw = env::var("QUIZ_MEDIA_BASE_URL").ok()?;
        Self::parse(&raw)
    }

    /// Like [`MediaConfig::try_parse`], but blank input yields `None` and an
    /// unusable base is logged and ignored.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.trim().is_empty() {
            return None;
        }
        match Self::try_parse(raw) {
            Ok(config) => Some(config),
            Err(err) => {
                log::warn!("ignoring QUIZ_MEDIA_BASE_URL: {err}");
                None
            }
        }
    }

    /// Parse a media base: an `http(s)` URL or a local directory.
    ///
    /// # Errors
    ///
    /// Returns `MediaError::Invalid` if `raw` is blank or an unparseable URL.
    pub fn try_parse(raw: &str) -> Result<Self, MediaError> {
        let raw = raw.trim();
        let base = if raw.starts_with("http://") || raw.starts_with("https://") {
            MediaUri::from_url(raw)?
        } else {
            MediaUri::from_file(PathBuf::from(raw))?
        };
        Ok(Self { base })
    }
}

/// Media gateway over HTTP and the local file system.
///
/// Without a configured base only absolute `http(s)` image references resolve.
#[derive(Clone)]
pub struct HttpMediaGateway {
    client: Client,
    config: Option<MediaConfig>,
}

impl HttpMediaGateway {
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(MediaConfig::from_env())
    }

    #[must_use]
    pub fn new(config: Option<MediaConfig>) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

#[async_trait]
impl MediaGateway for HttpMediaGateway {
    fn resolve_image_url(&self, question: &Question) -> Option<MediaUri> {
        let reference = question.image()?;
        let resolved = match &self.config {
            Some(config) => MediaUri::resolve(reference, &config.base),
            None => MediaUri::from_url(reference),
        };
        match resolved {
            Ok(uri) => Some(uri),
            Err(err) => {
                log::debug!("no image for question {}: {err}", question.number());
                None
            }
        }
    }

    async fn prefetch(&self, uri: &MediaUri) -> Result<(), MediaError> {
        match uri {
            MediaUri::Url(url) => {
                let response = self.client.get(url.clone()).send().await?;
                if !response.status().is_success() {
                    return Err(MediaError::HttpStatus(response.status()));
                }
                let bytes = response.bytes().await?;
                log::debug!("prefetched {} bytes from {url}", bytes.len());
                Ok(())
            }
            MediaUri::FilePath(path) => {
                let meta = tokio::fs::metadata(path).await?;
                if meta.is_file() {
                    Ok(())
                } else {
                    Err(MediaError::Io(std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        format!("{} is not a file", path.display()),
                    )))
                }
            }
        }
    }
}
