use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

//
// ─── ERRORS (domain validation) ────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MediaValidationError {
    #[error("Media URI cannot be empty.")]
    EmptyMediaUri,

    #[error("Media URL is invalid: {0}")]
    InvalidUrl(String),
}

//
// ─── MEDIA URI ─────────────────────────────────────────────────────────────────
//

/// Location of a question illustration: a local file or a remote URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MediaUri {
    FilePath(PathBuf),
    Url(Url),
}

impl MediaUri {
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, MediaValidationError> {
        let p = path.into();
        if p.as_os_str().is_empty() {
            return Err(MediaValidationError::EmptyMediaUri);
        }
        Ok(MediaUri::FilePath(p))
    }

    pub fn from_url(url: impl AsRef<str>) -> Result<Self, MediaValidationError> {
        let s = url.as_ref().trim();
        if s.is_empty() {
            return Err(MediaValidationError::EmptyMediaUri);
        }
        let u = Url::parse(s).map_err(|e| MediaValidationError::InvalidUrl(e.to_string()))?;
        Ok(MediaUri::Url(u))
    }

    /// Resolve an image reference from the catalog.
    ///
    /// Absolute `http(s)` references are used as-is; anything else is joined
    /// onto `base`.
    pub fn resolve(reference: &str, base: &MediaUri) -> Result<Self, MediaValidationError> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(MediaValidationError::EmptyMediaUri);
        }
        if let Ok(url) = Url::parse(reference) {
            if matches!(url.scheme(), "http" | "https") {
                return Ok(MediaUri::Url(url));
            }
        }
        match base {
            MediaUri::FilePath(dir) => Ok(MediaUri::FilePath(dir.join(reference))),
            MediaUri::Url(root) => {
                let mut root = root.clone();
                if !root.path().ends_with('/') {
                    let path = format!("{}/", root.path());
                    root.set_path(&path);
                }
                root.join(reference)
                    .map(MediaUri::Url)
                    .map_err(|e| MediaValidationError::InvalidUrl(e.to_string()))
            }
        }
    }

    pub fn as_path(&self) -> Option<&Path> {
        match self {
            MediaUri::FilePath(p) => Some(p.as_path()),
            MediaUri::Url(_) => None,
        }
    }

    pub fn as_url(&self) -> Option<&Url> {
        match self {
            MediaUri::Url(u) => Some(u),
            MediaUri::FilePath(_) => None,
        }
    }
}

impl std::fmt::Display for MediaUri {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaUri::FilePath(p) => write!(f, "{}", p.display()),
            MediaUri::Url(u) => write!(f, "{u}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_uris_are_rejected() {
        assert_eq!(MediaUri::from_file(""), Err(MediaValidationError::EmptyMediaUri));
        assert_eq!(MediaUri::from_url("  "), Err(MediaValidationError::EmptyMediaUri));
    }

    #[test]
    fn relative_reference_joins_url_base() {
        let base = MediaUri::from_url("https://cdn.example.org/images").unwrap();
        let uri = MediaUri::resolve("1.1.01-001.jpg", &base).unwrap();
        assert_eq!(
            uri.as_url().unwrap().as_str(),
            "https://cdn.example.org/images/1.1.01-001.jpg"
        );
    }

    #[test]
    fn absolute_reference_wins_over_base() {
        let base = MediaUri::from_file("/srv/media").unwrap();
        let uri = MediaUri::resolve("https://other.example.org/x.png", &base).unwrap();
        assert!(uri.as_url().is_some());
    }

    #[test]
    fn relative_reference_joins_directory_base() {
        let base = MediaUri::from_file("/srv/media").unwrap();
        let uri = MediaUri::resolve("x.png", &base).unwrap();
        assert_eq!(uri.as_path().unwrap(), Path::new("/srv/media/x.png"));
    }
}
