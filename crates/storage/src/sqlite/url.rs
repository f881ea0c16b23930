use std::path::{Path, PathBuf};

use super::SqliteInitError;

const MEMORY_URL: &str = "sqlite::memory:";

/// Turn a bare path or a relative `sqlite:` URL into an absolute
/// `sqlite://` URL. Query parameters are kept.
#[must_use]
pub fn normalize_sqlite_url(raw: &str) -> String {
    let raw = raw.trim();
    if raw == MEMORY_URL || raw.starts_with("sqlite://") {
        return raw.to_string();
    }
    let location = raw.strip_prefix("sqlite:").unwrap_or(raw);
    let (path, query) = match location.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (location, None),
    };
    let path = Path::new(path);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    match query {
        Some(query) => format!("sqlite://{}?{query}", absolute.display()),
        None => format!("sqlite://{}", absolute.display()),
    }
}

/// Create the parent directories of a file-backed database.
///
/// # Errors
///
/// Returns `SqliteInitError::InvalidUrl` for URLs without a path, and
/// `SqliteInitError::Io` if the directories cannot be created.
pub fn ensure_database_file(database_url: &str) -> Result<(), SqliteInitError> {
    if database_url == MEMORY_URL || database_url.contains("mode=memory") {
        return Ok(());
    }
    let path = database_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| SqliteInitError::InvalidUrl(database_url.to_string()))?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(SqliteInitError::InvalidUrl(database_url.to_string()));
    }
    if let Some(parent) = Path::new(path).parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}
