use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] tokio_rusqlite::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Feed proxy returned HTTP {0}")]
    Status(reqwest::StatusCode),

    #[error("Feed proxy error: {0}")]
    Proxy(String),

    #[error("OPML parsing failed: {0}")]
    OpmlParse(String),

    #[error("Invalid selector: {0}")]
    Selector(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Render target not found: {0}")]
    MissingContainer(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;
