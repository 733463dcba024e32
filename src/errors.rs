use serde::Serialize;
use thiserror::Error;
use std::fmt;

#[derive(Error, Debug)]
pub enum DataHubError {
    #[error("HTTP request error: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("HTTP status {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Store error: {0}")]
    StoreError(String),

    #[error("Config error: {0}")]
    ConfigError(String),
}

/// 错误大类：抓取、解析、存储、配置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    Fetch,
    Parse,
    Store,
    Config,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Fetch => "FetchError",
            ErrorKind::Parse => "ParseError",
            ErrorKind::Store => "StoreError",
            ErrorKind::Config => "ConfigError",
        };
        f.write_str(name)
    }
}

impl DataHubError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DataHubError::RequestError(_) | DataHubError::HttpStatus { .. } => ErrorKind::Fetch,
            DataHubError::JsonError(_) | DataHubError::ParseError(_) => ErrorKind::Parse,
            DataHubError::DatabaseError(_) | DataHubError::StoreError(_) => ErrorKind::Store,
            DataHubError::ConfigError(_) => ErrorKind::Config,
        }
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        DataHubError::ParseError(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, DataHubError>;
