use thiserror::Error;

#[derive(Debug, Error)]
pub enum GraphLinkError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("connection error: {0}")]
    Connection(String),
    #[error("execution error: {0}")]
    Execution(String),
    #[error("unsupported source data type: {0}")]
    UnsupportedType(String),
    #[error("parse error: {0}")]
    Parse(String),
}

impl GraphLinkError {
    pub fn configuration<T: Into<String>>(msg: T) -> Self {
        GraphLinkError::Configuration(msg.into())
    }

    pub fn connection<T: Into<String>>(msg: T) -> Self {
        GraphLinkError::Connection(msg.into())
    }

    pub fn execution<T: Into<String>>(msg: T) -> Self {
        GraphLinkError::Execution(msg.into())
    }

    pub fn unsupported_type<T: Into<String>>(msg: T) -> Self {
        GraphLinkError::UnsupportedType(msg.into())
    }

    pub fn parse<T: Into<String>>(msg: T) -> Self {
        GraphLinkError::Parse(msg.into())
    }

    /// True for failures the write loop is allowed to retry.
    pub fn is_retriable(&self) -> bool {
        matches!(self, GraphLinkError::Execution(_))
    }
}
