use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Config(String),

    #[error("Unsupported field: {0}")]
    UnsupportedField(String),

    #[error("Invalid lock action value: {0:?}")]
    InvalidActionValue(String),

    #[error("Invalid {name} {value:?}: must be a non-empty topic level without '/', '+' or '#'")]
    InvalidTopicSegment { name: &'static str, value: String },
}

pub type Result<T> = std::result::Result<T, Error>;
