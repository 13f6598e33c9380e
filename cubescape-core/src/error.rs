pub type CubeResult<T> = Result<T, CubeError>;

#[derive(thiserror::Error, Debug)]
pub enum CubeError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serde(String),

    #[error("display error: {0}")]
    Display(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CubeError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    pub fn display(msg: impl Into<String>) -> Self {
        Self::Display(msg.into())
    }
}

impl From<serde_json::Error> for CubeError {
    fn from(err: serde_json::Error) -> Self {
        Self::serde(err.to_string())
    }
}
