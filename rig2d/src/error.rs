use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("bad parameters: {message}")]
    BadParams { message: String },

    #[error("failed to load asset '{path}': {message}")]
    AssetLoad { path: String, message: String },

    #[error("failed to parse skeleton data: {message}")]
    Parse { message: String },

    #[error("unknown animation: {name}")]
    UnknownAnimation { name: String },

    #[error("time scale must not be negative, got {value}")]
    InvalidTimeScale { value: f32 },

    #[error("property '{property}' cannot change once the skeleton exists")]
    PropertyLocked { property: String },

    #[error("unknown property: {name}")]
    UnknownProperty { name: String },

    #[error("invalid value for property '{property}': {message}")]
    InvalidPropertyValue { property: String, message: String },
}

impl Error {
    pub fn bad_params(message: impl Into<String>) -> Self {
        Error::BadParams {
            message: message.into(),
        }
    }
}
