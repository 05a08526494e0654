use thiserror::Error;

use lookout_catalog::ParseError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("channel {channel_id} is readonly; configuration unchanged")]
    ReadonlyViolation { channel_id: String },

    #[error("failed to persist configuration for channel {channel_id}: {source}")]
    Persistence {
        channel_id: String,
        #[source]
        source: Box<Error>,
    },

    #[error("{message}")]
    Message { message: String },
}

impl Error {
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn readonly(channel_id: impl Into<String>) -> Self {
        Self::ReadonlyViolation {
            channel_id: channel_id.into(),
        }
    }

    #[must_use]
    pub fn persistence(channel_id: impl Into<String>, source: Error) -> Self {
        Self::Persistence {
            channel_id: channel_id.into(),
            source: Box::new(source),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
