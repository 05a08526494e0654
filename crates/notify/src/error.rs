use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Discord(Box<serenity::Error>),

    #[error("delivery to channel {channel_id} rejected with HTTP {status}")]
    Rejected { channel_id: String, status: u16 },

    #[error("delivery to channel {channel_id} timed out")]
    Timeout { channel_id: String },

    #[error("'{channel_id}' is not a Discord channel id")]
    InvalidChannel { channel_id: String },
}

impl Error {
    #[must_use]
    pub fn rejected(channel_id: impl Into<String>, status: u16) -> Self {
        Self::Rejected {
            channel_id: channel_id.into(),
            status,
        }
    }

    #[must_use]
    pub fn timeout(channel_id: impl Into<String>) -> Self {
        Self::Timeout {
            channel_id: channel_id.into(),
        }
    }

    #[must_use]
    pub fn invalid_channel(channel_id: impl Into<String>) -> Self {
        Self::InvalidChannel {
            channel_id: channel_id.into(),
        }
    }

    /// Classifies a failed send; non-2xx answers become [`Error::Rejected`].
    #[must_use]
    pub fn delivery(channel_id: &str, err: serenity::Error) -> Self {
        match err {
            serenity::Error::Http(serenity::http::HttpError::UnsuccessfulRequest(response)) => {
                Self::rejected(channel_id, response.status_code.as_u16())
            },
            other => Self::Discord(Box::new(other)),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
