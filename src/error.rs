use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Session is no longer usable: {0}")]
    SessionDeath(String),

    #[error("Couldn't find an element on the page. Selector: {0}")]
    ElementNotFound(String),
    #[error("Timed out waiting for: {0}")]
    WaitTimeout(String),
    #[error("Invalid CSS selector: {0}")]
    Selector(String),

    #[error("Results table has an unexpected shape: {0}")]
    MalformedTable(String),
    #[error("Couldn't parse a number from cell: {0:?}")]
    ParseNumber(String),

    #[error("Server answered with an error status: {0}")]
    Http(String),
    #[error("Reqwest Error: {0}")]
    Reqwest(reqwest::Error),

    #[error("Io Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Csv Error: {0}")]
    Csv(#[from] csv::Error),
}

impl Error {
    /// Whether the error means the session has to be thrown away and reopened.
    pub fn is_session_death(&self) -> bool {
        matches!(self, Error::SessionDeath(_))
    }
}

impl From<reqwest::Error> for Error {
    fn from(value: reqwest::Error) -> Self {
        if value.is_connect() || value.is_timeout() || value.is_request() {
            Error::SessionDeath(value.to_string())
        } else if let Some(status) = value.status() {
            Error::Http(status.to_string())
        } else {
            Error::Reqwest(value)
        }
    }
}
