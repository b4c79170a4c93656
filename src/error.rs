use ::scraper::error::SelectorErrorKind;

/// All errors that can occur while fetching, merging or publishing odds data.
///
/// The extraction core itself never produces these: missing rows, cells or
/// labels degrade to empty strings or the `"0"` sentinel instead.
#[derive(thiserror::Error, Debug)]
pub enum IddaaError {
    /// HTTP request failed (network, DNS, TLS, timeout, etc.).
    #[error("http request failed for {url}: {source}")]
    Http {
        url: String,
        source: reqwest::Error,
    },

    /// Server returned a non-success HTTP status code.
    #[error("unexpected status {status} for {url}")]
    UnexpectedStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    /// Failed to read the response body.
    #[error("failed to read response body from {url}: {source}")]
    ResponseBody {
        url: String,
        source: reqwest::Error,
    },

    /// A request URL could not be built.
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// A CSS selector string could not be parsed.
    #[error("invalid CSS selector: {0}")]
    Selector(String),

    /// Reading or writing the CSV dataset failed.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// A JSON payload from the publishing API could not be (de)serialized.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Remote file content was not valid base64.
    #[error("failed to decode remote content: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Remote file content was not valid UTF-8.
    #[error("remote content is not utf-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Local file access failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// An expected HTML element was not found on the page.
    #[error("expected element not found: {context}")]
    ElementNotFound { context: &'static str },
}

impl<'a> From<SelectorErrorKind<'a>> for IddaaError {
    fn from(err: SelectorErrorKind<'a>) -> Self {
        IddaaError::Selector(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, IddaaError>;
