// Two-variant result used at the boundary with remote data sources
use thiserror::Error;

/// Failure reported by a remote data source.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("{url} responded with {status}: {reason}")]
    Status {
        url: String,
        status: u16,
        reason: String,
    },

    #[error("could not decode the payload from {url}: {message}")]
    Decode { url: String, message: String },
}

/// Raised when the value of an `Err` result is requested.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("attempted to unwrap an Err result")]
pub struct UnwrappedError(#[source] pub FetchError);

/// Outcome of a remote fetch: either the fetched value or the error that
/// prevented it.
///
/// The error slot only admits [`FetchError`], so a plain value can never be
/// stored as an error. Fetching code returns this instead of failing, and the
/// caller decides when to [`unwrap`](FetchResult::unwrap).
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub enum FetchResult<T> {
    Ok(T),
    Err(FetchError),
}

impl<T> FetchResult<T> {
    pub fn is_ok(&self) -> bool {
        matches!(self, FetchResult::Ok(_))
    }

    pub fn is_err(&self) -> bool {
        !self.is_ok()
    }

    /// Take the value out, or report an [`UnwrappedError`] carrying the original failure.
    pub fn unwrap(self) -> Result<T, UnwrappedError> {
        match self {
            FetchResult::Ok(value) => Ok(value),
            FetchResult::Err(error) => Err(UnwrappedError(error)),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> FetchResult<U> {
        match self {
            FetchResult::Ok(value) => FetchResult::Ok(f(value)),
            FetchResult::Err(error) => FetchResult::Err(error),
        }
    }
}

impl<T> From<Result<T, FetchError>> for FetchResult<T> {
    fn from(result: Result<T, FetchError>) -> Self {
        match result {
            Ok(value) => FetchResult::Ok(value),
            Err(error) => FetchResult::Err(error),
        }
    }
}

impl<T> From<FetchResult<T>> for Result<T, FetchError> {
    fn from(result: FetchResult<T>) -> Self {
        match result {
            FetchResult::Ok(value) => Ok(value),
            FetchResult::Err(error) => Err(error),
        }
    }
}
