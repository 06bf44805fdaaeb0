use thiserror::Error;

/// An error raised by a document store backend.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum Error {
	/// The backend could not be reached or refused the request
	#[error("The document store is unavailable: {0}")]
	Unavailable(String),

	/// The in-flight request was aborted before it completed
	#[error("The document store request was aborted")]
	Aborted,

	/// The backend cannot evaluate the supplied query constraints
	#[error("Invalid query constraint: {0}")]
	InvalidConstraint(String),

	/// The stored data could not be read back
	#[error("Internal document store error: {0}")]
	Internal(String),
}

impl Error {
	/// Whether this error signals a cancelled request rather than a failure
	pub fn is_aborted(&self) -> bool {
		matches!(self, Error::Aborted)
	}
}
