//! The document store contract consumed by the generated resolvers.
//!
//! Resolvers only ever need two reads: fetch one record from a collection by
//! key, and query a collection with an ordered list of [`Constraint`]s. Any
//! backend which can answer those two calls can sit behind a schema.

pub mod mem;
mod query;

use serde::{Deserialize, Serialize};

use crate::err::Error;

pub use query::{Constraint, Operator};

/// The raw field map stored for a single document
pub type Record = serde_json::Map<String, serde_json::Value>;

/// A document returned from a collection query, carrying its own key
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Document {
	pub key: String,
	pub data: Record,
}

impl Document {
	pub fn new(key: impl Into<String>, data: Record) -> Self {
		Document {
			key: key.into(),
			data,
		}
	}
}

#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync + 'static {
	/// Fetch the record stored at `key` in `collection`, if it exists
	async fn get(&self, collection: &str, key: &str) -> Result<Option<Record>, Error>;

	/// Scan `collection`, applying the constraints in the order given
	async fn query(
		&self,
		collection: &str,
		constraints: &[Constraint],
	) -> Result<Vec<Document>, Error>;
}
