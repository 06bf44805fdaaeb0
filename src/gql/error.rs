use async_graphql::ErrorExtensions;
use thiserror::Error;

use super::decl::Kind;

#[derive(Debug, Error)]
pub enum GqlError {
	#[error("Database error: {0}")]
	DbError(crate::err::Error),
	#[error("Error generating schema: {0}")]
	SchemaError(String),
	#[error("Types `{first}` and `{second}` both generate the query field `{field}`")]
	DuplicateField {
		field: String,
		first: String,
		second: String,
	},
	#[error("Error resolving request: {0}")]
	ResolverError(String),
	#[error("Internal Error: {0}")]
	InternalError(String),
	#[error("Error converting value: {val} to type: {target}")]
	TypeError {
		target: Kind,
		val: serde_json::Value,
	},
}

impl GqlError {
	/// The machine readable code placed in a GraphQL error's `extensions`
	pub fn code(&self) -> &'static str {
		match self {
			GqlError::DbError(e) if e.is_aborted() => "ABORTED",
			GqlError::DbError(_) => "DB_ERROR",
			GqlError::SchemaError(_) | GqlError::DuplicateField { .. } => "SCHEMA_ERROR",
			GqlError::ResolverError(_) => "RESOLVER_ERROR",
			GqlError::InternalError(_) => "INTERNAL_ERROR",
			GqlError::TypeError { .. } => "TYPE_ERROR",
		}
	}

	pub fn is_aborted(&self) -> bool {
		matches!(self, GqlError::DbError(e) if e.is_aborted())
	}
}

pub fn schema_error(msg: impl Into<String>) -> GqlError {
	GqlError::SchemaError(msg.into())
}

pub fn resolver_error(msg: impl Into<String>) -> GqlError {
	GqlError::ResolverError(msg.into())
}

pub fn internal_error(msg: impl Into<String>) -> GqlError {
	let msg = msg.into();
	error!("{}", msg);
	GqlError::InternalError(msg)
}

pub fn type_error(kind: &Kind, val: &serde_json::Value) -> GqlError {
	GqlError::TypeError {
		target: kind.clone(),
		val: val.to_owned(),
	}
}

impl From<crate::err::Error> for GqlError {
	fn from(value: crate::err::Error) -> Self {
		GqlError::DbError(value)
	}
}

impl From<GqlError> for async_graphql::Error {
	fn from(value: GqlError) -> Self {
		let code = value.code();
		async_graphql::Error::new(value.to_string()).extend_with(|_, e| e.set("code", code))
	}
}
