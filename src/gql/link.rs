use std::sync::Arc;

use async_graphql::dynamic::Schema;
use async_graphql::parser::parse_query;
use async_graphql::parser::types::{DocumentOperations, OperationType};
use async_graphql::{Executor, Request, Response};
use futures::stream::{self, BoxStream};
use futures::{StreamExt, future};

use super::cache::{Invalidator, Optimistic, SchemaCache};
use super::decl::Declaration;
use super::error::GqlError;
use super::schema::BuildOptions;
use crate::kvs::DocumentStore;

const ABORTED: &str = "ABORTED";

/// Executes GraphQL operations against the schema generated for a fixed set
/// of declarations, emitting each result to a single subscriber
#[derive(Clone)]
pub struct Link<I: Invalidator = Optimistic> {
	cache: SchemaCache<I>,
	decls: Arc<[Declaration]>,
}

impl<I: Invalidator> Link<I> {
	pub fn new(store: Arc<dyn DocumentStore>, decls: Vec<Declaration>) -> Self {
		Self::with_options(store, decls, BuildOptions::from_env())
	}

	pub fn with_options(
		store: Arc<dyn DocumentStore>,
		decls: Vec<Declaration>,
		options: BuildOptions,
	) -> Self {
		Link {
			cache: SchemaCache::with_options(store, options),
			decls: decls.into(),
		}
	}

	pub fn declarations(&self) -> &[Declaration] {
		&self.decls
	}

	/// The schema operations are executed against
	pub async fn schema(&self) -> Result<Schema, GqlError> {
		self.cache.get_schema(&self.decls).await
	}

	/// Execute a request.
	///
	/// Queries produce exactly one response. Subscriptions produce one
	/// response per event. Responses for aborted backend calls are dropped.
	pub fn execute(
		&self,
		request: impl Into<Request>,
	) -> BoxStream<'static, Result<Response, GqlError>> {
		let request = request.into();
		let cache = self.cache.clone();
		let decls = self.decls.clone();

		let events = async move {
			let schema = match cache.get_schema(&decls).await {
				Ok(schema) => schema,
				Err(e) => {
					debug!("failed to build schema: {e}");
					return stream::once(future::ready(Err(e))).boxed();
				}
			};
			if is_subscription(&request) {
				trace!("routing subscription to the stream executor");
				Executor::execute_stream(&schema, request, None).map(Ok).boxed()
			} else {
				stream::once(async move { Ok(schema.execute(request).await) }).boxed()
			}
		};

		stream::once(events)
			.flatten()
			.filter(|res| {
				let keep = match res {
					Ok(res) => !is_aborted(res),
					Err(e) => !e.is_aborted(),
				};
				if !keep {
					debug!("dropping response for an aborted request");
				}
				future::ready(keep)
			})
			.boxed()
	}
}

fn is_subscription(request: &Request) -> bool {
	let Ok(doc) = parse_query(&request.query) else {
		return false;
	};
	let ty = match (&doc.operations, request.operation_name.as_deref()) {
		(DocumentOperations::Single(op), _) => op.node.ty,
		(DocumentOperations::Multiple(ops), Some(name)) => match ops.get(name) {
			Some(op) => op.node.ty,
			None => return false,
		},
		(DocumentOperations::Multiple(_), None) => return false,
	};
	ty == OperationType::Subscription
}

fn is_aborted(res: &Response) -> bool {
	res.errors.iter().any(|e| {
		e.extensions
			.as_ref()
			.and_then(|ext| ext.get("code"))
			.is_some_and(|code| matches!(code, async_graphql::Value::String(s) if s == ABORTED))
	})
}
