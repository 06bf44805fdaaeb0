use tokio::sync::RwLock;

use std::collections::BTreeMap;
use std::collections::hash_map::DefaultHasher;
use std::fmt::Debug;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::Arc;

use async_graphql::dynamic::Schema;

use crate::kvs::DocumentStore;

use super::decl::Declaration;
use super::error::GqlError;
use super::schema::{BuildOptions, generate_schema};

/// Decides whether a cached schema can be served again
pub trait Invalidator: Debug + Clone + Send + Sync + 'static {
	type MetaData: Debug + Clone + Send + Sync + Hash;

	fn is_valid(decls: &[Declaration], meta: &Self::MetaData) -> bool;

	fn generate(
		store: &Arc<dyn DocumentStore>,
		decls: &[Declaration],
		opts: &BuildOptions,
	) -> Result<(Schema, Self::MetaData), GqlError>;
}

/// Rebuilds the schema on every request
#[derive(Debug, Clone, Copy)]
pub struct Pessimistic;

impl Invalidator for Pessimistic {
	type MetaData = ();

	fn is_valid(_decls: &[Declaration], _meta: &Self::MetaData) -> bool {
		false
	}

	fn generate(
		store: &Arc<dyn DocumentStore>,
		decls: &[Declaration],
		opts: &BuildOptions,
	) -> Result<(Schema, Self::MetaData), GqlError> {
		let schema = generate_schema(store, decls, opts)?;
		Ok((schema, ()))
	}
}

/// Serves a cached schema for as long as the declarations are unchanged
#[derive(Debug, Clone, Copy)]
pub struct Optimistic;

impl Invalidator for Optimistic {
	type MetaData = ();

	fn is_valid(_decls: &[Declaration], _meta: &Self::MetaData) -> bool {
		true
	}

	fn generate(
		store: &Arc<dyn DocumentStore>,
		decls: &[Declaration],
		opts: &BuildOptions,
	) -> Result<(Schema, Self::MetaData), GqlError> {
		let schema = generate_schema(store, decls, opts)?;
		Ok((schema, ()))
	}
}

/// Caches generated schemas, keyed by a fingerprint of the declarations and
/// build options they were generated from
#[derive(Clone)]
pub struct SchemaCache<I: Invalidator = Optimistic> {
	#[expect(clippy::type_complexity)]
	inner: Arc<RwLock<BTreeMap<u64, (Schema, I::MetaData)>>>,
	pub store: Arc<dyn DocumentStore>,
	pub options: BuildOptions,
	_invalidator: PhantomData<I>,
}

impl<I: Invalidator + Debug> Debug for SchemaCache<I> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SchemaCache")
			.field("options", &self.options)
			.field("_invalidator", &self._invalidator)
			.finish()
	}
}

impl<I: Invalidator> SchemaCache<I> {
	pub fn new(store: Arc<dyn DocumentStore>) -> Self {
		Self::with_options(store, BuildOptions::from_env())
	}

	pub fn with_options(store: Arc<dyn DocumentStore>, options: BuildOptions) -> Self {
		SchemaCache {
			inner: Default::default(),
			store,
			options,
			_invalidator: PhantomData,
		}
	}

	pub async fn get_schema(&self, decls: &[Declaration]) -> Result<Schema, GqlError> {
		let key = fingerprint(decls, &self.options);
		{
			let guard = self.inner.read().await;
			if let Some(cand) = guard.get(&key) {
				if I::is_valid(decls, &cand.1) {
					trace!(key, "serving cached schema");
					return Ok(cand.0.clone());
				}
			}
		};

		debug!(key, types = decls.len(), "generating schema");
		let (schema, meta) = I::generate(&self.store, decls, &self.options)?;

		{
			let mut guard = self.inner.write().await;
			guard.insert(key, (schema.clone(), meta));
		}

		Ok(schema)
	}

	/// Drop every cached schema
	pub async fn invalidate(&self) {
		self.inner.write().await.clear();
	}

	pub async fn len(&self) -> usize {
		self.inner.read().await.len()
	}

	pub async fn is_empty(&self) -> bool {
		self.inner.read().await.is_empty()
	}
}

fn fingerprint(decls: &[Declaration], opts: &BuildOptions) -> u64 {
	let mut hasher = DefaultHasher::new();
	decls.hash(&mut hasher);
	opts.hash(&mut hasher);
	hasher.finish()
}
