use std::collections::BTreeMap;
use std::sync::Arc;

use async_graphql::Value as GqlValue;
use async_graphql::dynamic::{
	Field, FieldFuture, FieldValue, InputValue, Object, ResolverContext, Type, TypeRef,
};
use serde_json::Value as JsonValue;

use super::decl::{Declaration, Hydrated, Kind};
use super::error::{GqlError, internal_error, resolver_error, schema_error};
use super::ext::{gql_to_json_kind, json_to_gql};
use super::filter::{FilterType, PAGINATION, derive_filter};
use super::schema::{BuildOptions, RESERVED_TYPES};
use super::translate::translate;
use crate::kvs::DocumentStore;

macro_rules! id_input {
	() => {
		InputValue::new("id", TypeRef::named(TypeRef::ID))
	};
}

/// The singular and plural query field names generated for a type
pub fn field_names(type_name: &str) -> (String, String) {
	let get = type_name.to_lowercase();
	let list = format!("{get}s");
	(get, list)
}

pub(super) fn process_decls(
	decls: &[Declaration],
	mut query: Object,
	types: &mut Vec<Type>,
	store: &Arc<dyn DocumentStore>,
	opts: &BuildOptions,
) -> Result<Object, GqlError> {
	let mut fields: BTreeMap<String, String> = BTreeMap::new();
	let mut type_names: Vec<String> = RESERVED_TYPES.iter().map(ToString::to_string).collect();

	for decl in decls.iter() {
		let ty_name = decl.name().to_owned();
		trace!("Adding type: {ty_name}");

		let (get_name, list_name) = field_names(&ty_name);
		for name in [&get_name, &list_name] {
			if let Some(first) = fields.insert(name.clone(), ty_name.clone()) {
				return Err(GqlError::DuplicateField {
					field: name.clone(),
					first,
					second: ty_name,
				});
			}
		}

		if decl.object().fields.is_empty() {
			return Err(schema_error(format!("`{ty_name}` must declare at least one field")));
		}

		let filter = derive_filter(decl.object())?;
		for name in [&ty_name, &filter.name] {
			if type_names.contains(name) {
				return Err(schema_error(format!("type name `{name}` is already in use")));
			}
			type_names.push(name.clone());
		}

		let mut table_ty_obj = Object::new(&ty_name)
			.description(format!("Generated from declaration `{ty_name}`"));
		for fd in decl.object().fields.iter() {
			table_ty_obj = table_ty_obj.field(Field::new(
				&fd.name,
				fd.kind.type_ref()?,
				make_field_resolver(&fd.name),
			));
		}

		types.push(Type::Object(table_ty_obj));
		types.push(Type::InputObject(filter.to_input_object()?));

		let decl = Arc::new(decl.clone());
		let filter_name = filter.name.clone();
		let filter = Arc::new(filter);

		query = query.field(
			Field::new(get_name, TypeRef::named(&ty_name), make_get_resolver(decl.clone(), store.clone()))
				.description(format!("Fetch a single `{ty_name}` by its ID"))
				.argument(id_input!()),
		);

		query = query.field(
			Field::new(
				list_name,
				TypeRef::named_nn_list_nn(&ty_name),
				make_list_resolver(decl, filter, store.clone(), *opts),
			)
			.description(format!(
				"Generated from declaration `{ty_name}`\nallows querying a collection with filters"
			))
			.argument(InputValue::new("where", TypeRef::named(filter_name)))
			.argument(InputValue::new("pagination", TypeRef::named(PAGINATION))),
		);
	}

	Ok(query)
}

fn make_get_resolver(
	decl: Arc<Declaration>,
	store: Arc<dyn DocumentStore>,
) -> impl for<'a> Fn(ResolverContext<'a>) -> FieldFuture<'a> + Send + Sync + 'static {
	move |ctx: ResolverContext| {
		let decl = decl.clone();
		let store = store.clone();
		FieldFuture::new(async move {
			match fetch_one(&ctx, &decl, store.as_ref()).await {
				Ok(entity) => Ok(entity.map(FieldValue::owned_any)),
				Err(e) => {
					add_field_error(&ctx, e);
					Ok(None)
				}
			}
		})
	}
}

async fn fetch_one(
	ctx: &ResolverContext<'_>,
	decl: &Declaration,
	store: &dyn DocumentStore,
) -> Result<Option<Hydrated>, GqlError> {
	let args = ctx.args.as_index_map();
	let id = match args.get("id").map(|v| gql_to_json_kind(v, &Kind::Id)).transpose()? {
		Some(JsonValue::String(id)) => id,
		_ => return Err(resolver_error(format!("No id was given to `{}`", ctx.field().name()))),
	};

	debug!(collection = decl.name(), %id, "fetching record");
	match store.get(decl.name(), &id).await? {
		Some(record) => decl.hydrate(Some(&id), record).map(Some),
		None => {
			trace!(collection = decl.name(), %id, "record not found");
			Ok(None)
		}
	}
}

fn make_list_resolver(
	decl: Arc<Declaration>,
	filter: Arc<FilterType>,
	store: Arc<dyn DocumentStore>,
	opts: BuildOptions,
) -> impl for<'a> Fn(ResolverContext<'a>) -> FieldFuture<'a> + Send + Sync + 'static {
	move |ctx: ResolverContext| {
		let decl = decl.clone();
		let filter = filter.clone();
		let store = store.clone();
		FieldFuture::new(async move {
			let out: Vec<FieldValue> =
				match fetch_all(&ctx, &decl, &filter, store.as_ref(), opts).await {
					Ok(entities) => entities.into_iter().map(FieldValue::owned_any).collect(),
					Err(e) => {
						add_field_error(&ctx, e);
						Vec::new()
					}
				};
			Ok(Some(FieldValue::list(out)))
		})
	}
}

async fn fetch_all(
	ctx: &ResolverContext<'_>,
	decl: &Declaration,
	filter: &FilterType,
	store: &dyn DocumentStore,
	opts: BuildOptions,
) -> Result<Vec<Hydrated>, GqlError> {
	let args = ctx.args.as_index_map();
	trace!("received request with args: {args:?}");

	let constraints = translate(filter, args.get("where"), args.get("pagination"), opts.skip)?;
	debug!(collection = decl.name(), ?constraints, "querying collection");

	let docs = store.query(decl.name(), &constraints).await?;
	trace!(collection = decl.name(), count = docs.len(), "query returned");

	docs.into_iter().map(|doc| decl.hydrate(Some(&doc.key), doc.data)).collect()
}

fn make_field_resolver(
	fd_name: impl Into<String>,
) -> impl for<'a> Fn(ResolverContext<'a>) -> FieldFuture<'a> + Send + Sync + 'static {
	let fd_name = fd_name.into();
	move |ctx: ResolverContext| {
		let fd_name = fd_name.clone();
		FieldFuture::new(async move {
			let Some(entity) = ctx.parent_value.downcast_ref::<Hydrated>() else {
				add_field_error(&ctx, internal_error("failed to downcast"));
				return Ok(None);
			};

			match entity.get(&fd_name).map(json_to_gql) {
				None | Some(Ok(GqlValue::Null)) => Ok(None),
				Some(Ok(v)) => Ok(Some(FieldValue::value(v))),
				Some(Err(_)) => {
					add_field_error(
						&ctx,
						resolver_error(format!("failed to convert field `{fd_name}`")),
					);
					Ok(None)
				}
			}
		})
	}
}

/// Record a failed field on the response, leaving sibling fields untouched
fn add_field_error(ctx: &ResolverContext<'_>, err: GqlError) {
	debug!("failed to resolve `{}`: {err}", ctx.field().name());
	let err = async_graphql::Error::from(err).into_server_error(ctx.item.pos);
	ctx.add_error(ctx.set_error_path(err));
}
