use std::sync::Arc;

use async_graphql::dynamic::{Object, Schema, Type, TypeRef};

use super::decl::Declaration;
use super::error::{GqlError, schema_error};
use super::filter::{
	CONDITION, CONDITION_VALUE, PAGINATION, condition_input, condition_value_scalar,
	pagination_input,
};
use super::tables::process_decls;
use super::translate::SkipMode;
use crate::cnf;
use crate::kvs::DocumentStore;

pub const QUERY: &str = "Query";

/// Type names which declarations may not use
pub const RESERVED_TYPES: [&str; 9] = [
	QUERY,
	PAGINATION,
	CONDITION,
	CONDITION_VALUE,
	TypeRef::ID,
	TypeRef::STRING,
	TypeRef::INT,
	TypeRef::FLOAT,
	TypeRef::BOOLEAN,
];

/// Settings which change the generated resolvers, but not the declarations
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct BuildOptions {
	pub skip: SkipMode,
}

impl BuildOptions {
	/// Build options as configured through the environment
	pub fn from_env() -> Self {
		BuildOptions {
			skip: *cnf::PAGINATION_SKIP,
		}
	}

	pub fn with_skip(mut self, skip: SkipMode) -> Self {
		self.skip = skip;
		self
	}
}

/// Generate an executable schema for a list of declarations.
///
/// The declarations are checked as a whole before anything is registered, so a
/// name clash between two types fails the build instead of silently replacing
/// one of the generated query fields.
pub fn generate_schema(
	store: &Arc<dyn DocumentStore>,
	decls: &[Declaration],
	opts: &BuildOptions,
) -> Result<Schema, GqlError> {
	if decls.is_empty() {
		return Err(schema_error("no object types were declared"));
	}
	trace!(types = decls.len(), ?opts, "generating schema");

	let mut types: Vec<Type> = Vec::new();
	let query = process_decls(decls, Object::new(QUERY), &mut types, store, opts)?;

	let mut schema = Schema::build(QUERY, None, None).register(query);
	for ty in types {
		schema = schema.register(ty);
	}

	schema = schema
		.register(pagination_input())
		.register(condition_input())
		.register(condition_value_scalar());

	schema
		.finish()
		.map_err(|e| schema_error(format!("there was an error generating schema: {e:?}")))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::gql::decl::{FieldDef, Kind, ObjectType};
	use crate::kvs::mem::MemStore;

	fn store() -> Arc<dyn DocumentStore> {
		Arc::new(MemStore::new())
	}

	fn user(name: &str) -> Declaration {
		Declaration::dynamic(
			ObjectType::new(name)
				.field("id", Kind::Id)
				.field("name", Kind::String)
				.field("score", Kind::Float)
				.field("tags", Kind::List(Box::new(Kind::String))),
		)
	}

	#[test]
	fn generates_fields_and_filters() {
		let schema = generate_schema(&store(), &[user("User")], &BuildOptions::default()).unwrap();
		let sdl = schema.sdl();
		assert!(sdl.contains("type User"), "{sdl}");
		assert!(sdl.contains("input UserFilter"), "{sdl}");
		assert!(sdl.contains("input Pagination"), "{sdl}");
		assert!(sdl.contains("input Condition"), "{sdl}");
		assert!(sdl.contains("scalar ConditionValue"), "{sdl}");
		assert!(sdl.contains("user(id: ID): User"), "{sdl}");
		assert!(sdl.contains("users(where: UserFilter, pagination: Pagination): [User!]!"), "{sdl}");
		assert!(sdl.contains("score: Condition"), "{sdl}");
		assert!(sdl.contains("tags: [String]"), "{sdl}");
	}

	#[test]
	fn rejects_case_insensitive_duplicates() {
		let err = generate_schema(&store(), &[user("User"), user("user")], &BuildOptions::default())
			.unwrap_err();
		match err {
			GqlError::DuplicateField {
				field,
				first,
				second,
			} => {
				assert_eq!(field, "user");
				assert_eq!(first, "User");
				assert_eq!(second, "user");
			}
			e => panic!("unexpected error: {e}"),
		}
	}

	#[test]
	fn rejects_plural_collisions() {
		// `Users` would take the `users` field already generated for `User`
		let err = generate_schema(&store(), &[user("User"), user("Users")], &BuildOptions::default())
			.unwrap_err();
		assert!(matches!(err, GqlError::DuplicateField { .. }), "{err}");
	}

	#[test]
	fn rejects_reserved_and_empty() {
		let err =
			generate_schema(&store(), &[user("Pagination")], &BuildOptions::default()).unwrap_err();
		assert!(matches!(err, GqlError::SchemaError(_)), "{err}");

		let err = generate_schema(&store(), &[], &BuildOptions::default()).unwrap_err();
		assert!(matches!(err, GqlError::SchemaError(_)), "{err}");

		let bare = Declaration::dynamic(ObjectType::new("Bare"));
		let err = generate_schema(&store(), &[bare], &BuildOptions::default()).unwrap_err();
		assert!(matches!(err, GqlError::SchemaError(_)), "{err}");
	}

	#[test]
	fn rejects_repeated_declared_fields() {
		let ty = ObjectType {
			name: "User".to_string(),
			fields: vec![
				FieldDef {
					name: "name".to_string(),
					kind: Kind::String,
				},
				FieldDef {
					name: "name".to_string(),
					kind: Kind::Int,
				},
			],
		};
		let err = generate_schema(&store(), &[Declaration::dynamic(ty)], &BuildOptions::default())
			.unwrap_err();
		assert!(matches!(err, GqlError::SchemaError(_)), "{err}");
	}

	#[test]
	fn rejects_filter_name_clash() {
		let err = generate_schema(&store(), &[user("User"), user("UserFilter")], &BuildOptions::default())
			.unwrap_err();
		assert!(err.to_string().contains("UserFilter"), "{err}");
	}
}
