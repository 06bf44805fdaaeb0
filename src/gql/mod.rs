//! GraphQL schema generation over a [`DocumentStore`](crate::kvs::DocumentStore).
//!
//! Each [`Declaration`] produces an object type, a derived `<Name>Filter`
//! input type and two query fields. For a type named `User` these are:
//!
//! ```graphql
//! user(id: ID): User
//! users(where: UserFilter, pagination: Pagination): [User!]!
//! ```

pub mod cache;
mod decl;
pub mod error;
mod ext;
mod filter;
pub mod link;
pub mod schema;
mod tables;
mod translate;

pub use cache::{Invalidator, Optimistic, Pessimistic, SchemaCache};
pub use decl::{Declaration, Entity, FieldDef, Hydrated, ID_FIELD, Kind, ObjectType};
pub use error::GqlError;
pub use ext::{gql_to_json_kind, json_to_gql};
pub use filter::{
	ConditionValue, FilterField, FilterKind, FilterType, Pagination, derive_filter, filter_name,
};
pub use link::Link;
pub use schema::{BuildOptions, generate_schema};
pub use tables::field_names;
pub use translate::{SkipMode, translate};
