//! # docql
//!
//! Dynamic GraphQL schemas over a document store.
//!
//! A caller declares a list of object types, each paired with the Rust type
//! its records hydrate into. From that list this crate generates, at call time,
//! a complete `async_graphql` dynamic schema: one object type, one derived
//! `<Name>Filter` input type, a `name(id: ID)` lookup field and a
//! `names(where:, pagination:)` list field per declaration. Resolvers translate
//! the filter and pagination arguments into ordered backend constraints and
//! run them against any [`kvs::DocumentStore`].
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use docql::gql::{Declaration, Kind, Link, ObjectType};
//! use docql::kvs::mem::MemStore;
//!
//! # async fn run() {
//! let user = ObjectType::new("User").field("id", Kind::Id).field("name", Kind::String);
//! let link: Link = Link::new(Arc::new(MemStore::new()), vec![Declaration::dynamic(user)]);
//! let _events = link.execute("{ users { id name } }");
//! # }
//! ```

#[macro_use]
extern crate tracing;

#[macro_use]
mod mac;

pub mod cli;
pub mod cnf;
pub mod err;
pub mod gql;
pub mod kvs;
pub mod telemetry;
