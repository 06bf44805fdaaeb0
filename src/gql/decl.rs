use std::any::{Any, TypeId, type_name};
use std::fmt::{self, Display};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use async_graphql::dynamic::TypeRef;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::{GqlError, internal_error, resolver_error, schema_error, type_error};
use crate::kvs::Record;

/// The field key which always carries a document's identifier
pub const ID_FIELD: &str = "id";

/// The declared type of a single object field
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
	Id,
	String,
	Int,
	Float,
	Bool,
	/// A list of scalars, nested lists are rejected when building
	List(Box<Kind>),
}

impl Kind {
	/// The name of the GraphQL scalar backing a non-list kind
	fn scalar_name(&self) -> Option<&'static str> {
		match self {
			Kind::Id => Some(TypeRef::ID),
			Kind::String => Some(TypeRef::STRING),
			Kind::Int => Some(TypeRef::INT),
			Kind::Float => Some(TypeRef::FLOAT),
			Kind::Bool => Some(TypeRef::BOOLEAN),
			Kind::List(_) => None,
		}
	}

	/// The nullable GraphQL type used for this kind, in inputs and outputs alike
	pub fn type_ref(&self) -> Result<TypeRef, GqlError> {
		match self {
			Kind::List(inner) => match inner.scalar_name() {
				Some(name) => Ok(TypeRef::named_list(name)),
				None => Err(schema_error(format!("Kind {self} is not supported: nested lists"))),
			},
			k => Ok(TypeRef::named(k.scalar_name().unwrap_or(TypeRef::STRING))),
		}
	}

	/// Check a stored or supplied value against this kind. `null` items are
	/// accepted inside lists, as every list item type is nullable.
	pub fn check(&self, v: &Value) -> bool {
		match (self, v) {
			(Kind::Id, Value::String(_)) => true,
			(Kind::Id, Value::Number(n)) => n.is_i64() || n.is_u64(),
			(Kind::String, Value::String(_)) => true,
			(Kind::Int, Value::Number(n)) => n.is_i64() || n.is_u64(),
			(Kind::Float, Value::Number(_)) => true,
			(Kind::Bool, Value::Bool(_)) => true,
			(Kind::List(k), Value::Array(a)) => a.iter().all(|i| i.is_null() || k.check(i)),
			_ => false,
		}
	}
}

impl Display for Kind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Kind::List(k) => write!(f, "[{k}]"),
			k => f.write_str(k.scalar_name().unwrap_or_default()),
		}
	}
}

#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
	pub name: String,
	pub kind: Kind,
}

/// A named entity shape with an ordered set of fields
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct ObjectType {
	pub name: String,
	#[serde(default)]
	pub fields: Vec<FieldDef>,
}

impl ObjectType {
	pub fn new(name: impl Into<String>) -> Self {
		ObjectType {
			name: name.into(),
			fields: Vec::new(),
		}
	}

	/// Append a field. A field which is already declared is replaced in place.
	pub fn field(mut self, name: impl Into<String>, kind: Kind) -> Self {
		let name = name.into();
		match self.fields.iter_mut().find(|f| f.name == name) {
			Some(f) => f.kind = kind,
			None => self.fields.push(FieldDef {
				name,
				kind,
			}),
		}
		self
	}

	pub fn get(&self, name: &str) -> Option<&Kind> {
		self.fields.iter().find(|f| f.name == name).map(|f| &f.kind)
	}
}

/// Types which records can be hydrated into
pub trait Entity: Serialize + DeserializeOwned + Send + Sync + 'static {}

impl<T> Entity for T where T: Serialize + DeserializeOwned + Send + Sync + 'static {}

type Hydrator = fn(Record) -> Result<Hydrated, GqlError>;

/// Pairs an object type with the Rust type its records hydrate into
#[derive(Clone)]
pub struct Declaration {
	object: ObjectType,
	entity: TypeId,
	entity_name: &'static str,
	hydrator: Hydrator,
}

impl Declaration {
	/// Declare an object type whose records deserialize into `T`
	pub fn new<T: Entity>(object: ObjectType) -> Self {
		Declaration {
			object,
			entity: TypeId::of::<T>(),
			entity_name: type_name::<T>(),
			hydrator: hydrate_into::<T>,
		}
	}

	/// Declare an object type whose records stay untyped field maps
	pub fn dynamic(object: ObjectType) -> Self {
		Self::new::<Record>(object)
	}

	pub fn object(&self) -> &ObjectType {
		&self.object
	}

	pub fn name(&self) -> &str {
		&self.object.name
	}

	/// Turn a raw backend record into an entity.
	///
	/// When a key is given and the record holds no identifier of its own, the
	/// key is written to the `id` field before anything is deserialized.
	pub fn hydrate(&self, key: Option<&str>, mut record: Record) -> Result<Hydrated, GqlError> {
		if let Some(key) = key {
			if record.get(ID_FIELD).is_none_or(Value::is_null) {
				record.insert(ID_FIELD.to_owned(), Value::String(key.to_owned()));
			}
		}
		for f in self.object.fields.iter() {
			match record.get(&f.name) {
				Some(v) if !v.is_null() && !f.kind.check(v) => return Err(type_error(&f.kind, v)),
				_ => {}
			}
		}
		(self.hydrator)(record)
	}
}

impl fmt::Debug for Declaration {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Declaration")
			.field("object", &self.object)
			.field("entity", &self.entity_name)
			.finish()
	}
}

impl Hash for Declaration {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.object.hash(state);
		self.entity.hash(state);
	}
}

fn hydrate_into<T: Entity>(record: Record) -> Result<Hydrated, GqlError> {
	let entity: T = serde_json::from_value(Value::Object(record))
		.map_err(|e| resolver_error(format!("failed to hydrate `{}`: {e}", type_name::<T>())))?;
	let view = match serde_json::to_value(&entity) {
		Ok(Value::Object(o)) => o,
		Ok(v) => {
			return Err(internal_error(format!(
				"`{}` must serialize to an object, found: {v}",
				type_name::<T>()
			)));
		}
		Err(e) => return Err(internal_error(e.to_string())),
	};
	Ok(Hydrated {
		entity: Arc::new(entity),
		view,
	})
}

/// A hydrated entity, along with the field map used to resolve its fields
#[derive(Clone)]
pub struct Hydrated {
	entity: Arc<dyn Any + Send + Sync>,
	view: Record,
}

impl Hydrated {
	/// Typed access to the hydrated instance
	pub fn entity<T: 'static>(&self) -> Option<&T> {
		self.entity.downcast_ref()
	}

	pub fn get(&self, field: &str) -> Option<&Value> {
		self.view.get(field)
	}
}

impl fmt::Debug for Hydrated {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Hydrated").field(&self.view).finish()
	}
}
