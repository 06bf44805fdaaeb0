use async_graphql::Value as GqlValue;
use async_graphql::dynamic::{InputObject, InputValue, Scalar, TypeRef};
use serde_json::{Number, Value as JsonValue};

use super::decl::{Kind, ObjectType};
use super::error::{GqlError, resolver_error, schema_error};
use super::ext::GqlValueUtils;

pub const FILTER_SUFFIX: &str = "Filter";
pub const PAGINATION: &str = "Pagination";
pub const CONDITION: &str = "Condition";
pub const CONDITION_VALUE: &str = "ConditionValue";

pub fn filter_name(type_name: &str) -> String {
	format!("{type_name}{FILTER_SUFFIX}")
}

/// How a filter field constrains the matching source field
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum FilterKind {
	/// `[String]`: the field value must be one of the listed strings
	OneOf,
	/// `Condition`: the field is compared with an operator and a value
	Condition,
	/// The source type, unchanged: the field must equal the value
	Exact(Kind),
}

impl FilterKind {
	pub fn type_ref(&self) -> Result<TypeRef, GqlError> {
		match self {
			FilterKind::OneOf => Ok(TypeRef::named_list(TypeRef::STRING)),
			FilterKind::Condition => Ok(TypeRef::named(CONDITION)),
			FilterKind::Exact(k) => k.type_ref(),
		}
	}

	/// Whether the filter field is list typed, and so accepts membership lists
	pub fn is_list(&self) -> bool {
		matches!(self, FilterKind::OneOf | FilterKind::Exact(Kind::List(_)))
	}
}

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct FilterField {
	pub name: String,
	/// The kind of the object field this filter field was derived from
	pub source: Kind,
	pub kind: FilterKind,
}

/// The `<Name>Filter` input type derived from an object type
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct FilterType {
	pub name: String,
	pub fields: Vec<FilterField>,
}

impl FilterType {
	pub fn get(&self, name: &str) -> Option<&FilterField> {
		self.fields.iter().find(|f| f.name == name)
	}

	pub fn to_input_object(&self) -> Result<InputObject, GqlError> {
		let mut obj = InputObject::new(&self.name)
			.description(format!("Generated filter for `{}` list queries", self.base_name()));
		for f in self.fields.iter() {
			obj = obj.field(InputValue::new(&f.name, f.kind.type_ref()?));
		}
		Ok(obj)
	}

	fn base_name(&self) -> &str {
		self.name.strip_suffix(FILTER_SUFFIX).unwrap_or(&self.name)
	}
}

/// Derive the filter input type for an object type.
///
/// String fields filter by membership, float fields by condition, and every
/// other field by exact match on its own type.
pub fn derive_filter(object: &ObjectType) -> Result<FilterType, GqlError> {
	let mut fields: Vec<FilterField> = Vec::with_capacity(object.fields.len());
	for fd in object.fields.iter() {
		if fields.iter().any(|f| f.name == fd.name) {
			return Err(schema_error(format!(
				"field `{}` is declared more than once on `{}`",
				fd.name, object.name
			)));
		}
		let kind = match &fd.kind {
			Kind::String => FilterKind::OneOf,
			Kind::Float => FilterKind::Condition,
			k => {
				// Surface unsupported kinds while building, not while resolving
				k.type_ref()?;
				FilterKind::Exact(k.clone())
			}
		};
		fields.push(FilterField {
			name: fd.name.clone(),
			source: fd.kind.clone(),
			kind,
		});
	}
	Ok(FilterType {
		name: filter_name(&object.name),
		fields,
	})
}

/// The fixed pagination input shared by every list field
pub fn pagination_input() -> InputObject {
	InputObject::new(PAGINATION)
		.description("Pagination controls for list queries")
		.field(InputValue::new("skip", TypeRef::named(TypeRef::INT)))
		.field(InputValue::new("take", TypeRef::named(TypeRef::INT)))
		.field(InputValue::new("first", TypeRef::named(TypeRef::INT)))
		.field(InputValue::new("last", TypeRef::named(TypeRef::INT)))
}

/// The comparison input used to filter float fields
pub fn condition_input() -> InputObject {
	InputObject::new(CONDITION)
		.description("A comparison between a field and a value, such as `{op: \">=\", value: 2.5}`")
		.field(InputValue::new("op", TypeRef::named(TypeRef::STRING)))
		.field(InputValue::new("value", TypeRef::named(CONDITION_VALUE)))
}

pub fn condition_value_scalar() -> Scalar {
	Scalar::new(CONDITION_VALUE)
		.description("A number or a string")
		.validator(|v| matches!(v, GqlValue::Number(_) | GqlValue::String(_)))
}

/// The right hand side of a condition
#[derive(Clone, Debug, PartialEq)]
pub enum ConditionValue {
	Number(f64),
	Text(String),
}

impl ConditionValue {
	pub fn from_gql(v: &GqlValue) -> Option<Self> {
		match v {
			GqlValue::Number(n) => n.as_f64().map(ConditionValue::Number),
			GqlValue::String(s) => Some(ConditionValue::Text(s.clone())),
			_ => None,
		}
	}

	pub fn into_json(self) -> Result<JsonValue, GqlError> {
		match self {
			ConditionValue::Number(f) => Number::from_f64(f).map(JsonValue::Number).ok_or_else(|| {
				resolver_error(format!("non-finite float (not supported in json): {f}"))
			}),
			ConditionValue::Text(s) => Ok(JsonValue::String(s)),
		}
	}
}

/// Values supplied to the `pagination` argument
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Pagination {
	pub skip: Option<i64>,
	pub take: Option<i64>,
	/// Accepted, currently has no effect
	pub first: Option<i64>,
	/// Accepted, currently has no effect
	pub last: Option<i64>,
}

impl Pagination {
	pub fn from_gql(v: &GqlValue) -> Result<Self, GqlError> {
		let obj = match v {
			GqlValue::Null => return Ok(Self::default()),
			v => v.as_object().ok_or_else(|| resolver_error("Pagination should be an object"))?,
		};
		let int = |name: &str| -> Result<Option<i64>, GqlError> {
			match obj.get(name) {
				None | Some(GqlValue::Null) => Ok(None),
				Some(v) => v
					.as_i64()
					.map(Some)
					.ok_or_else(|| resolver_error(format!("Pagination `{name}` should be an integer"))),
			}
		};
		Ok(Pagination {
			skip: int("skip")?,
			take: int("take")?,
			first: int("first")?,
			last: int("last")?,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn item() -> ObjectType {
		ObjectType::new("Item")
			.field("id", Kind::Id)
			.field("name", Kind::String)
			.field("price", Kind::Float)
			.field("stock", Kind::Int)
			.field("active", Kind::Bool)
			.field("tags", Kind::List(Box::new(Kind::String)))
	}

	#[test]
	fn retypes_string_and_float_fields() {
		let filter = derive_filter(&item()).unwrap();
		assert_eq!(filter.name, "ItemFilter");
		let kinds: Vec<(&str, &FilterKind)> =
			filter.fields.iter().map(|f| (f.name.as_str(), &f.kind)).collect();
		assert_eq!(
			kinds,
			vec![
				("id", &FilterKind::Exact(Kind::Id)),
				("name", &FilterKind::OneOf),
				("price", &FilterKind::Condition),
				("stock", &FilterKind::Exact(Kind::Int)),
				("active", &FilterKind::Exact(Kind::Bool)),
				("tags", &FilterKind::Exact(Kind::List(Box::new(Kind::String)))),
			]
		);
		assert_eq!(filter.get("price").unwrap().source, Kind::Float);
		assert!(filter.get("tags").unwrap().kind.is_list());
		assert!(!filter.get("stock").unwrap().kind.is_list());
	}

	#[test]
	fn derivation_is_deterministic() {
		let ty = item();
		assert_eq!(derive_filter(&ty).unwrap(), derive_filter(&ty).unwrap());
	}

	#[test]
	fn rejects_nested_lists() {
		let ty = ObjectType::new("Grid")
			.field("cells", Kind::List(Box::new(Kind::List(Box::new(Kind::Int)))));
		assert!(matches!(derive_filter(&ty), Err(GqlError::SchemaError(_))));
	}

	#[test]
	fn rejects_repeated_fields() {
		// Types read from JSON bypass the de-duplicating builder
		let ty: ObjectType = serde_json::from_value(serde_json::json!({
			"name": "User",
			"fields": [
				{"name": "name", "kind": "string"},
				{"name": "name", "kind": "string"}
			]
		}))
		.unwrap();
		let err = derive_filter(&ty).unwrap_err();
		assert!(matches!(err, GqlError::SchemaError(_)), "{err}");
		assert!(err.to_string().contains("`name`"), "{err}");
	}

	#[test]
	fn filter_type_refs() {
		assert_eq!(FilterKind::OneOf.type_ref().unwrap().to_string(), "[String]");
		assert_eq!(FilterKind::Condition.type_ref().unwrap().to_string(), "Condition");
		assert_eq!(FilterKind::Exact(Kind::Id).type_ref().unwrap().to_string(), "ID");
	}

	#[test]
	fn pagination_from_value() {
		let v = GqlValue::from_json(serde_json::json!({"skip": 2, "take": 5})).unwrap();
		let p = Pagination::from_gql(&v).unwrap();
		assert_eq!(p.skip, Some(2));
		assert_eq!(p.take, Some(5));
		assert_eq!(p.first, None);
		assert_eq!(Pagination::from_gql(&GqlValue::Null).unwrap(), Pagination::default());
	}
}
