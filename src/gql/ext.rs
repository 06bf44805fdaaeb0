use async_graphql::dynamic::indexmap::IndexMap;
use async_graphql::{Name, Value as GqlValue};
use serde_json::Value as JsonValue;

use super::decl::Kind;
use super::error::{GqlError, internal_error, type_error};

pub(crate) trait GqlValueUtils {
	fn as_i64(&self) -> Option<i64>;
	fn as_string(&self) -> Option<String>;
	fn as_list(&self) -> Option<&Vec<GqlValue>>;
	fn as_object(&self) -> Option<&IndexMap<Name, GqlValue>>;
}

impl GqlValueUtils for GqlValue {
	fn as_i64(&self) -> Option<i64> {
		if let GqlValue::Number(n) = self {
			n.as_i64()
		} else {
			None
		}
	}

	fn as_string(&self) -> Option<String> {
		match self {
			GqlValue::String(s) => Some(s.to_owned()),
			GqlValue::Enum(s) => Some(s.to_string()),
			_ => None,
		}
	}

	fn as_list(&self) -> Option<&Vec<GqlValue>> {
		if let GqlValue::List(a) = self {
			Some(a)
		} else {
			None
		}
	}

	fn as_object(&self) -> Option<&IndexMap<Name, GqlValue>> {
		if let GqlValue::Object(o) = self {
			Some(o)
		} else {
			None
		}
	}
}

/// Convert a GraphQL input value into a stored value, checking it against the field kind
pub fn gql_to_json_kind(val: &GqlValue, kind: &Kind) -> Result<JsonValue, GqlError> {
	let out = match (kind, val) {
		(_, GqlValue::Null) => JsonValue::Null,
		(Kind::List(k), GqlValue::List(l)) => JsonValue::Array(
			l.iter().map(|v| gql_to_json_kind(v, k)).collect::<Result<Vec<_>, _>>()?,
		),
		// ID inputs arrive as strings, even when written as integer literals
		(Kind::Id, GqlValue::Number(n)) => JsonValue::String(n.to_string()),
		(_, GqlValue::Enum(e)) => JsonValue::String(e.to_string()),
		(_, v) => v.clone().into_json().map_err(|e| internal_error(e.to_string()))?,
	};
	if out.is_null() || kind.check(&out) {
		Ok(out)
	} else {
		Err(type_error(kind, &out))
	}
}

/// Convert a stored value into a GraphQL output value
pub fn json_to_gql(val: &JsonValue) -> Result<GqlValue, GqlError> {
	GqlValue::from_json(val.clone()).map_err(|e| internal_error(e.to_string()))
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn converts_checked_inputs() {
		let v = GqlValue::List(vec![GqlValue::from(1), GqlValue::Null]);
		let out = gql_to_json_kind(&v, &Kind::List(Box::new(Kind::Int))).unwrap();
		assert_eq!(out, json!([1, null]));

		let out = gql_to_json_kind(&GqlValue::from(7), &Kind::Id).unwrap();
		assert_eq!(out, json!("7"));

		let err = gql_to_json_kind(&GqlValue::from("x"), &Kind::Bool).unwrap_err();
		assert!(matches!(err, GqlError::TypeError { .. }));
	}

	#[test]
	fn converts_outputs() {
		let out = json_to_gql(&json!({"a": [1, "b", null]})).unwrap();
		assert_eq!(out.into_json().unwrap(), json!({"a": [1, "b", null]}));
	}
}
