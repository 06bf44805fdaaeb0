use std::fmt::{self, Display};
use std::str::FromStr;

use async_graphql::Value as GqlValue;

use super::decl::Kind;
use super::error::{GqlError, resolver_error};
use super::ext::{GqlValueUtils, gql_to_json_kind};
use super::filter::{ConditionValue, FilterField, FilterKind, FilterType, Pagination};
use crate::kvs::{Constraint, Operator};

/// How the `skip` pagination argument is turned into a constraint
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum SkipMode {
	/// Order the results by the field named after the `skip` value
	#[default]
	OrderBy,
	/// Skip over `skip` results
	Offset,
	/// Leave `skip` without effect
	Ignore,
}

impl FromStr for SkipMode {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"order-by" | "orderby" | "order_by" => Ok(SkipMode::OrderBy),
			"offset" => Ok(SkipMode::Offset),
			"ignore" | "none" => Ok(SkipMode::Ignore),
			other => Err(format!("unknown skip mode: {other}")),
		}
	}
}

impl Display for SkipMode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			SkipMode::OrderBy => f.write_str("order-by"),
			SkipMode::Offset => f.write_str("offset"),
			SkipMode::Ignore => f.write_str("ignore"),
		}
	}
}

/// Translate `where` and `pagination` argument values into backend constraints.
///
/// Where-constraints come first, in the filter type's field order, followed
/// by any ordering or offset and finally the limit.
pub fn translate(
	filter: &FilterType,
	cond: Option<&GqlValue>,
	pagination: Option<&GqlValue>,
	skip: SkipMode,
) -> Result<Vec<Constraint>, GqlError> {
	let mut out = Vec::new();

	match cond {
		None | Some(GqlValue::Null) => {}
		Some(v) => {
			let obj = v.as_object().ok_or_else(|| resolver_error("Filter should be an object"))?;
			if let Some(unknown) = obj.keys().find(|k| filter.get(k.as_str()).is_none()) {
				return Err(resolver_error(format!(
					"Field `{unknown}` not found in `{}`",
					filter.name
				)));
			}
			for fd in filter.fields.iter() {
				match obj.get(fd.name.as_str()) {
					None | Some(GqlValue::Null) => continue,
					Some(val) => {
						if let Some(c) = field_constraint(fd, val)? {
							out.push(c);
						}
					}
				}
			}
		}
	}

	let pagination = match pagination {
		Some(v) => Pagination::from_gql(v)?,
		None => Pagination::default(),
	};

	match (pagination.skip, skip) {
		(None | Some(0), _) | (_, SkipMode::Ignore) => {}
		(Some(n), SkipMode::OrderBy) => out.push(Constraint::OrderBy {
			field: n.to_string(),
		}),
		(Some(n), SkipMode::Offset) => {
			let n = usize::try_from(n)
				.map_err(|_| resolver_error(format!("Pagination `skip` must not be negative: {n}")))?;
			out.push(Constraint::Offset(n));
		}
	}

	if let Some(n) = pagination.take {
		let n = usize::try_from(n)
			.map_err(|_| resolver_error(format!("Pagination `take` must not be negative: {n}")))?;
		out.push(Constraint::Limit(n));
	}

	Ok(out)
}

fn field_constraint(fd: &FilterField, val: &GqlValue) -> Result<Option<Constraint>, GqlError> {
	if fd.kind.is_list() {
		if let Some(list) = val.as_list() {
			if list.is_empty() {
				return Ok(None);
			}
			let item = match &fd.kind {
				FilterKind::Exact(Kind::List(k)) => k.as_ref().clone(),
				_ => fd.source.clone(),
			};
			let values = list
				.iter()
				.map(|v| gql_to_json_kind(v, &item))
				.collect::<Result<Vec<_>, _>>()?;
			return Ok(Some(Constraint::In {
				field: fd.name.clone(),
				values,
			}));
		}
	}

	if fd.kind == FilterKind::Condition {
		let obj = val
			.as_object()
			.ok_or_else(|| resolver_error(format!("Condition on `{}` should be an object", fd.name)))?;
		let op = obj
			.get("op")
			.and_then(GqlValueUtils::as_string)
			.ok_or_else(|| resolver_error(format!("Condition on `{}` is missing `op`", fd.name)))?;
		let op = op.parse::<Operator>().map_err(resolver_error)?;
		let value = obj
			.get("value")
			.and_then(ConditionValue::from_gql)
			.ok_or_else(|| resolver_error(format!("Condition on `{}` is missing `value`", fd.name)))?;
		return Ok(Some(Constraint::Where {
			field: fd.name.clone(),
			op,
			value: value.into_json()?,
		}));
	}

	Ok(Some(Constraint::Where {
		field: fd.name.clone(),
		op: Operator::Equal,
		value: gql_to_json_kind(val, &fd.source)?,
	}))
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;
	use crate::gql::decl::ObjectType;
	use crate::gql::filter::derive_filter;

	fn filter() -> FilterType {
		derive_filter(
			&ObjectType::new("User")
				.field("id", Kind::Id)
				.field("name", Kind::String)
				.field("score", Kind::Float)
				.field("age", Kind::Int)
				.field("tags", Kind::List(Box::new(Kind::String))),
		)
		.unwrap()
	}

	fn gql(v: serde_json::Value) -> GqlValue {
		GqlValue::from_json(v).unwrap()
	}

	#[test]
	fn string_list_becomes_membership() {
		let cond = gql(json!({"name": ["alice", "bob"]}));
		let out = translate(&filter(), Some(&cond), None, SkipMode::OrderBy).unwrap();
		assert_eq!(
			out,
			vec![Constraint::In {
				field: "name".into(),
				values: vec![json!("alice"), json!("bob")],
			}]
		);
	}

	#[test]
	fn empty_list_is_skipped() {
		let cond = gql(json!({"name": []}));
		let out = translate(&filter(), Some(&cond), None, SkipMode::OrderBy).unwrap();
		assert!(out.is_empty());
	}

	#[test]
	fn condition_becomes_comparison() {
		let cond = gql(json!({"score": {"op": ">=", "value": 2.5}}));
		let out = translate(&filter(), Some(&cond), None, SkipMode::OrderBy).unwrap();
		assert_eq!(
			out,
			vec![Constraint::Where {
				field: "score".into(),
				op: Operator::MoreThanOrEqual,
				value: json!(2.5),
			}]
		);

		let cond = gql(json!({"score": {"op": "==", "value": "n/a"}}));
		let out = translate(&filter(), Some(&cond), None, SkipMode::OrderBy).unwrap();
		assert_eq!(
			out,
			vec![Constraint::Where {
				field: "score".into(),
				op: Operator::Equal,
				value: json!("n/a"),
			}]
		);
	}

	#[test]
	fn malformed_condition_is_an_error() {
		let cond = gql(json!({"age": 3, "score": {"value": 2.5}}));
		let err = translate(&filter(), Some(&cond), None, SkipMode::OrderBy).unwrap_err();
		assert!(err.to_string().contains("missing `op`"), "{err}");

		let cond = gql(json!({"score": {"op": "~", "value": 2.5}}));
		let err = translate(&filter(), Some(&cond), None, SkipMode::OrderBy).unwrap_err();
		assert!(err.to_string().contains("Unsupported op"), "{err}");
	}

	#[test]
	fn other_fields_fall_back_to_equality() {
		let cond = gql(json!({"age": 30, "id": "u1"}));
		let out = translate(&filter(), Some(&cond), None, SkipMode::OrderBy).unwrap();
		assert_eq!(
			out,
			vec![
				Constraint::Where {
					field: "id".into(),
					op: Operator::Equal,
					value: json!("u1"),
				},
				Constraint::Where {
					field: "age".into(),
					op: Operator::Equal,
					value: json!(30),
				},
			]
		);
	}

	#[test]
	fn pass_through_list_uses_membership() {
		let cond = gql(json!({"tags": ["admin"]}));
		let out = translate(&filter(), Some(&cond), None, SkipMode::OrderBy).unwrap();
		assert_eq!(
			out,
			vec![Constraint::In {
				field: "tags".into(),
				values: vec![json!("admin")],
			}]
		);
	}

	#[test]
	fn constraint_order_follows_filter_fields() {
		let cond = gql(json!({
			"age": 30,
			"score": {"op": "<", "value": 9},
			"name": ["carol"],
		}));
		let pagination = gql(json!({"skip": 2, "take": 10}));
		let out = translate(&filter(), Some(&cond), Some(&pagination), SkipMode::OrderBy).unwrap();
		let fields: Vec<String> = out.iter().map(ToString::to_string).collect();
		assert_eq!(
			fields,
			vec![
				r#"WHERE name in ["carol"]"#,
				"WHERE score < 9.0",
				"WHERE age == 30",
				"ORDER BY 2",
				"LIMIT 10",
			]
		);
	}

	#[test]
	fn skip_modes() {
		let pagination = gql(json!({"skip": 4, "take": 1, "first": 3}));
		let out = translate(&filter(), None, Some(&pagination), SkipMode::Offset).unwrap();
		assert_eq!(out, vec![Constraint::Offset(4), Constraint::Limit(1)]);
		let out = translate(&filter(), None, Some(&pagination), SkipMode::Ignore).unwrap();
		assert_eq!(out, vec![Constraint::Limit(1)]);

		let zero = gql(json!({"skip": 0}));
		let out = translate(&filter(), None, Some(&zero), SkipMode::OrderBy).unwrap();
		assert!(out.is_empty());

		assert_eq!("offset".parse::<SkipMode>(), Ok(SkipMode::Offset));
		assert_eq!(SkipMode::OrderBy.to_string(), "order-by");
	}

	#[test]
	fn rejects_negative_take_and_unknown_fields() {
		let pagination = gql(json!({"take": -1}));
		assert!(translate(&filter(), None, Some(&pagination), SkipMode::OrderBy).is_err());

		let cond = gql(json!({"nickname": ["x"]}));
		let err = translate(&filter(), Some(&cond), None, SkipMode::OrderBy).unwrap_err();
		assert!(err.to_string().contains("nickname"), "{err}");
	}

	#[test]
	fn mistyped_equality_value_is_a_type_error() {
		let cond = gql(json!({"age": "thirty"}));
		let err = translate(&filter(), Some(&cond), None, SkipMode::OrderBy).unwrap_err();
		assert!(matches!(err, GqlError::TypeError { target: Kind::Int, .. }), "{err}");
	}
}
