use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A comparison operator which can be applied in a `where` constraint
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum Operator {
	#[serde(rename = "==")]
	Equal,
	#[serde(rename = "!=")]
	NotEqual,
	#[serde(rename = "<")]
	LessThan,
	#[serde(rename = "<=")]
	LessThanOrEqual,
	#[serde(rename = ">")]
	MoreThan,
	#[serde(rename = ">=")]
	MoreThanOrEqual,
	#[serde(rename = "array-contains")]
	Contains,
}

impl Operator {
	pub fn as_str(&self) -> &'static str {
		match self {
			Operator::Equal => "==",
			Operator::NotEqual => "!=",
			Operator::LessThan => "<",
			Operator::LessThanOrEqual => "<=",
			Operator::MoreThan => ">",
			Operator::MoreThanOrEqual => ">=",
			Operator::Contains => "array-contains",
		}
	}
}

impl Display for Operator {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Operator {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"==" | "eq" => Ok(Operator::Equal),
			"!=" | "ne" => Ok(Operator::NotEqual),
			"<" | "lt" => Ok(Operator::LessThan),
			"<=" | "lte" => Ok(Operator::LessThanOrEqual),
			">" | "gt" => Ok(Operator::MoreThan),
			">=" | "gte" => Ok(Operator::MoreThanOrEqual),
			"array-contains" | "contains" => Ok(Operator::Contains),
			op => Err(format!("Unsupported op: {op}")),
		}
	}
}

/// A single condition, ordering or limit applied to a collection query.
///
/// Backends must apply the constraints in list order. The translator always
/// emits every `Where`/`In` before any `OrderBy`, `Offset` or `Limit`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Constraint {
	/// `field <op> value`
	Where {
		field: String,
		op: Operator,
		value: Value,
	},
	/// `field in [values]`
	In {
		field: String,
		values: Vec<Value>,
	},
	/// Order the results ascending by `field`
	OrderBy {
		field: String,
	},
	/// Skip the first `n` results
	Offset(usize),
	/// Return at most `n` results
	Limit(usize),
}

impl Display for Constraint {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Constraint::Where {
				field,
				op,
				value,
			} => write!(f, "WHERE {field} {op} {value}"),
			Constraint::In {
				field,
				values,
			} => {
				write!(f, "WHERE {field} in [")?;
				for (i, v) in values.iter().enumerate() {
					if i > 0 {
						f.write_str(", ")?;
					}
					write!(f, "{v}")?;
				}
				f.write_str("]")
			}
			Constraint::OrderBy {
				field,
			} => write!(f, "ORDER BY {field}"),
			Constraint::Offset(n) => write!(f, "OFFSET {n}"),
			Constraint::Limit(n) => write!(f, "LIMIT {n}"),
		}
	}
}
