//! An in-memory [`DocumentStore`], used by the command line and the tests.
//!
//! Constraint evaluation mirrors what a hosted document store does with the
//! same query: filters only ever match documents which hold the field,
//! ordering drops documents missing the order field, and values of different
//! types never compare as equal or ordered.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde_json::Value;
use tokio::sync::RwLock;

use super::{Constraint, Document, DocumentStore, Operator, Record};
use crate::err::Error;

pub type Collections = BTreeMap<String, BTreeMap<String, Record>>;

#[derive(Debug, Default)]
pub struct MemStore {
	collections: RwLock<Collections>,
}

impl MemStore {
	/// Create a new empty store
	pub fn new() -> Self {
		Self::default()
	}

	/// Create a store pre-populated with `collection -> key -> record` data
	pub fn with_data(data: Collections) -> Self {
		MemStore {
			collections: RwLock::new(data),
		}
	}

	/// Insert or replace the record at `key` in `collection`
	pub async fn set(&self, collection: impl Into<String>, key: impl Into<String>, record: Record) {
		let mut guard = self.collections.write().await;
		guard.entry(collection.into()).or_default().insert(key.into(), record);
	}
}

#[async_trait::async_trait]
impl DocumentStore for MemStore {
	async fn get(&self, collection: &str, key: &str) -> Result<Option<Record>, Error> {
		let guard = self.collections.read().await;
		Ok(guard.get(collection).and_then(|c| c.get(key)).cloned())
	}

	#[instrument(level = "trace", target = "docql::kvs::mem", skip(self, constraints))]
	async fn query(
		&self,
		collection: &str,
		constraints: &[Constraint],
	) -> Result<Vec<Document>, Error> {
		let guard = self.collections.read().await;
		let Some(docs) = guard.get(collection) else {
			return Ok(Vec::new());
		};
		evaluate(docs, constraints)
	}
}

fn evaluate(
	docs: &BTreeMap<String, Record>,
	constraints: &[Constraint],
) -> Result<Vec<Document>, Error> {
	let mut orders = Vec::new();
	let mut start = 0;
	let mut limit = None;
	for c in constraints {
		match c {
			Constraint::In {
				field,
				values,
			} if values.is_empty() => {
				return Err(Error::InvalidConstraint(format!(
					"`in` filter on `{field}` requires a non-empty list"
				)));
			}
			Constraint::OrderBy {
				field,
			} => orders.push(field.as_str()),
			Constraint::Offset(n) => start = *n,
			Constraint::Limit(n) => limit = Some(*n),
			_ => {}
		}
	}

	let mut out: Vec<Document> = docs
		.iter()
		.filter(|(_, data)| constraints.iter().all(|c| matches(data, c)))
		.filter(|(_, data)| orders.iter().all(|f| data.contains_key(*f)))
		.map(|(key, data)| Document::new(key.clone(), data.clone()))
		.collect();

	if !orders.is_empty() {
		out.sort_by(|a, b| {
			orders
				.iter()
				.map(|f| total_cmp(&a.data[*f], &b.data[*f]))
				.find(|o| o.is_ne())
				.unwrap_or(Ordering::Equal)
		});
	}

	let out = out.into_iter().skip(start);
	Ok(match limit {
		Some(n) => out.take(n).collect(),
		None => out.collect(),
	})
}

fn matches(data: &Record, constraint: &Constraint) -> bool {
	match constraint {
		Constraint::Where {
			field,
			op,
			value,
		} => {
			let Some(v) = data.get(field) else {
				return false;
			};
			match op {
				Operator::Equal => equal(v, value),
				Operator::NotEqual => !equal(v, value),
				Operator::LessThan => compare(v, value) == Some(Ordering::Less),
				Operator::LessThanOrEqual => {
					matches!(compare(v, value), Some(Ordering::Less | Ordering::Equal))
				}
				Operator::MoreThan => compare(v, value) == Some(Ordering::Greater),
				Operator::MoreThanOrEqual => {
					matches!(compare(v, value), Some(Ordering::Greater | Ordering::Equal))
				}
				Operator::Contains => match v {
					Value::Array(a) => a.iter().any(|i| equal(i, value)),
					_ => false,
				},
			}
		}
		Constraint::In {
			field,
			values,
		} => data.get(field).is_some_and(|v| values.iter().any(|i| equal(v, i))),
		_ => true,
	}
}

fn equal(a: &Value, b: &Value) -> bool {
	match (a, b) {
		(Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
		_ => a == b,
	}
}

fn compare(a: &Value, b: &Value) -> Option<Ordering> {
	match (a, b) {
		(Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
		(Value::String(x), Value::String(y)) => Some(x.cmp(y)),
		(Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
		_ => None,
	}
}

// Mixed types order by type first: null, bool, number, string, array, object
fn total_cmp(a: &Value, b: &Value) -> Ordering {
	fn rank(v: &Value) -> u8 {
		match v {
			Value::Null => 0,
			Value::Bool(_) => 1,
			Value::Number(_) => 2,
			Value::String(_) => 3,
			Value::Array(_) => 4,
			Value::Object(_) => 5,
		}
	}
	compare(a, b).unwrap_or_else(|| rank(a).cmp(&rank(b)))
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	fn record(v: Value) -> Record {
		match v {
			Value::Object(o) => o,
			_ => unreachable!(),
		}
	}

	async fn people() -> MemStore {
		let ds = MemStore::new();
		ds.set("Person", "1", record(json!({"name": "alice", "age": 31, "score": 4.5}))).await;
		ds.set("Person", "2", record(json!({"name": "carol", "age": 25, "score": 2.0}))).await;
		ds.set("Person", "3", record(json!({"name": "bob", "age": 40}))).await;
		ds
	}

	fn keys(docs: &[Document]) -> Vec<&str> {
		docs.iter().map(|d| d.key.as_str()).collect()
	}

	#[tokio::test]
	async fn get_missing_collection_and_key() {
		let ds = people().await;
		assert_eq!(ds.get("Nobody", "1").await.unwrap(), None);
		assert_eq!(ds.get("Person", "x").await.unwrap(), None);
		let alice = ds.get("Person", "1").await.unwrap().unwrap();
		assert_eq!(alice["name"], json!("alice"));
	}

	#[tokio::test]
	async fn query_in_and_comparisons() {
		let ds = people().await;
		let res = ds
			.query(
				"Person",
				&[Constraint::In {
					field: "name".into(),
					values: vec![json!("alice"), json!("bob")],
				}],
			)
			.await
			.unwrap();
		assert_eq!(keys(&res), ["1", "3"]);

		let res = ds
			.query(
				"Person",
				&[Constraint::Where {
					field: "score".into(),
					op: Operator::MoreThan,
					value: json!(3),
				}],
			)
			.await
			.unwrap();
		assert_eq!(keys(&res), ["1"]);

		// Documents without the field never match, not even `!=`
		let res = ds
			.query(
				"Person",
				&[Constraint::Where {
					field: "score".into(),
					op: Operator::NotEqual,
					value: json!(4.5),
				}],
			)
			.await
			.unwrap();
		assert_eq!(keys(&res), ["2"]);
	}

	#[tokio::test]
	async fn query_order_offset_limit() {
		let ds = people().await;
		let res = ds
			.query(
				"Person",
				&[
					Constraint::OrderBy {
						field: "age".into(),
					},
					Constraint::Limit(2),
				],
			)
			.await
			.unwrap();
		assert_eq!(keys(&res), ["2", "1"]);

		let res = ds
			.query(
				"Person",
				&[
					Constraint::OrderBy {
						field: "score".into(),
					},
					Constraint::Offset(1),
				],
			)
			.await
			.unwrap();
		// bob has no score and is dropped by the ordering
		assert_eq!(keys(&res), ["1"]);
	}

	#[tokio::test]
	async fn query_rejects_empty_in() {
		let ds = people().await;
		let res = ds
			.query(
				"Person",
				&[Constraint::In {
					field: "name".into(),
					values: vec![],
				}],
			)
			.await;
		assert!(matches!(res, Err(Error::InvalidConstraint(_))));
	}

	#[tokio::test]
	async fn numbers_compare_across_int_and_float() {
		let ds = people().await;
		let res = ds
			.query(
				"Person",
				&[Constraint::Where {
					field: "score".into(),
					op: Operator::Equal,
					value: json!(2),
				}],
			)
			.await
			.unwrap();
		assert_eq!(keys(&res), ["2"]);
	}
}
