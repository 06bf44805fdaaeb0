use std::path::Path;

use anyhow::{Context, Result};

use crate::gql::{Declaration, ObjectType};
use crate::kvs::mem::{Collections, MemStore};

/// Read a types file into dynamic declarations
pub(super) async fn load_declarations(path: &Path) -> Result<Vec<Declaration>> {
	let raw = tokio::fs::read_to_string(path)
		.await
		.with_context(|| format!("Unable to read types file `{}`", path.display()))?;
	let types = parse_types(&raw)
		.with_context(|| format!("Unable to parse types file `{}`", path.display()))?;
	debug!(types = types.len(), "loaded type declarations");
	Ok(types.into_iter().map(Declaration::dynamic).collect())
}

/// Read a data file into an in-memory store, or start with an empty one
pub(super) async fn load_store(path: Option<&Path>) -> Result<MemStore> {
	let Some(path) = path else {
		return Ok(MemStore::new());
	};
	let raw = tokio::fs::read_to_string(path)
		.await
		.with_context(|| format!("Unable to read data file `{}`", path.display()))?;
	let data: Collections = serde_json::from_str(&raw)
		.with_context(|| format!("Unable to parse data file `{}`", path.display()))?;
	debug!(collections = data.len(), "loaded data file");
	Ok(MemStore::with_data(data))
}

fn parse_types(raw: &str) -> Result<Vec<ObjectType>> {
	Ok(serde_json::from_str(raw)?)
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use super::*;
	use crate::gql::{BuildOptions, GqlError, Kind, generate_schema};
	use crate::kvs::DocumentStore;

	#[test]
	fn parses_types_file() {
		let types = parse_types(
			r#"[{"name": "User", "fields": [
				{"name": "id", "kind": "id"},
				{"name": "tags", "kind": {"list": "string"}}
			]}]"#,
		)
		.unwrap();
		assert_eq!(types.len(), 1);
		assert_eq!(types[0].get("tags"), Some(&Kind::List(Box::new(Kind::String))));
		assert!(parse_types(r#"{"name": "User"}"#).is_err());
	}

	#[tokio::test]
	async fn repeated_fields_in_types_file_fail_the_build() {
		let path = std::env::temp_dir().join(format!("docql-types-{}.json", std::process::id()));
		tokio::fs::write(
			&path,
			r#"[{"name": "User", "fields": [
				{"name": "name", "kind": "string"},
				{"name": "name", "kind": "int"}
			]}]"#,
		)
		.await
		.unwrap();
		let decls = load_declarations(&path).await;
		tokio::fs::remove_file(&path).await.unwrap();

		let store: Arc<dyn DocumentStore> = Arc::new(MemStore::new());
		let err = generate_schema(&store, &decls.unwrap(), &BuildOptions::default()).unwrap_err();
		assert!(matches!(err, GqlError::SchemaError(_)), "{err}");
	}

	#[tokio::test]
	async fn missing_types_file_names_the_path() {
		let err = load_declarations(Path::new("/nonexistent/docql/types.json")).await.unwrap_err();
		assert!(err.to_string().contains("/nonexistent/docql/types.json"), "{err}");
	}
}
