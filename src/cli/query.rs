use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use async_graphql::{Request, Variables};
use clap::Args;
use futures::StreamExt;

use super::files::{load_declarations, load_store};
use crate::gql::Link;

#[derive(Args, Debug)]
pub struct QueryCommandArguments {
	#[arg(help = "Path to the JSON file declaring the object types")]
	#[arg(short = 't', long = "types")]
	types: PathBuf,
	#[arg(help = "Path to a JSON file of `{collection: {key: record}}` to load into the store")]
	#[arg(short = 'd', long = "data")]
	data: Option<PathBuf>,
	#[arg(help = "Variables for the operation, as a JSON object")]
	#[arg(long = "variables")]
	variables: Option<String>,
	#[arg(help = "The name of the operation to execute")]
	#[arg(short = 'o', long = "operation")]
	operation: Option<String>,
	#[arg(help = "The GraphQL document to execute")]
	#[arg(index = 1)]
	query: String,
}

pub async fn init(
	QueryCommandArguments {
		types,
		data,
		variables,
		operation,
		query,
	}: QueryCommandArguments,
) -> Result<()> {
	let decls = load_declarations(&types).await?;
	let store = load_store(data.as_deref()).await?;
	let link: Link = Link::new(Arc::new(store), decls);

	let mut request = Request::new(query);
	if let Some(vars) = variables {
		let vars: serde_json::Value =
			serde_json::from_str(&vars).context("Unable to parse the operation variables")?;
		if !vars.is_object() {
			bail!("The operation variables must be a JSON object");
		}
		request = request.variables(Variables::from_json(vars));
	}
	if let Some(name) = operation {
		request = request.operation_name(name);
	}

	let mut events = link.execute(request);
	while let Some(event) = events.next().await {
		let response = event?;
		println!("{}", serde_json::to_string_pretty(&response)?);
	}
	Ok(())
}
