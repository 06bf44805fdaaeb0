use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Args;

use super::files::load_declarations;
use crate::gql::{BuildOptions, generate_schema};
use crate::kvs::DocumentStore;
use crate::kvs::mem::MemStore;

#[derive(Args, Debug)]
pub struct SdlCommandArguments {
	#[arg(help = "Path to the JSON file declaring the object types")]
	#[arg(short = 't', long = "types")]
	types: PathBuf,
}

pub async fn init(
	SdlCommandArguments {
		types,
	}: SdlCommandArguments,
) -> Result<()> {
	let decls = load_declarations(&types).await?;
	let store: Arc<dyn DocumentStore> = Arc::new(MemStore::new());
	let schema = generate_schema(&store, &decls, &BuildOptions::from_env())?;
	println!("{}", schema.sdl());
	Ok(())
}
