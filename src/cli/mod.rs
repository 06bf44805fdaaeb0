mod files;
mod query;
mod sdl;

use std::process::ExitCode;

use clap::{Parser, Subcommand};

use crate::cnf::{DEFAULT_LOG_LEVEL, LOG_ENV, PKG_NAME, PKG_VERSION};
use crate::telemetry;

const INFO: &str = "
Generate GraphQL schemas for document collections, and query them.

A types file declares the object types to generate, as a JSON array:

  [{\"name\": \"User\", \"fields\": [{\"name\": \"id\", \"kind\": \"id\"}]}]
";

#[derive(Parser, Debug)]
#[command(name = "docql command-line interface", bin_name = PKG_NAME)]
#[command(about = INFO, before_help = "")]
#[command(version = PKG_VERSION.as_str())]
#[command(arg_required_else_help = true)]
struct Cli {
	#[arg(help = "The logging level for the command-line tool")]
	#[arg(env = LOG_ENV, short = 'l', long = "log")]
	#[arg(default_value = DEFAULT_LOG_LEVEL)]
	#[arg(value_parser = log_valid)]
	#[arg(global = true)]
	log: String,
	#[command(subcommand)]
	command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
	#[command(about = "Print the schema generated for a types file")]
	Sdl(sdl::SdlCommandArguments),
	#[command(about = "Execute a GraphQL operation against an in-memory store")]
	Query(query::QueryCommandArguments),
}

fn log_valid(v: &str) -> Result<String, String> {
	telemetry::filter_from_value(v)
		.map(|_| v.to_owned())
		.map_err(|e| format!("Provide a valid log filter configuration string: {e}"))
}

pub async fn init() -> ExitCode {
	let args = Cli::parse();
	// Initialize logging
	if let Err(e) = telemetry::builder().with_log_level(&args.log).init() {
		eprintln!("Failed to initialize logging: {e}");
		return ExitCode::FAILURE;
	}
	// Run the chosen command
	let output = match args.command {
		Commands::Sdl(args) => sdl::init(args).await,
		Commands::Query(args) => query::init(args).await,
	};
	if let Err(e) = output {
		error!("{e:#}");
		ExitCode::FAILURE
	} else {
		ExitCode::SUCCESS
	}
}
