use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
	docql::cli::init().await
}
