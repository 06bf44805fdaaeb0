use std::env;
use std::process::Command;

use semver::BuildMetadata;

const BUILD_METADATA: &str = "DOCQL_BUILD_METADATA";

fn main() {
	println!("cargo:rerun-if-env-changed={BUILD_METADATA}");
	println!("cargo:rerun-if-changed=src");
	println!("cargo:rerun-if-changed=build.rs");
	println!("cargo:rerun-if-changed=Cargo.toml");
	if let Some(metadata) = build_metadata() {
		println!("cargo:rustc-env={BUILD_METADATA}={metadata}");
	}
}

fn build_metadata() -> Option<String> {
	if let Ok(input) = env::var(BUILD_METADATA) {
		let metadata = input.trim();
		if let Err(error) = BuildMetadata::new(metadata) {
			panic!("invalid build metadata `{input}`: {error}");
		}
		return Some(metadata.to_owned());
	}
	let rev = Command::new("git").args(["rev-parse", "--short", "HEAD"]).output().ok()?;
	if !rev.status.success() {
		return None;
	}
	let rev = String::from_utf8(rev.stdout).ok()?;
	let rev = rev.trim();
	if rev.is_empty() {
		return None;
	}
	Some(rev.to_owned())
}
