use std::sync::LazyLock;

use crate::gql::SkipMode;

/// The publicly visible name of the binary
pub const PKG_NAME: &str = "docql";

/// The environment variable which holds the log filter directives
pub const LOG_ENV: &str = "DOCQL_LOG";

/// The log level used when neither `--log` nor `DOCQL_LOG` are set
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// How the `skip` pagination argument is applied (defaults to `order-by`)
///
/// Accepts `order-by`, `offset` or `ignore`.
pub static PAGINATION_SKIP: LazyLock<SkipMode> =
	lazy_env_parse!("DOCQL_PAGINATION_SKIP", SkipMode, SkipMode::OrderBy);

/// The version identifier of this build
pub static PKG_VERSION: LazyLock<String> =
	LazyLock::new(|| match option_env!("DOCQL_BUILD_METADATA") {
		Some(metadata) if !metadata.trim().is_empty() => {
			let version = env!("CARGO_PKG_VERSION");
			format!("{version}+{metadata}")
		}
		_ => env!("CARGO_PKG_VERSION").to_owned(),
	});
