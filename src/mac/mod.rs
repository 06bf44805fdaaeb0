/// Lazily parse a value from an environment variable, falling back to
/// `$default` when the variable is unset or does not parse as `$t`.
macro_rules! lazy_env_parse {
	($key:expr, $t:ty, $default:expr) => {
		std::sync::LazyLock::new(|| {
			std::env::var($key).ok().and_then(|s| s.parse::<$t>().ok()).unwrap_or($default)
		})
	};
}
