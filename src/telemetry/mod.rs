use tracing::Subscriber;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::prelude::*;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};

use crate::cnf::{DEFAULT_LOG_LEVEL, PKG_NAME};

#[derive(Default, Debug)]
pub struct Builder {
	log_level: Option<String>,
	filter: Option<EnvFilter>,
}

pub fn builder() -> Builder {
	Builder::default()
}

impl Builder {
	/// Set the log level on the builder
	pub fn with_log_level(mut self, log_level: &str) -> Self {
		self.log_level = Some(log_level.to_string());
		self
	}

	/// Set the filter on the builder, taking precedence over the log level
	pub fn with_filter(mut self, filter: EnvFilter) -> Self {
		self.filter = Some(filter);
		self
	}

	/// Build a tracing dispatcher with the fmt subscriber (logs)
	pub fn build(self) -> Box<dyn Subscriber + Send + Sync + 'static> {
		let filter = match (self.filter, self.log_level) {
			(Some(filter), _) => filter,
			(None, Some(level)) => {
				filter_from_value(&level).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL))
			}
			(None, None) => EnvFilter::new(DEFAULT_LOG_LEVEL),
		};
		let layer = tracing_subscriber::fmt::layer()
			.compact()
			.with_ansi(true)
			.with_target(true)
			.with_file(cfg!(debug_assertions))
			.with_line_number(cfg!(debug_assertions))
			.with_span_events(FmtSpan::NONE)
			.with_writer(std::io::stderr)
			.with_filter(filter);
		Box::new(tracing_subscriber::registry().with(layer))
	}

	/// Install the tracing pipeline as the global default
	pub fn init(self) -> Result<(), TryInitError> {
		self.build().try_init()
	}
}

/// Turn a `--log` value into a filter.
///
/// The plain levels apply to this crate only, `full` applies the trace level
/// everywhere, `none` disables logging, and anything else is read as a list of
/// filter directives.
pub fn filter_from_value(v: &str) -> Result<EnvFilter, ParseError> {
	match v {
		"none" => Ok(EnvFilter::new("off")),
		"full" => Ok(EnvFilter::new("trace")),
		"error" | "warn" | "info" | "debug" | "trace" => EnvFilter::builder().parse(format!(
			"error,{PKG_NAME}={v}"
		)),
		_ => EnvFilter::builder().parse(v),
	}
}
