//! Command-line configuration, logging setup and bucket selection

use std::{
	path::{Path, PathBuf},
	sync::Arc,
	time::Duration,
};

use clap::{Parser, ValueEnum};
use serde::Deserialize;
use tracing_subscriber::{EnvFilter, filter::LevelFilter};

use rules_objstore_bucket_adapter_fs::BucketAdapterFs;
use rules_objstore_core::duration::parse_duration;
use rules_objstore_types::bucket_adapter::BucketAdapter;

use crate::app::AppBuilder;
use crate::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
	Error,
	Warn,
	Info,
	Debug,
}

impl LogLevel {
	fn as_filter(self) -> LevelFilter {
		match self {
			LogLevel::Error => LevelFilter::ERROR,
			LogLevel::Warn => LevelFilter::WARN,
			LogLevel::Info => LevelFilter::INFO,
			LogLevel::Debug => LevelFilter::DEBUG,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
	Logfmt,
	Json,
}

/// Multi-tenant Prometheus rule file store
#[derive(Debug, Parser)]
#[command(name = "rules-objstore")]
#[command(version)]
pub struct Config {
	/// Name added to every log line, useful when running several instances
	#[arg(long = "debug.name", default_value = "rules-objstore")]
	pub debug_name: String,

	/// Only log messages with the given severity or above
	#[arg(long = "log.level", value_enum, default_value_t = LogLevel::Info)]
	pub log_level: LogLevel,

	/// Output format of log messages
	#[arg(long = "log.format", value_enum, default_value_t = LogFormat::Logfmt)]
	pub log_format: LogFormat,

	/// Address to listen on for the rules API
	#[arg(long = "web.listen", default_value = "0.0.0.0:8080")]
	pub web_listen: String,

	/// Address to listen on for health checks and metrics
	#[arg(long = "web.internal.listen", default_value = "0.0.0.0:8081")]
	pub web_internal_listen: String,

	/// Maximum accepted request body size in bytes
	#[arg(long = "web.max-body-size", default_value_t = 10 * 1024 * 1024)]
	pub web_max_body_size: usize,

	/// Path to the YAML object store configuration
	#[arg(long = "objstore.config-file")]
	pub objstore_config_file: PathBuf,

	/// Upper bound for a single bucket operation
	#[arg(long = "objstore.timeout", default_value = "30s", value_parser = parse_duration)]
	pub objstore_timeout: Duration,

	/// Number of tenants fetched at once by the aggregate endpoint
	#[arg(long = "aggregate.concurrency", default_value_t = 8, value_parser = parse_concurrency)]
	pub aggregate_concurrency: usize,
}

fn parse_concurrency(s: &str) -> Result<usize, String> {
	match s.parse::<usize>() {
		Ok(0) => Err("must be at least 1".to_string()),
		Ok(n) => Ok(n),
		Err(err) => Err(err.to_string()),
	}
}

impl Config {
	/// Opens the configured bucket and applies every flag to a new builder
	pub async fn app_builder(&self) -> ClResult<AppBuilder> {
		let bucket = open_bucket(&self.objstore_config_file).await?;

		let mut builder = AppBuilder::new();
		builder
			.listen(self.web_listen.as_str())
			.listen_internal(self.web_internal_listen.as_str())
			.max_body_size(self.web_max_body_size)
			.op_timeout(self.objstore_timeout)
			.aggregate_concurrency(self.aggregate_concurrency)
			.bucket_adapter(bucket);
		Ok(builder)
	}
}

/// Object store configuration file
///
/// ```yaml
/// type: FILESYSTEM
/// config:
///   directory: /var/lib/rules
/// ```
#[derive(Debug, Deserialize)]
pub struct ObjstoreConfig {
	#[serde(rename = "type")]
	pub typ: String,
	#[serde(default)]
	pub config: serde_yaml::Value,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilesystemConfig {
	pub directory: PathBuf,
}

pub fn parse_objstore_config(data: &str) -> ClResult<ObjstoreConfig> {
	serde_yaml::from_str(data)
		.map_err(|err| Error::ConfigError(format!("parsing object store config: {}", err)))
}

/// Creates the bucket adapter selected by `config.typ`
pub async fn bucket_from_config(config: ObjstoreConfig) -> ClResult<Arc<dyn BucketAdapter>> {
	if config.typ.eq_ignore_ascii_case("FILESYSTEM") {
		let fs: FilesystemConfig = serde_yaml::from_value(config.config).map_err(|err| {
			Error::ConfigError(format!("parsing FILESYSTEM bucket config: {}", err))
		})?;
		info!(directory = %fs.directory.display(), "using filesystem bucket");
		let bucket = BucketAdapterFs::new(fs.directory.into_boxed_path()).await?;
		Ok(Arc::new(bucket))
	} else {
		Err(Error::ConfigError(format!("unsupported object store type: {}", config.typ)))
	}
}

pub async fn open_bucket(path: &Path) -> ClResult<Arc<dyn BucketAdapter>> {
	let data = tokio::fs::read_to_string(path).await.map_err(|err| {
		Error::ConfigError(format!("reading object store config {}: {}", path.display(), err))
	})?;
	bucket_from_config(parse_objstore_config(&data)?).await
}

/// Installs the global tracing subscriber. `RUST_LOG` overrides `--log.level`.
pub fn init_logging(config: &Config) -> ClResult<()> {
	let filter = EnvFilter::builder()
		.with_default_directive(config.log_level.as_filter().into())
		.from_env_lossy();
	let builder = tracing_subscriber::fmt().with_env_filter(filter).with_ansi(false);

	let res = match config.log_format {
		LogFormat::Logfmt => builder.compact().try_init(),
		LogFormat::Json => builder.json().try_init(),
	};
	res.map_err(|err| Error::ConfigError(format!("initializing logging: {}", err)))
}


// vim: ts=4
