//! App builder - constructs and runs the rules-objstore service

use std::{sync::Arc, time::Duration};

use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use rules_objstore_core::metrics::RulesMetrics;
use rules_objstore_core::{RuleStore, aggregate, store};
use rules_objstore_types::bucket_adapter::BucketAdapter;

use crate::prelude::*;
use crate::routes;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub struct AppState {
	pub store: RuleStore,
	pub metrics: Arc<RulesMetrics>,
	pub opts: AppBuilderOpts,
}

pub type App = Arc<AppState>;

#[derive(Debug, Clone)]
pub struct AppBuilderOpts {
	pub listen: Box<str>,
	pub listen_internal: Box<str>,
	pub op_timeout: Duration,
	pub aggregate_concurrency: usize,
	pub max_body_size: usize,
}

pub struct AppBuilder {
	opts: AppBuilderOpts,
	bucket_adapter: Option<Arc<dyn BucketAdapter>>,
}

impl AppBuilder {
	pub fn new() -> Self {
		AppBuilder {
			opts: AppBuilderOpts {
				listen: "0.0.0.0:8080".into(),
				listen_internal: "0.0.0.0:8081".into(),
				op_timeout: store::DEFAULT_OP_TIMEOUT,
				aggregate_concurrency: aggregate::DEFAULT_CONCURRENCY,
				max_body_size: 10 * 1024 * 1024,
			},
			bucket_adapter: None,
		}
	}

	// Opts
	pub fn listen(&mut self, listen: impl Into<Box<str>>) -> &mut Self {
		self.opts.listen = listen.into();
		self
	}
	pub fn listen_internal(&mut self, listen_internal: impl Into<Box<str>>) -> &mut Self {
		self.opts.listen_internal = listen_internal.into();
		self
	}
	pub fn op_timeout(&mut self, op_timeout: Duration) -> &mut Self {
		self.opts.op_timeout = op_timeout;
		self
	}
	pub fn aggregate_concurrency(&mut self, concurrency: usize) -> &mut Self {
		self.opts.aggregate_concurrency = concurrency;
		self
	}
	pub fn max_body_size(&mut self, max_body_size: usize) -> &mut Self {
		self.opts.max_body_size = max_body_size;
		self
	}

	// Adapters
	pub fn bucket_adapter(&mut self, bucket_adapter: Arc<dyn BucketAdapter>) -> &mut Self {
		self.bucket_adapter = Some(bucket_adapter);
		self
	}

	/// Creates the shared state without binding any listener
	pub fn build(self) -> ClResult<App> {
		let Some(bucket_adapter) = self.bucket_adapter else {
			error!("FATAL: No bucket adapter configured");
			return Err(Error::Internal("No bucket adapter configured".to_string()));
		};
		let metrics = Arc::new(RulesMetrics::new());
		let store = RuleStore::new(bucket_adapter)
			.with_observer(metrics.clone())
			.with_op_timeout(self.opts.op_timeout);

		Ok(Arc::new(AppState { store, metrics, opts: self.opts }))
	}

	pub async fn run(self) -> ClResult<()> {
		info!("starting rules-objstore V{}", VERSION);
		let app = self.build()?;
		let (api_router, internal_router) = routes::init(app.clone());

		let api_listener = TcpListener::bind(&*app.opts.listen).await.map_err(Error::Io)?;
		let internal_listener =
			TcpListener::bind(&*app.opts.listen_internal).await.map_err(Error::Io)?;
		info!(address = %app.opts.listen, "starting the HTTP server");
		info!(address = %app.opts.listen_internal, "starting internal HTTP server");

		let shutdown = CancellationToken::new();
		{
			let shutdown = shutdown.clone();
			tokio::spawn(async move {
				shutdown_signal().await;
				shutdown.cancel();
			});
		}

		let api_server = tokio::spawn(serve(api_listener, api_router, shutdown.clone()));
		let internal_server =
			tokio::spawn(serve(internal_listener, internal_router, shutdown.clone()));

		let (api_res, internal_res) = tokio::try_join!(api_server, internal_server)
			.map_err(|e| Error::Internal(format!("server task failed: {}", e)))?;
		api_res.map_err(Error::Io)?;
		internal_res.map_err(Error::Io)?;

		info!("exiting");
		Ok(())
	}
}

impl Default for AppBuilder {
	fn default() -> Self {
		Self::new()
	}
}

/// Serves until `shutdown` is cancelled. Cancels it on return, so one
/// listener failing stops the other.
async fn serve(
	listener: TcpListener,
	router: Router,
	shutdown: CancellationToken,
) -> std::io::Result<()> {
	let res = axum::serve(listener, router)
		.with_graceful_shutdown(shutdown.clone().cancelled_owned())
		.await;
	if let Err(err) = &res {
		error!("HTTP server failed: {}", err);
	}
	shutdown.cancel();
	res
}

/// Resolves on SIGINT or SIGTERM
async fn shutdown_signal() {
	let ctrl_c = async {
		if let Err(err) = tokio::signal::ctrl_c().await {
			error!("failed to install Ctrl+C handler: {}", err);
			std::future::pending::<()>().await;
		}
	};

	#[cfg(unix)]
	let terminate = async {
		match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
			Ok(mut sig) => {
				sig.recv().await;
			}
			Err(err) => {
				error!("failed to install SIGTERM handler: {}", err);
				std::future::pending::<()>().await;
			}
		}
	};

	#[cfg(not(unix))]
	let terminate = std::future::pending::<()>();

	tokio::select! {
		() = ctrl_c => info!("caught interrupt"),
		() = terminate => info!("caught SIGTERM"),
	}
	info!("shutting down the HTTP servers");
}


// vim: ts=4
