//! Book catalog application library.
//!
//! Holds the catalog modules and the bootstrap shared by the server binary
//! and the CLI.

use anyhow::Context;
use catalog_kernel::{settings::Settings, InitCtx, ModuleRegistry};

pub mod modules;

pub use modules::register_all;

/// Run every module's lifecycle around the HTTP server until `ctrl-c`.
pub async fn serve(settings: Settings) -> anyhow::Result<()> {
    let mut registry = ModuleRegistry::new();
    register_all(&mut registry)?;

    let ctx = InitCtx {
        settings: &settings,
    };
    registry.init_all(&ctx).await?;
    registry.start_all(&ctx).await?;

    let served = catalog_http::start_server(&registry, &settings, shutdown_signal()).await;

    // Stop modules even when the server failed
    registry
        .stop_all()
        .await
        .context("failed to stop modules")?;
    served
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("shutdown signal received"),
        Err(err) => tracing::error!(error = %err, "unable to listen for shutdown signal"),
    }
}
