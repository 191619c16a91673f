use anyhow::Context;
use catalog_kernel::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("failed to load catalog settings")?;
    catalog_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        seed_file = ?settings.catalog.seed_file,
        "catalog-app bootstrap starting"
    );

    catalog_app::serve(settings).await
}
