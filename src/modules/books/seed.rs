use std::path::Path;

use anyhow::Context;

use super::models::CreateBookRequest;
use super::service::BookService;

/// Read a JSON array of creation requests.
pub async fn read_seed_file(path: &Path) -> anyhow::Result<Vec<CreateBookRequest>> {
    let raw = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read seed file {}", path.display()))?;
    serde_json::from_slice(&raw)
        .with_context(|| format!("seed file {} is not a list of books", path.display()))
}

/// Populate the catalog from a seed file, returning how many books were created.
pub async fn seed_from_file(service: &BookService, path: &Path) -> anyhow::Result<usize> {
    let requests = read_seed_file(path).await?;
    let total = requests.len();
    let created = service.seed(requests).await;

    tracing::info!(
        path = %path.display(),
        created,
        skipped = total - created,
        "catalog seeded"
    );
    Ok(created)
}
