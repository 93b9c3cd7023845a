// src/services/catalog.rs
use reqwest::Client;
use serde::Deserialize;

pub const CATALOG_FALLBACK: &str = "No se pudo obtener el catálogo en este momento.";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CatalogEntry {
    pub title: String,
    pub author: String,
    pub stock: i64,
}

impl CatalogEntry {
    pub fn render(&self) -> String {
        format!("{} por {} (Stock: {})", self.title, self.author, self.stock)
    }
}

/// One line per book, in the order given.
pub fn render_catalog(entries: &[CatalogEntry]) -> String {
    entries
        .iter()
        .map(CatalogEntry::render)
        .collect::<Vec<_>>()
        .join("\n")
}

async fn try_fetch(client: &Client, url: &str) -> reqwest::Result<Vec<CatalogEntry>> {
    client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .json::<Vec<CatalogEntry>>()
        .await
}

/// Fetch and render the book catalog. Never fails: any error is logged and
/// replaced with [`CATALOG_FALLBACK`].
pub async fn fetch_catalog(client: &Client, url: &str) -> String {
    match try_fetch(client, url).await {
        Ok(entries) => {
            tracing::info!(books = entries.len(), "catalog loaded");
            render_catalog(&entries)
        }
        Err(e) => {
            tracing::warn!(error = %e, url, "could not fetch catalog");
            CATALOG_FALLBACK.to_string()
        }
    }
}
