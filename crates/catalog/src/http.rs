//! HTTP catalog source (`GET {base_url}/products`).

use async_trait::async_trait;
use storefront_core::Product;

use crate::snapshot::CatalogSnapshot;
use crate::source::{CatalogError, CatalogSource};

/// Fetches the whole catalog from a REST backend in one request.
#[derive(Debug, Clone)]
pub struct HttpCatalogSource {
    base_url: String,
    client: reqwest::Client,
}

impl HttpCatalogSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn products_url(&self) -> String {
        format!("{}/products", self.base_url)
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogSource {
    async fn fetch_all(&self) -> Result<CatalogSnapshot, CatalogError> {
        let url = self.products_url();
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(CatalogError::Api(
                resp.status().as_u16(),
                resp.text().await.unwrap_or_default(),
            ));
        }

        let products: Vec<Product> = resp
            .json()
            .await
            .map_err(|e| CatalogError::Parse(e.to_string()))?;

        tracing::info!(url = %url, products = products.len(), "fetched catalog");
        Ok(CatalogSnapshot::new(products))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn products_url_ignores_trailing_slash() {
        let source = HttpCatalogSource::new("https://shop.example.invalid/");
        assert_eq!(source.base_url(), "https://shop.example.invalid");
        assert_eq!(source.products_url(), "https://shop.example.invalid/products");
    }
}
