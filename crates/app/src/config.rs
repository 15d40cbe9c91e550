//! Environment-driven application configuration.

use std::path::PathBuf;

use storefront_cart::{CartStoreConfig, DEFAULT_CART_KEY};
use storefront_observability::LogFormat;

/// Where the catalog comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogLocation {
    /// JSON array of products on disk.
    File(PathBuf),
    /// REST backend serving `GET {base_url}/products`.
    Http(String),
    /// No catalog configured; the app runs with an empty snapshot.
    None,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Directory holding `storage.db`; `None` means the OS data directory.
    pub data_dir: Option<PathBuf>,
    pub cart_key: String,
    pub catalog: CatalogLocation,
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            cart_key: DEFAULT_CART_KEY.to_string(),
            catalog: CatalogLocation::None,
            log_format: LogFormat::Pretty,
        }
    }
}

/// Configuration plus the fallbacks taken while reading it.
///
/// Reading happens before tracing is initialised (the log format is itself
/// configuration), so fallbacks are collected here and logged afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedConfig {
    pub config: AppConfig,
    pub fallbacks: Vec<String>,
}

impl LoadedConfig {
    /// Emit one warning per fallback. Call once a subscriber is installed.
    pub fn log_fallbacks(&self) {
        for fallback in &self.fallbacks {
            tracing::warn!("{fallback}");
        }
    }
}

impl AppConfig {
    /// Read configuration from `STOREFRONT_*` environment variables.
    pub fn from_env() -> LoadedConfig {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> LoadedConfig {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();
        let mut fallbacks = Vec::new();

        let data_dir = non_empty("STOREFRONT_DATA_DIR").map(PathBuf::from);

        let cart_key = non_empty("STOREFRONT_CART_KEY").unwrap_or(defaults.cart_key);

        // A local file wins over the network so demos work offline.
        let catalog = match (
            non_empty("STOREFRONT_CATALOG_FILE"),
            non_empty("STOREFRONT_CATALOG_URL"),
        ) {
            (Some(path), _) => CatalogLocation::File(PathBuf::from(path)),
            (None, Some(url)) => CatalogLocation::Http(url),
            (None, None) => {
                fallbacks.push(
                    "neither STOREFRONT_CATALOG_FILE nor STOREFRONT_CATALOG_URL set; \
                     catalog will be empty"
                        .to_string(),
                );
                CatalogLocation::None
            }
        };

        let log_format = match non_empty("STOREFRONT_LOG_FORMAT") {
            Some(raw) => match raw.parse::<LogFormat>() {
                Ok(format) => format,
                Err(err) => {
                    fallbacks.push(format!("{err}; falling back to {:?}", defaults.log_format));
                    defaults.log_format
                }
            },
            None => defaults.log_format,
        };

        LoadedConfig {
            config: Self {
                data_dir,
                cart_key,
                catalog,
                log_format,
            },
            fallbacks,
        }
    }

    pub fn cart_store_config(&self) -> CartStoreConfig {
        CartStoreConfig {
            storage_key: self.cart_key.clone(),
        }
    }

    /// Explicit storage file, if a data directory was configured.
    pub fn storage_path(&self) -> Option<PathBuf> {
        self.data_dir.as_ref().map(|dir| dir.join("storage.db"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io;
    use std::sync::{Arc, Mutex};

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let loaded = AppConfig::from_lookup(lookup(&[]));
        assert_eq!(loaded.fallbacks.len(), 1);
        let config = loaded.config;
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.cart_key, "user_cart");
        assert!(config.storage_path().is_none());
    }

    #[test]
    fn file_catalog_takes_precedence_over_url() {
        let config = AppConfig::from_lookup(lookup(&[
            ("STOREFRONT_CATALOG_FILE", "/tmp/catalog.json"),
            ("STOREFRONT_CATALOG_URL", "https://shop.example.invalid"),
        ]))
        .config;
        assert_eq!(
            config.catalog,
            CatalogLocation::File(PathBuf::from("/tmp/catalog.json"))
        );
    }

    #[test]
    fn reads_every_variable() {
        let loaded = AppConfig::from_lookup(lookup(&[
            ("STOREFRONT_DATA_DIR", "/var/lib/storefront"),
            ("STOREFRONT_CART_KEY", "guest_cart"),
            ("STOREFRONT_CATALOG_URL", "https://shop.example.invalid"),
            ("STOREFRONT_LOG_FORMAT", "json"),
        ]));
        assert!(loaded.fallbacks.is_empty());
        let config = loaded.config;

        assert_eq!(
            config.storage_path(),
            Some(PathBuf::from("/var/lib/storefront/storage.db"))
        );
        assert_eq!(config.cart_store_config().storage_key, "guest_cart");
        assert_eq!(
            config.catalog,
            CatalogLocation::Http("https://shop.example.invalid".into())
        );
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn blank_and_invalid_values_fall_back() {
        let loaded = AppConfig::from_lookup(lookup(&[
            ("STOREFRONT_CART_KEY", "   "),
            ("STOREFRONT_LOG_FORMAT", "xml"),
            ("STOREFRONT_CATALOG_FILE", "/tmp/catalog.json"),
        ]));
        assert_eq!(loaded.config.cart_key, "user_cart");
        assert_eq!(loaded.config.log_format, LogFormat::Pretty);
        assert_eq!(loaded.fallbacks.len(), 1);
        assert!(loaded.fallbacks[0].contains("xml"));
    }

    /// Shared buffer the test subscriber writes into.
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn fallbacks_reach_the_subscriber_installed_after_loading() {
        let loaded = AppConfig::from_lookup(lookup(&[("STOREFRONT_LOG_FORMAT", "xml")]));

        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, || loaded.log_fallbacks());

        let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("WARN"));
        assert!(output.contains("unknown log format 'xml'"));
        assert!(output.contains("STOREFRONT_CATALOG_FILE"));
    }
}
