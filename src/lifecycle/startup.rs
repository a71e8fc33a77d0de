//! Startup orchestration.
//!
//! Config is loaded and validated, the policy is built, then the listener is
//! bound. Any failure here is fatal to the process.

use std::net::SocketAddr;
use std::path::Path;

use tokio::net::TcpListener;

use crate::config::loader::read_config;
use crate::config::validation::validate_config;
use crate::config::{ConfigError, ProxyConfig};
use crate::error::{ProxyError, ProxyResult};
use crate::http::HttpServer;
use crate::observability::metrics;
use crate::security::MethodPolicy;

/// Command-line values that replace config file settings.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub bind_address: Option<String>,
    pub upstream_url: Option<String>,
}

impl Overrides {
    fn apply(&self, config: &mut ProxyConfig) {
        if let Some(addr) = &self.bind_address {
            config.listener.bind_address = addr.clone();
        }
        if let Some(url) = &self.upstream_url {
            config.upstream.url = url.clone();
        }
    }
}

/// A server ready to run on its bound listener.
pub struct Prepared {
    pub config: ProxyConfig,
    pub server: HttpServer,
    pub listener: TcpListener,
}

/// Read the config file, apply overrides and validate.
pub fn load(path: &Path, overrides: &Overrides) -> Result<ProxyConfig, ConfigError> {
    let mut config = read_config(path)?;
    overrides.apply(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Run every startup step in order.
pub async fn prepare(path: &Path, overrides: &Overrides) -> ProxyResult<Prepared> {
    let config = load(path, overrides)?;

    tracing::info!(
        path = %path.display(),
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.url,
        "Configuration loaded"
    );

    let policy = MethodPolicy::from_config(&config);
    let server = HttpServer::new(&config, policy)?;

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse::<SocketAddr>() {
            metrics::init_metrics(addr);
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address)
        .await
        .map_err(|source| ProxyError::Bind {
            addr: config.listener.bind_address.clone(),
            source,
        })?;

    Ok(Prepared {
        config,
        server,
        listener,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn config_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn overrides_replace_file_values() {
        let file = config_file(r#"{"whitelisted_methods":[],"blacklisted_methods":[]}"#);
        let overrides = Overrides {
            bind_address: Some("127.0.0.1:0".into()),
            upstream_url: Some("http://10.1.1.1:9000".into()),
        };
        let config = load(file.path(), &overrides).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:0");
        assert_eq!(config.upstream.url, "http://10.1.1.1:9000");
    }

    #[test]
    fn invalid_override_fails_validation() {
        let file = config_file(r#"{"whitelisted_methods":[],"blacklisted_methods":[]}"#);
        let overrides = Overrides {
            upstream_url: Some("https://secure".into()),
            ..Default::default()
        };
        assert!(matches!(load(file.path(), &overrides), Err(ConfigError::Validation(_))));
    }

    #[tokio::test]
    async fn prepare_binds_listener() {
        let file = config_file(
            r#"{"whitelisted_methods":["getHealth"],"blacklisted_methods":[],"listener":{"bind_address":"127.0.0.1:0"}}"#,
        );
        let prepared = prepare(file.path(), &Overrides::default()).await.unwrap();
        assert!(prepared.listener.local_addr().unwrap().port() > 0);
        assert_eq!(prepared.config.whitelisted_methods, vec!["getHealth".to_string()]);
    }

    #[tokio::test]
    async fn missing_config_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = prepare(&dir.path().join("absent.json"), &Overrides::default())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, ProxyError::Config(ConfigError::Io(_))));
    }

    #[tokio::test]
    async fn bind_conflict_is_fatal() {
        let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = taken.local_addr().unwrap();
        let file = config_file(r#"{"whitelisted_methods":[],"blacklisted_methods":[]}"#);
        let overrides = Overrides {
            bind_address: Some(addr.to_string()),
            ..Default::default()
        };
        let err = prepare(file.path(), &overrides).await.err().unwrap();
        assert!(matches!(err, ProxyError::Bind { .. }));
    }
}
