use axum::Router;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::TlsConfig;
use crate::errors::AdminError;

/// Grace period for in-flight requests after Ctrl-C
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

/// Serves the admin router over plain HTTP or rustls
pub struct TlsManager {
    config: TlsConfig,
}

impl TlsManager {
    pub fn new(config: TlsConfig) -> Self {
        Self { config }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    fn pem_paths(&self) -> Result<(&str, &str), AdminError> {
        if !self.config.enabled {
            return Err(AdminError::Tls("TLS is not enabled".to_string()));
        }

        let cert_file = self
            .config
            .cert_file
            .as_deref()
            .ok_or_else(|| AdminError::Tls("TLS certificate file not specified".to_string()))?;
        let key_file = self
            .config
            .key_file
            .as_deref()
            .ok_or_else(|| AdminError::Tls("TLS key file not specified".to_string()))?;

        for (what, path) in [("certificate", cert_file), ("key", key_file)] {
            if !Path::new(path).exists() {
                return Err(AdminError::Tls(format!("TLS {what} file not found: {path}")));
            }
        }

        Ok((cert_file, key_file))
    }

    pub async fn load_tls_config(
        &self,
    ) -> Result<axum_server::tls_rustls::RustlsConfig, AdminError> {
        let (cert_file, key_file) = self.pem_paths()?;
        info!("Loading TLS configuration from {} and {}", cert_file, key_file);

        axum_server::tls_rustls::RustlsConfig::from_pem_file(cert_file, key_file)
            .await
            .map_err(|e| AdminError::Tls(format!("Failed to load TLS config: {e}")))
    }

    /// Serve until Ctrl-C, over TLS when enabled
    pub async fn serve(&self, app: Router, addr: SocketAddr) -> Result<(), AdminError> {
        if self.is_enabled() {
            self.serve_tls(app, addr).await
        } else {
            Self::serve_http(app, addr).await
        }
    }

    async fn serve_tls(&self, app: Router, addr: SocketAddr) -> Result<(), AdminError> {
        let tls_config = self.load_tls_config().await?;

        let handle = axum_server::Handle::new();
        let shutdown = handle.clone();
        tokio::spawn(async move {
            shutdown_signal().await;
            shutdown.graceful_shutdown(Some(SHUTDOWN_GRACE));
        });

        info!("🔒 TLS enabled");
        info!("✅ Admin API ready - accepting TLS connections on {}", addr);

        axum_server::bind_rustls(addr, tls_config)
            .handle(handle)
            .serve(app.into_make_service_with_connect_info::<SocketAddr>())
            .await
            .map_err(|e| AdminError::Internal(format!("TLS server error: {e}")))
    }

    async fn serve_http(app: Router, addr: SocketAddr) -> Result<(), AdminError> {
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| AdminError::Internal(format!("Failed to bind to {addr}: {e}")))?;

        info!("✅ Admin API ready - accepting connections (HTTP only) on {}", addr);

        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AdminError::Internal(format!("Server error: {e}")))
    }

    /// One-line summary for the startup log
    pub fn get_config_summary(&self) -> String {
        if self.config.enabled {
            format!(
                "TLS enabled (cert: {}, key: {})",
                self.config.cert_file.as_deref().unwrap_or("not set"),
                self.config.key_file.as_deref().unwrap_or("not set")
            )
        } else {
            "TLS disabled".to_string()
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested, draining connections");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tls(enabled: bool, cert: Option<&str>, key: Option<&str>) -> TlsManager {
        TlsManager::new(TlsConfig {
            enabled,
            cert_file: cert.map(str::to_string),
            key_file: key.map(str::to_string),
        })
    }

    #[test]
    fn test_summary() {
        assert_eq!(tls(false, None, None).get_config_summary(), "TLS disabled");
        assert_eq!(
            tls(true, Some("/path/to/cert.pem"), Some("/path/to/key.pem")).get_config_summary(),
            "TLS enabled (cert: /path/to/cert.pem, key: /path/to/key.pem)"
        );
    }

    #[tokio::test]
    async fn test_disabled_tls_has_no_config() {
        let err = tls(false, None, None).load_tls_config().await.unwrap_err();
        assert!(err.to_string().contains("TLS is not enabled"));
    }

    #[tokio::test]
    async fn test_missing_pem_files() {
        let err = tls(true, Some("/nonexistent/cert.pem"), Some("/nonexistent/key.pem"))
            .load_tls_config()
            .await
            .unwrap_err();
        assert!(matches!(err, AdminError::Tls(_)));
        assert!(err.to_string().contains("not found"));

        let err = tls(true, None, Some("/nonexistent/key.pem"))
            .load_tls_config()
            .await
            .unwrap_err();
        assert!(err.to_string().contains("certificate file not specified"));
    }
}
