//! Process-wide shared OIDC client.

use tokio::sync::OnceCell;

use crate::client::{OidcClient, OidcClientConfig};
use crate::error::OidcResult;

/// Lazily-discovered shared OIDC client.
///
/// Discovery runs on first use; afterwards every caller reads the same
/// client without locking. Concurrent first uses collapse into one
/// discovery call: the cell admits a single initializer and parks the rest.
/// A failed discovery leaves the cell empty, so the next request retries
/// instead of pinning the process to a dead provider.
pub struct SharedOidcClient {
    config: OidcClientConfig,
    cell: OnceCell<OidcClient>,
}

impl SharedOidcClient {
    /// Creates a handle; no network traffic happens until first use.
    #[must_use]
    pub fn new(config: OidcClientConfig) -> Self {
        Self {
            config,
            cell: OnceCell::new(),
        }
    }

    /// Returns the discovered client, performing discovery on first use.
    pub async fn get(&self) -> OidcResult<&OidcClient> {
        self.cell
            .get_or_try_init(|| OidcClient::discover(self.config.clone()))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::State, routing::get, Json, Router};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    async fn spawn_stub_provider(hits: Arc<AtomicUsize>) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let issuer = format!("http://{addr}");

        let app = Router::new()
            .route(
                "/.well-known/openid-configuration",
                get(
                    move |State((hits, issuer)): State<(Arc<AtomicUsize>, String)>| async move {
                        hits.fetch_add(1, Ordering::SeqCst);
                        Json(serde_json::json!({
                            "issuer": issuer,
                            "authorization_endpoint": format!("{issuer}/authorize"),
                            "token_endpoint": format!("{issuer}/token"),
                            "jwks_uri": format!("{issuer}/jwks")
                        }))
                    },
                ),
            )
            .with_state((hits, issuer.clone()));

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        issuer
    }

    #[tokio::test]
    async fn discovery_runs_once_across_uses() {
        let hits = Arc::new(AtomicUsize::new(0));
        let issuer = spawn_stub_provider(hits.clone()).await;

        let shared = SharedOidcClient::new(OidcClientConfig::new(
            &issuer,
            "client",
            "secret",
            "http://bridge.example/oidc/callback",
        ));

        let first = shared.get().await.unwrap();
        assert_eq!(first.metadata().issuer, issuer);

        let second = shared.get().await.unwrap();
        assert_eq!(second.metadata().token_endpoint, format!("{issuer}/token"));

        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_discovery_is_retried_on_next_use() {
        // Nothing listens on the issuer yet, so the first use fails.
        let shared = SharedOidcClient::new(OidcClientConfig::new(
            "http://127.0.0.1:1",
            "client",
            "secret",
            "http://bridge.example/oidc/callback",
        ));

        assert!(shared.get().await.is_err());
        // The cell stays empty; a later call attempts discovery again.
        assert!(shared.get().await.is_err());
    }
}
