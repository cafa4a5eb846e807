//! Server setup and lifecycle management

use crate::api::create_router;
use crate::api::rest::state::AppState;
use crate::config::DaemonConfig;
use crate::error::{DaemonError, DaemonResult};
use access_gate::RouteGate;
use access_guard::InMemoryProfileDirectory;
use access_policy::AccessEvaluator;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Careguard daemon server
pub struct Server {
    config: DaemonConfig,
    state: AppState,
}

impl Server {
    /// Create a new server with the given configuration
    pub fn new(config: DaemonConfig) -> DaemonResult<Self> {
        config.routes.validate()?;

        let evaluator =
            AccessEvaluator::new().with_emit_audit_events(config.server.audit_decisions);
        let gate = RouteGate::new(config.routes.clone())
            .with_redirects(config.gate.clone())
            .with_evaluator(evaluator.clone());
        gate.validate()?;

        let state = AppState::new(
            evaluator,
            Arc::new(gate),
            Arc::new(InMemoryProfileDirectory::new()),
        );

        Ok(Self { config, state })
    }

    /// Router serving this server's state
    pub fn router(&self) -> Router {
        create_router(self.state.clone(), self.config.server.enable_cors)
    }

    /// Run the server
    pub async fn run(self) -> DaemonResult<()> {
        let addr = self.config.server.listen_addr;
        let app = self.router();

        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Careguard daemon listening on {}", addr);
        tracing::info!(
            rules = self.config.routes.rules.len(),
            public = self.config.routes.public.len(),
            "Route table loaded"
        );

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| DaemonError::Server(e.to_string()))?;

        tracing::info!("Careguard daemon shutting down");

        Ok(())
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install terminate handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use access_gate::{GateError, RedirectKind};
    use access_policy::{RouteRule, RouteTable};
    use access_types::RouteRequirement;

    #[test]
    fn test_server_rejects_invalid_routes() {
        let mut config = DaemonConfig::default();
        config.routes = RouteTable::empty()
            .with_rule(RouteRule::new("reports", RouteRequirement::default()));
        assert!(matches!(
            Server::new(config),
            Err(DaemonError::Routes(_))
        ));
    }

    #[test]
    fn test_server_rejects_protected_redirect() {
        let mut config = DaemonConfig::default();
        config.routes = RouteTable::care_defaults();
        config.routes.public.retain(|path| path != "/pending");
        match Server::new(config) {
            Err(DaemonError::Gate(GateError::ProtectedRedirect { kind, location })) => {
                assert_eq!(kind, RedirectKind::Pending);
                assert_eq!(location, "/pending");
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("server accepted a protected redirect target"),
        }
    }

    #[test]
    fn test_server_accepts_public_custom_redirect() {
        let mut config = DaemonConfig::default();
        config.gate.pending = "/waiting".to_string();
        assert!(matches!(Server::new(config.clone()), Err(DaemonError::Gate(_))));

        config.routes = config.routes.with_public("/waiting");
        assert!(Server::new(config).is_ok());
    }

    #[test]
    fn test_server_builds_with_defaults() {
        assert!(Server::new(DaemonConfig::default()).is_ok());
    }
}
