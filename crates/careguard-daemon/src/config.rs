//! Configuration for careguard-daemon

use access_gate::GateRedirects;
use access_policy::RouteTable;
use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, SocketAddr};

/// Main daemon configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Redirect targets used by the route gate
    #[serde(default)]
    pub gate: GateRedirects,

    /// Route requirement table
    #[serde(default)]
    pub routes: RouteTable,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub enable_cors: bool,

    /// Emit an audit log line for every denied evaluation
    #[serde(default = "default_true")]
    pub audit_decisions: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            enable_cors: true,
            audit_decisions: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// Default value helpers
fn default_true() -> bool {
    true
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::LOCALHOST, 8088))
}

fn default_log_level() -> String {
    "info".to_string()
}

impl DaemonConfig {
    /// Load configuration from the optional file, then
    /// `CAREGUARD_`-prefixed environment variables with `__` between
    /// nested keys (`CAREGUARD_SERVER__LISTEN_ADDR`).
    ///
    /// Missing keys fall back to serde defaults. The defaults are not layered
    /// in as a source: config merges arrays element-wise and would splice
    /// file route rules into the built-in table.
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("CAREGUARD")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = DaemonConfig::default();
        assert_eq!(config.server.listen_addr.port(), 8088);
        assert!(config.server.enable_cors);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.gate.sign_in, "/sign-in");
        assert!(config.routes.validate().is_ok());
    }

    #[test]
    fn test_load_without_file() {
        let config = DaemonConfig::load(None).unwrap();
        assert_eq!(config.routes, RouteTable::care_defaults());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[server]
listen_addr = "0.0.0.0:9000"

[logging]
level = "debug"
json = true

[gate]
pending = "/waiting"

[routes]
public = ["/", "/sign-in", "/waiting", "/rejected", "/no-access", "/role-missing"]

[[routes.rules]]
prefix = "/reports"
roles = ["support_coordinator"]
"#
        )
        .unwrap();

        let path = file.path().to_str().unwrap().to_string();
        let config = DaemonConfig::load(Some(&path)).unwrap();
        assert_eq!(config.server.listen_addr.port(), 9000);
        assert!(config.logging.json);
        assert_eq!(config.gate.pending, "/waiting");
        assert_eq!(config.gate.sign_in, "/sign-in");
        assert_eq!(config.routes.rules.len(), 1);
        assert!(config.routes.rules[0].requirement.require_approval);
        assert!(crate::Server::new(config).is_ok());
    }

    #[test]
    fn test_env_overrides_nested_keys() {
        // Keys no other test reads from `load`, so parallel tests are unaffected.
        std::env::set_var("CAREGUARD_SERVER__AUDIT_DECISIONS", "false");
        std::env::set_var("CAREGUARD_GATE__NO_ACCESS", "/no-access?from=env");
        let loaded = DaemonConfig::load(None);
        std::env::remove_var("CAREGUARD_SERVER__AUDIT_DECISIONS");
        std::env::remove_var("CAREGUARD_GATE__NO_ACCESS");

        let config = loaded.unwrap();
        assert!(!config.server.audit_decisions);
        assert_eq!(config.gate.no_access, "/no-access?from=env");
        assert_eq!(config.server.listen_addr.port(), 8088);
    }
}
