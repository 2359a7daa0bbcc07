// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! TOML configuration for the logger server and the scanner, loaded as
//! defaults merged with an optional config file.

pub mod validation;

use alloy_primitives::Address;
use anyhow::{Context, Result};
use figment::{
    providers::{Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct AppConfig {
    pub chain: ChainConfig,
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub log: LogConfig,
    pub filter_query: FilterQueryConfig,
    pub contracts: ContractsConfig,
    pub scan_database: ScanDatabaseConfig,
    pub api: ApiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ChainConfig {
    /// Chain node endpoint; must be pubsub-capable for the scan loop.
    pub uri: String,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            uri: "ws://127.0.0.1:8545".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct DatabaseConfig {
    /// Root path of the log document store.
    pub uri: String,
    pub database: String,
    pub collection: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            uri: "./data".to_string(),
            database: "evlog".to_string(),
            collection: "logs".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ServerConfig {
    /// gRPC listen address, `host:port` with port >= 1000.
    pub host: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1:5000".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct LogConfig {
    /// One of trace, debug, info, warn, error.
    pub level: String,
    /// When set, log lines go to this file (append) instead of stdout.
    pub file: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct FilterQueryConfig {
    pub scan_block: u64,
    pub addresses: Vec<Address>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ContractsConfig {
    /// Zero address disables the corresponding scanner.
    pub faucet: Address,
    pub erc20: Address,
    pub erc1155: Address,
    pub governance: Address,
    /// Block the decoder pipeline replays from.
    pub from: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ScanDatabaseConfig {
    /// SQLite database file of the decoded event store.
    pub path: String,
}

impl Default for ScanDatabaseConfig {
    fn default() -> Self {
        Self {
            path: "./scan.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ApiConfig {
    /// HTTP listen address of the read-only query API.
    pub host: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1:8080".to_string(),
        }
    }
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl AppConfig {
    pub fn validate(&self) -> Result<()> {
        validation::validate_host(&self.server.host).context("server.host")?;
        anyhow::ensure!(
            LOG_LEVELS.contains(&self.log.level.to_lowercase().as_str()),
            "unknown log level '{}'",
            self.log.level
        );
        Ok(())
    }
}

/// Loads defaults merged with the TOML file at `path` (when given) and
/// validates the result. Validation errors are fatal at startup.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));
    if let Some(path) = path {
        figment = figment.merge(Toml::file(path));
    }
    let config: AppConfig = figment.extract().context("read config")?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    fn from_str(raw: &str) -> Result<AppConfig> {
        let config: AppConfig = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::string(raw))
            .extract()?;
        config.validate()?;
        Ok(config)
    }

    #[test]
    fn parses_a_full_config() -> Result<()> {
        let config = from_str(
            r#"
            [chain]
            uri = "ws://10.0.0.1:8546"

            [database]
            uri = "/var/lib/evlog"
            database = "mainnet"
            collection = "logs"

            [server]
            host = "0.0.0.0:5000"

            [log]
            level = "debug"
            file = "/var/log/evlog.log"

            [filter-query]
            scan-block = 42
            addresses = ["0x00000000000000000000000000000000000000aa"]

            [contracts]
            erc20 = "0x00000000000000000000000000000000000000bb"
            from = 7

            [scan-database]
            path = "/var/lib/evlog/scan.db"
        "#,
        )?;

        assert_eq!(config.chain.uri, "ws://10.0.0.1:8546");
        assert_eq!(config.database.database, "mainnet");
        assert_eq!(config.filter_query.scan_block, 42);
        assert_eq!(
            config.filter_query.addresses,
            vec![address!("00000000000000000000000000000000000000aa")]
        );
        assert_eq!(
            config.contracts.erc20,
            address!("00000000000000000000000000000000000000bb")
        );
        assert!(config.contracts.faucet.is_zero());
        assert_eq!(config.contracts.from, 7);
        assert_eq!(config.log.file.as_deref(), Some("/var/log/evlog.log"));
        Ok(())
    }

    #[test]
    fn defaults_apply_when_sections_are_missing() -> Result<()> {
        let config = from_str("")?;
        assert_eq!(config.server.host, "127.0.0.1:5000");
        assert_eq!(config.log.level, "info");
        assert!(config.filter_query.addresses.is_empty());
        Ok(())
    }

    #[test]
    fn rejects_low_ports_and_bad_levels() {
        assert!(from_str("[server]\nhost = \"127.0.0.1:999\"").is_err());
        assert!(from_str("[server]\nhost = \"nocolon\"").is_err());
        assert!(from_str("[log]\nlevel = \"loud\"").is_err());
    }
}
