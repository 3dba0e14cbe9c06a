//! Environment-backed configuration for the node connection and network
//! selection. Defaults target a local testnet node, matching the workflow
//! this crate automates.

use crate::error::Result;
use crate::types::Network;
use std::env;

const DEFAULT_RPC_URL: &str = "http://127.0.0.1:18332";

/// JSON-RPC connection settings.
#[derive(Debug, Clone)]
pub struct RpcConfig {
    pub url: String,
    pub user: String,
    pub password: String,
}

impl RpcConfig {
    /// Read `ESCROW_RPC_URL`, `ESCROW_RPC_USER` and `ESCROW_RPC_PASSWORD`.
    pub fn from_env() -> Self {
        RpcConfig {
            url: env::var("ESCROW_RPC_URL").unwrap_or_else(|_| DEFAULT_RPC_URL.to_string()),
            user: env::var("ESCROW_RPC_USER").unwrap_or_default(),
            password: env::var("ESCROW_RPC_PASSWORD").unwrap_or_default(),
        }
    }
}

/// Network selection from `ESCROW_NETWORK` ("main"/"test"/"regtest"),
/// defaulting to testnet. Read once at startup; the parsed value is then
/// threaded explicitly through every derivation and signing call.
pub fn network_from_env() -> Result<Network> {
    match env::var("ESCROW_NETWORK") {
        Ok(value) => value.parse(),
        Err(_) => Ok(Network::Testnet),
    }
}
