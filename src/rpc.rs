//! Ledger node access: the RPC surface the orchestrator needs, and a
//! blocking JSON-RPC client over HTTP basic auth.
//!
//! Every call is a single request/response with no implicit retry; a
//! failed or timed-out call surfaces as `NetworkUnavailable` and the
//! caller decides what that means for the workflow.

use crate::config::RpcConfig;
use crate::error::{EscrowError, Result};
use crate::types::{MempoolVerdict, Utxo};
use serde_json::{json, Value};
use std::time::Duration;

/// The node operations the spend workflow depends on. A trait seam so
/// tests can drive the orchestrator with a scripted ledger.
pub trait LedgerRpc {
    /// Register a watch-only address. Idempotent: repeat registration of
    /// the same address must not error.
    fn import_address(&self, address: &str, label: &str, rescan: bool) -> Result<()>;

    fn list_unspent(&self) -> Result<Vec<Utxo>>;

    /// Fee rate in BTC per kB for confirmation within `target_blocks`.
    fn estimate_smart_fee(&self, target_blocks: u32) -> Result<f64>;

    fn test_mempool_accept(&self, raw_tx_hex: &str) -> Result<MempoolVerdict>;

    /// Broadcast. The only call with an irreversible external effect.
    fn send_raw_transaction(&self, raw_tx_hex: &str) -> Result<String>;
}

/// JSON-RPC client for a Bitcoin Core compatible node.
pub struct BitcoinRpc {
    http: reqwest::blocking::Client,
    config: RpcConfig,
}

impl BitcoinRpc {
    pub fn new(config: RpcConfig) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| EscrowError::NetworkUnavailable(format!("http client: {}", e)))?;
        Ok(BitcoinRpc { http, config })
    }

    fn call(&self, method: &str, params: Value) -> Result<Value> {
        let body = json!({
            "jsonrpc": "1.0",
            "id": "cltv-escrow",
            "method": method,
            "params": params,
        });
        log::debug!("rpc call: {}", method);
        let response = self
            .http
            .post(&self.config.url)
            .basic_auth(&self.config.user, Some(&self.config.password))
            .json(&body)
            .send()
            .map_err(|e| EscrowError::NetworkUnavailable(format!("{}: {}", method, e)))?;
        let payload: Value = response
            .json()
            .map_err(|e| EscrowError::NetworkUnavailable(format!("{}: {}", method, e)))?;
        if !payload["error"].is_null() {
            return Err(EscrowError::NetworkUnavailable(format!(
                "{}: node error {}",
                method, payload["error"]
            )));
        }
        Ok(payload["result"].clone())
    }
}

impl LedgerRpc for BitcoinRpc {
    fn import_address(&self, address: &str, label: &str, rescan: bool) -> Result<()> {
        self.call("importaddress", json!([address, label, rescan]))?;
        Ok(())
    }

    fn list_unspent(&self) -> Result<Vec<Utxo>> {
        let result = self.call("listunspent", json!([]))?;
        serde_json::from_value(result)
            .map_err(|e| EscrowError::NetworkUnavailable(format!("listunspent: {}", e)))
    }

    fn estimate_smart_fee(&self, target_blocks: u32) -> Result<f64> {
        let result = self.call("estimatesmartfee", json!([target_blocks]))?;
        result["feerate"].as_f64().ok_or_else(|| {
            EscrowError::NetworkUnavailable(format!(
                "estimatesmartfee returned no feerate: {}",
                result
            ))
        })
    }

    fn test_mempool_accept(&self, raw_tx_hex: &str) -> Result<MempoolVerdict> {
        let result = self.call("testmempoolaccept", json!([[raw_tx_hex]]))?;
        let entry = result.get(0).ok_or_else(|| {
            EscrowError::NetworkUnavailable("testmempoolaccept returned no entries".to_string())
        })?;
        Ok(MempoolVerdict {
            allowed: entry["allowed"].as_bool().unwrap_or(false),
            reject_reason: entry["reject-reason"].as_str().map(str::to_owned),
        })
    }

    fn send_raw_transaction(&self, raw_tx_hex: &str) -> Result<String> {
        let result = self.call("sendrawtransaction", json!([raw_tx_hex]))?;
        result
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| {
                EscrowError::NetworkUnavailable(format!(
                    "sendrawtransaction returned no txid: {}",
                    result
                ))
            })
    }
}
