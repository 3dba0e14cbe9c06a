//! Core transaction and ledger types

use crate::constants::*;
use crate::error::{EscrowError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::script::Script;

/// Hash type: 256-bit hash (internal byte order)
pub type Hash = [u8; 32];

/// Network parameter selection, threaded explicitly through every
/// derivation and signing call rather than held as process-global state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Network {
    Mainnet,
    Testnet,
    Regtest,
}

impl Network {
    pub fn p2pkh_version(&self) -> u8 {
        match self {
            Network::Mainnet => MAINNET_P2PKH_VERSION,
            Network::Testnet | Network::Regtest => TESTNET_P2PKH_VERSION,
        }
    }

    pub fn p2sh_version(&self) -> u8 {
        match self {
            Network::Mainnet => MAINNET_P2SH_VERSION,
            Network::Testnet | Network::Regtest => TESTNET_P2SH_VERSION,
        }
    }

    pub fn wif_version(&self) -> u8 {
        match self {
            Network::Mainnet => MAINNET_WIF_VERSION,
            Network::Testnet | Network::Regtest => TESTNET_WIF_VERSION,
        }
    }
}

impl FromStr for Network {
    type Err = EscrowError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "main" | "mainnet" => Ok(Network::Mainnet),
            "test" | "testnet" => Ok(Network::Testnet),
            "regtest" => Ok(Network::Regtest),
            other => Err(EscrowError::InvalidInput(format!(
                "unknown network '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::Mainnet => write!(f, "mainnet"),
            Network::Testnet => write!(f, "testnet"),
            Network::Regtest => write!(f, "regtest"),
        }
    }
}

/// Reference to a previous transaction output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutPoint {
    pub txid: Hash,
    pub vout: u32,
}

/// Transaction input: outpoint, unlocking script, sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionInput {
    pub prevout: OutPoint,
    pub script_sig: Script,
    pub sequence: u32,
}

/// Transaction output: amount in satoshis, locking script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionOutput {
    pub value: u64,
    pub script_pubkey: Script,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub version: u32,
    pub inputs: Vec<TransactionInput>,
    pub outputs: Vec<TransactionOutput>,
    pub lock_time: u32,
}

/// Unspent output as reported by the node's `listunspent`. A point-in-time
/// snapshot, not a cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Utxo {
    pub txid: String,
    pub vout: u32,
    #[serde(default)]
    pub address: String,
    /// Amount in BTC, as the node reports it
    pub amount: f64,
    #[serde(default)]
    pub confirmations: u64,
}

/// Outcome of `testmempoolaccept` for a single transaction
#[derive(Debug, Clone)]
pub struct MempoolVerdict {
    pub allowed: bool,
    pub reject_reason: Option<String>,
}
