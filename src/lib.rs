//! # cltv-escrow
//!
//! Time-locked escrow on a UTXO ledger: derive a P2SH address whose
//! redeem script enforces an absolute block-height lock
//! (OP_CHECKLOCKTIMEVERIFY) in front of a standard P2PKH check, and spend
//! it once the lock matures.
//!
//! Two entry points, mirroring the two roles:
//!
//! - [`derive::derive_address`]: pure derivation of the redeem script
//!   and P2SH address from a maturity height and a recipient public key.
//!   Both parties recompute it independently; same inputs, same address.
//! - [`spend::spend`]: the full spend workflow against a node: validate
//!   the recomputed address, aggregate every UTXO locked to it, size and
//!   subtract the fee, sign each input against the redeem script, and
//!   broadcast only after the node's mempool-acceptance check passes.
//!
//! The network (address version bytes) is an explicit [`types::Network`]
//! value threaded through every call, never hidden process state.
//!
//! ## Example
//!
//! ```rust
//! use cltv_escrow::derive::derive_address;
//! use cltv_escrow::keys::PublicKey;
//! use cltv_escrow::types::Network;
//!
//! let recipient = PublicKey::from_hex(
//!     "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798",
//! ).unwrap();
//! let (redeem_script, address) =
//!     derive_address(Network::Testnet, 500_000, &recipient).unwrap();
//! assert!(address.to_base58().starts_with('2'));
//! assert_eq!(redeem_script.as_bytes()[4], 0xb1); // OP_CHECKLOCKTIMEVERIFY
//! ```

pub mod address;
pub mod config;
pub mod constants;
pub mod derive;
pub mod error;
pub mod fee;
pub mod hashes;
pub mod interpreter;
pub mod keys;
pub mod rpc;
pub mod script;
pub mod spend;
pub mod transaction;
pub mod types;

// Re-export commonly used types
pub use address::{Address, AddressKind};
pub use error::{EscrowError, Result};
pub use keys::{PrivateKey, PublicKey};
pub use script::Script;
pub use spend::{spend, SpendReport};
pub use types::{Network, Transaction, Utxo};
