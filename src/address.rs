//! Base58check addresses (P2PKH and P2SH) with explicit network context

use crate::error::{EscrowError, Result};
use crate::hashes::hash160;
use crate::script::{p2pkh_script, p2sh_script, Script};
use crate::types::Network;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressKind {
    P2pkh,
    P2sh,
}

/// A decoded address: kind, payload hash and the network whose version
/// byte it carries. Two addresses are equal iff their encoded forms are,
/// which the field-wise equality below matches exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    pub kind: AddressKind,
    pub hash: [u8; 20],
    pub network: Network,
}

impl Address {
    /// P2SH address committing to the given redeem script
    pub fn p2sh(network: Network, redeem_script: &Script) -> Self {
        Address {
            kind: AddressKind::P2sh,
            hash: hash160(redeem_script.as_bytes()),
            network,
        }
    }

    /// P2PKH address for a serialized public key
    pub fn p2pkh(network: Network, pubkey_bytes: &[u8]) -> Self {
        Address {
            kind: AddressKind::P2pkh,
            hash: hash160(pubkey_bytes),
            network,
        }
    }

    /// Decode a base58check address, inferring kind and network from the
    /// version byte.
    pub fn from_base58(s: &str) -> Result<Self> {
        let decoded = bs58::decode(s.trim())
            .with_check(None)
            .into_vec()
            .map_err(|e| EscrowError::InvalidInput(format!("invalid address '{}': {}", s, e)))?;
        if decoded.len() != 21 {
            return Err(EscrowError::InvalidInput(format!(
                "invalid address payload length: {}",
                decoded.len()
            )));
        }
        let (kind, network) = match decoded[0] {
            crate::constants::MAINNET_P2PKH_VERSION => (AddressKind::P2pkh, Network::Mainnet),
            crate::constants::MAINNET_P2SH_VERSION => (AddressKind::P2sh, Network::Mainnet),
            crate::constants::TESTNET_P2PKH_VERSION => (AddressKind::P2pkh, Network::Testnet),
            crate::constants::TESTNET_P2SH_VERSION => (AddressKind::P2sh, Network::Testnet),
            other => {
                return Err(EscrowError::InvalidInput(format!(
                    "unknown address version byte 0x{:02x}",
                    other
                )))
            }
        };
        let mut hash = [0u8; 20];
        hash.copy_from_slice(&decoded[1..21]);
        Ok(Address { kind, hash, network })
    }

    pub fn to_base58(&self) -> String {
        let version = match self.kind {
            AddressKind::P2pkh => self.network.p2pkh_version(),
            AddressKind::P2sh => self.network.p2sh_version(),
        };
        let mut payload = Vec::with_capacity(21);
        payload.push(version);
        payload.extend_from_slice(&self.hash);
        bs58::encode(payload).with_check().into_string()
    }

    /// The locking script paying to this address
    pub fn script_pubkey(&self) -> Script {
        match self.kind {
            AddressKind::P2pkh => p2pkh_script(&self.hash),
            AddressKind::P2sh => p2sh_script(&self.hash),
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_base58())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::cltv_p2pkh_redeem_script;

    #[test]
    fn test_encode_decode_round_trip() {
        let addr = Address {
            kind: AddressKind::P2sh,
            hash: [0x42; 20],
            network: Network::Testnet,
        };
        let encoded = addr.to_base58();
        let decoded = Address::from_base58(&encoded).unwrap();
        assert_eq!(decoded, addr);
    }

    #[test]
    fn test_p2sh_binds_to_redeem_script_bytes() {
        let redeem = cltv_p2pkh_redeem_script(500_000, &[0xab; 20]);
        let addr = Address::p2sh(Network::Testnet, &redeem);
        assert_eq!(addr.hash, crate::hashes::hash160(redeem.as_bytes()));
    }

    #[test]
    fn test_network_version_bytes_differ() {
        let main = Address {
            kind: AddressKind::P2sh,
            hash: [0x42; 20],
            network: Network::Mainnet,
        };
        let test = Address {
            kind: AddressKind::P2sh,
            hash: [0x42; 20],
            network: Network::Testnet,
        };
        assert_ne!(main.to_base58(), test.to_base58());
        // Testnet P2SH addresses start with '2'
        assert!(test.to_base58().starts_with('2'));
        // Mainnet P2SH addresses start with '3'
        assert!(main.to_base58().starts_with('3'));
    }

    #[test]
    fn test_from_base58_rejects_garbage() {
        assert!(Address::from_base58("not-an-address").is_err());
        assert!(Address::from_base58("").is_err());
    }

    #[test]
    fn test_script_pubkey_kinds() {
        let p2pkh = Address {
            kind: AddressKind::P2pkh,
            hash: [0x01; 20],
            network: Network::Mainnet,
        };
        assert_eq!(p2pkh.script_pubkey().len(), 25);

        let p2sh = Address {
            kind: AddressKind::P2sh,
            hash: [0x01; 20],
            network: Network::Mainnet,
        };
        assert!(p2sh.script_pubkey().is_p2sh());
    }

    #[test]
    fn test_known_mainnet_address_decodes() {
        // The genesis block's coinbase address
        let addr = Address::from_base58("1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa").unwrap();
        assert_eq!(addr.kind, AddressKind::P2pkh);
        assert_eq!(addr.network, Network::Mainnet);
        assert_eq!(addr.to_base58(), "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa");
    }
}
