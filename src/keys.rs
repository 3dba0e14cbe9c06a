//! Key handling: WIF/hex private keys and SEC-encoded public keys

use crate::error::{EscrowError, Result};
use crate::hashes::hash160;
use crate::types::Network;
use secp256k1::{All, Secp256k1, SecretKey};

/// A parsed public key in its original SEC encoding (compressed or not).
/// The serialized bytes are what gets hashed into addresses and pushed
/// into unlocking scripts, so the encoding must survive round-trips.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    inner: secp256k1::PublicKey,
    compressed: bool,
}

impl PublicKey {
    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = hex::decode(s.trim())
            .map_err(|e| EscrowError::InvalidInput(format!("invalid public key hex: {}", e)))?;
        let compressed = match bytes.len() {
            33 => true,
            65 => false,
            n => {
                return Err(EscrowError::InvalidInput(format!(
                    "invalid public key length: {} bytes",
                    n
                )))
            }
        };
        let inner = secp256k1::PublicKey::from_slice(&bytes)
            .map_err(|e| EscrowError::InvalidInput(format!("invalid public key: {}", e)))?;
        Ok(PublicKey { inner, compressed })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        if self.compressed {
            self.inner.serialize().to_vec()
        } else {
            self.inner.serialize_uncompressed().to_vec()
        }
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    pub fn hash160(&self) -> [u8; 20] {
        hash160(&self.to_bytes())
    }

    pub fn inner(&self) -> &secp256k1::PublicKey {
        &self.inner
    }
}

/// A private key with the network it belongs to. Accepts WIF (the node's
/// native export format) or a raw 32-byte hex scalar.
#[derive(Clone)]
pub struct PrivateKey {
    inner: SecretKey,
    compressed: bool,
    network: Network,
}

impl PrivateKey {
    /// Parse either a WIF string or 64 hex characters. Hex keys are
    /// treated as compressed, which is what every modern wallet produces.
    pub fn parse(s: &str, network: Network) -> Result<Self> {
        let s = s.trim();
        if s.len() == 64 && s.chars().all(|c| c.is_ascii_hexdigit()) {
            Self::from_hex(s, network)
        } else {
            Self::from_wif(s, network)
        }
    }

    pub fn from_hex(s: &str, network: Network) -> Result<Self> {
        let bytes = hex::decode(s)
            .map_err(|e| EscrowError::InvalidInput(format!("invalid private key hex: {}", e)))?;
        let inner = SecretKey::from_slice(&bytes)
            .map_err(|e| EscrowError::InvalidInput(format!("invalid private key: {}", e)))?;
        Ok(PrivateKey {
            inner,
            compressed: true,
            network,
        })
    }

    pub fn from_wif(wif: &str, network: Network) -> Result<Self> {
        let decoded = bs58::decode(wif)
            .with_check(None)
            .into_vec()
            .map_err(|e| EscrowError::InvalidInput(format!("invalid WIF: {}", e)))?;
        if decoded.is_empty() || decoded[0] != network.wif_version() {
            return Err(EscrowError::InvalidInput(format!(
                "WIF version byte does not match {}",
                network
            )));
        }
        let (key_bytes, compressed) = match decoded.len() {
            34 if decoded[33] == 0x01 => (&decoded[1..33], true),
            33 => (&decoded[1..33], false),
            n => {
                return Err(EscrowError::InvalidInput(format!(
                    "invalid WIF length: {} bytes",
                    n
                )))
            }
        };
        let inner = SecretKey::from_slice(key_bytes)
            .map_err(|e| EscrowError::InvalidInput(format!("invalid private key: {}", e)))?;
        Ok(PrivateKey {
            inner,
            compressed,
            network,
        })
    }

    pub fn public_key(&self, secp: &Secp256k1<All>) -> PublicKey {
        PublicKey {
            inner: secp256k1::PublicKey::from_secret_key(secp, &self.inner),
            compressed: self.compressed,
        }
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn secret_key(&self) -> &SecretKey {
        &self.inner
    }
}

// Keep key material out of debug output.
impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateKey")
            .field("network", &self.network)
            .field("compressed", &self.compressed)
            .finish_non_exhaustive()
    }
}
