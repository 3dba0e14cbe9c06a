//! Hash primitives shared by scripts, keys and transactions

use bitcoin_hashes::{sha256d, Hash as BitcoinHash, HashEngine};
use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

/// hash160 = RIPEMD160(SHA256(data))
pub fn hash160(data: &[u8]) -> [u8; 20] {
    let sha = Sha256::digest(data);
    let ripe = Ripemd160::digest(sha);
    let mut out = [0u8; 20];
    out.copy_from_slice(&ripe);
    out
}

/// Double SHA-256
pub fn sha256d(data: &[u8]) -> [u8; 32] {
    let mut hasher = sha256d::Hash::engine();
    hasher.input(data);
    let result = sha256d::Hash::from_engine(hasher);
    let mut out = [0u8; 32];
    out.copy_from_slice(&result);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash160_length_and_determinism() {
        let a = hash160(b"escrow");
        let b = hash160(b"escrow");
        assert_eq!(a, b);
        assert_eq!(a.len(), 20);
        assert_ne!(a, hash160(b"escrow2"));
    }

    #[test]
    fn test_sha256d_empty() {
        // Double SHA-256 of the empty string, a fixed vector
        let h = sha256d(b"");
        assert_eq!(
            hex::encode(h),
            "5df6e0e2761359d30a8275058e299fcc0381534545f55cf43e41983f5d4c9456"
        );
    }
}
