//! Deterministic escrow address derivation.
//!
//! Pure and referentially transparent: both parties recompute the script
//! and address independently from the same (height, public key) pair, so
//! nothing here touches I/O or ambient state.

use crate::address::Address;
use crate::error::Result;
use crate::keys::PublicKey;
use crate::script::{cltv_p2pkh_redeem_script, Script};
use crate::types::Network;

/// Build the CLTV+P2PKH redeem script for `height` and `recipient`, and
/// the P2SH address committing to it.
pub fn derive_address(
    network: Network,
    height: u32,
    recipient: &PublicKey,
) -> Result<(Script, Address)> {
    let redeem_script = cltv_p2pkh_redeem_script(height, &recipient.hash160());
    let address = Address::p2sh(network, &redeem_script);
    Ok((redeem_script, address))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::PrivateKey;
    use secp256k1::Secp256k1;

    fn test_pubkey() -> PublicKey {
        let secp = Secp256k1::new();
        PrivateKey::from_hex(
            "0202020202020202020202020202020202020202020202020202020202020202",
            Network::Testnet,
        )
        .unwrap()
        .public_key(&secp)
    }

    #[test]
    fn test_derive_is_deterministic() {
        let pk = test_pubkey();
        let (script_a, addr_a) = derive_address(Network::Testnet, 500_000, &pk).unwrap();
        let (script_b, addr_b) = derive_address(Network::Testnet, 500_000, &pk).unwrap();
        assert_eq!(script_a, script_b);
        assert_eq!(addr_a.to_base58(), addr_b.to_base58());
    }

    #[test]
    fn test_address_binds_to_script() {
        let pk = test_pubkey();
        for height in [0u32, 1, 16, 17, 500_000, 499_999_999, 500_000_000] {
            let (script, addr) = derive_address(Network::Testnet, height, &pk).unwrap();
            assert_eq!(
                addr.hash,
                crate::hashes::hash160(script.as_bytes()),
                "height {}",
                height
            );
        }
    }

    #[test]
    fn test_different_heights_different_addresses() {
        let pk = test_pubkey();
        let (_, a) = derive_address(Network::Testnet, 100, &pk).unwrap();
        let (_, b) = derive_address(Network::Testnet, 101, &pk).unwrap();
        assert_ne!(a, b);
    }
}
