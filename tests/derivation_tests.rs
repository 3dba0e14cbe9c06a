//! Integration tests for escrow address derivation through the public API

use cltv_escrow::derive::derive_address;
use cltv_escrow::hashes::hash160;
use cltv_escrow::keys::{PrivateKey, PublicKey};
use cltv_escrow::types::Network;
use secp256k1::Secp256k1;

const KEY_A: &str = "0101010101010101010101010101010101010101010101010101010101010101";
const KEY_B: &str = "0202020202020202020202020202020202020202020202020202020202020202";

fn pubkey(hex: &str) -> PublicKey {
    let secp = Secp256k1::new();
    PrivateKey::from_hex(hex, Network::Testnet)
        .unwrap()
        .public_key(&secp)
}

#[test]
fn test_two_parties_recompute_identical_address() {
    // Both sides derive independently from the same (height, pubkey) pair;
    // the encoded strings must match exactly.
    let shared = pubkey(KEY_A).to_hex();

    let (script_1, addr_1) =
        derive_address(Network::Testnet, 500_000, &PublicKey::from_hex(&shared).unwrap()).unwrap();
    let (script_2, addr_2) =
        derive_address(Network::Testnet, 500_000, &PublicKey::from_hex(&shared).unwrap()).unwrap();

    assert_eq!(script_1.as_bytes(), script_2.as_bytes());
    assert_eq!(addr_1.to_base58(), addr_2.to_base58());
}

#[test]
fn test_address_is_hash160_of_exact_script_bytes() {
    let pk = pubkey(KEY_A);
    // Heights exercising every script-number width, including the
    // locktime threshold boundary
    for height in [0u32, 1, 16, 17, 127, 128, 32_767, 500_000, 499_999_999, 500_000_000] {
        let (script, addr) = derive_address(Network::Testnet, height, &pk).unwrap();
        assert_eq!(addr.hash, hash160(script.as_bytes()), "height {}", height);
    }
}

#[test]
fn test_redeem_script_template_scenario() {
    // height 500_000 with a known pubkey: the script must be exactly
    // <500000> CLTV DROP DUP HASH160 <hash160(pubkey)> EQUALVERIFY CHECKSIG
    let pk = pubkey(KEY_A);
    let (script, _) = derive_address(Network::Testnet, 500_000, &pk).unwrap();

    let mut expected = vec![0x03, 0x20, 0xa1, 0x07, 0xb1, 0x75, 0x76, 0xa9, 0x14];
    expected.extend_from_slice(&pk.hash160());
    expected.extend_from_slice(&[0x88, 0xac]);
    assert_eq!(script.as_bytes(), expected.as_slice());
}

#[test]
fn test_distinct_inputs_distinct_addresses() {
    let (_, by_height_a) = derive_address(Network::Testnet, 100_000, &pubkey(KEY_A)).unwrap();
    let (_, by_height_b) = derive_address(Network::Testnet, 100_001, &pubkey(KEY_A)).unwrap();
    let (_, by_key_b) = derive_address(Network::Testnet, 100_000, &pubkey(KEY_B)).unwrap();

    assert_ne!(by_height_a.to_base58(), by_height_b.to_base58());
    assert_ne!(by_height_a.to_base58(), by_key_b.to_base58());
}

#[test]
fn test_network_changes_encoding_not_script() {
    let pk = pubkey(KEY_A);
    let (script_test, addr_test) = derive_address(Network::Testnet, 250_000, &pk).unwrap();
    let (script_main, addr_main) = derive_address(Network::Mainnet, 250_000, &pk).unwrap();

    assert_eq!(script_test, script_main);
    assert_ne!(addr_test.to_base58(), addr_main.to_base58());
    assert!(addr_test.to_base58().starts_with('2'));
    assert!(addr_main.to_base58().starts_with('3'));
}

#[test]
fn test_uncompressed_key_derives_differently() {
    // hash160 runs over the SEC bytes, so the two encodings of the same
    // point are different recipients.
    let secp = Secp256k1::new();
    let sk = PrivateKey::from_hex(KEY_A, Network::Testnet).unwrap();
    let compressed = sk.public_key(&secp);
    let uncompressed_hex = {
        let inner = secp256k1::PublicKey::from_slice(&compressed.to_bytes()).unwrap();
        hex::encode(inner.serialize_uncompressed())
    };
    let uncompressed = PublicKey::from_hex(&uncompressed_hex).unwrap();

    let (_, a) = derive_address(Network::Testnet, 100, &compressed).unwrap();
    let (_, b) = derive_address(Network::Testnet, 100, &uncompressed).unwrap();
    assert_ne!(a.to_base58(), b.to_base58());
}

#[test]
fn test_malformed_public_key_is_invalid_input() {
    assert!(PublicKey::from_hex("0341").is_err());
    assert!(PublicKey::from_hex("not hex at all").is_err());
}
