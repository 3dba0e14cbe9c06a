//! Derive the time-locked escrow P2SH address for a maturity height and a
//! recipient public key.
//!
//! Usage: escrow_address <block-height> <public-key-hex>
//!
//! Network selection comes from ESCROW_NETWORK (main/test/regtest),
//! defaulting to testnet.

use anyhow::{bail, Context};
use cltv_escrow::config::network_from_env;
use cltv_escrow::derive::derive_address;
use cltv_escrow::keys::PublicKey;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let [height, pubkey_hex] = args.as_slice() else {
        bail!("usage: escrow_address <block-height> <public-key-hex>");
    };

    let network = network_from_env()?;
    let height: u32 = height
        .parse()
        .with_context(|| format!("invalid block height '{}'", height))?;
    let recipient = PublicKey::from_hex(pubkey_hex)?;

    let (_, address) = derive_address(network, height, &recipient)?;
    println!("{}", address);
    Ok(())
}
