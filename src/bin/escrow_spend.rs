//! Spend a matured CLTV escrow address: discover its UTXOs, build and
//! sign the sweep transaction, and broadcast after the node accepts it.
//!
//! Usage: escrow_spend <block-height> <private-key> <expected-p2sh-address> <destination-address>
//!
//! The private key is WIF or 64-char hex. Node connection comes from
//! ESCROW_RPC_URL / ESCROW_RPC_USER / ESCROW_RPC_PASSWORD, network from
//! ESCROW_NETWORK (default testnet).

use anyhow::{bail, Context};
use cltv_escrow::config::{network_from_env, RpcConfig};
use cltv_escrow::keys::PrivateKey;
use cltv_escrow::rpc::BitcoinRpc;
use cltv_escrow::spend::spend;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let [height, private_key, expected_address, destination] = args.as_slice() else {
        bail!("usage: escrow_spend <block-height> <private-key> <expected-p2sh-address> <destination-address>");
    };

    let network = network_from_env()?;
    let height: u32 = height
        .parse()
        .with_context(|| format!("invalid block height '{}'", height))?;
    let key = PrivateKey::parse(private_key, network)?;

    let rpc = BitcoinRpc::new(RpcConfig::from_env())?;
    let report = spend(&rpc, network, height, &key, expected_address, destination)?;

    println!("Escrow address: {}", report.address);
    println!("Total input: {} sat, fee: {} sat", report.total_amount, report.fee);
    println!("\nRaw unsigned transaction:\n{}", report.unsigned_hex);
    println!("\nRaw signed transaction:\n{}", report.signed_hex);
    println!("\nTxId: {}", report.txid);
    println!("Broadcast: {}", report.broadcast_txid);
    Ok(())
}
