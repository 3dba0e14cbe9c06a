//! The locked-UTXO spend workflow: recompute and validate the escrow
//! address, discover funds, size the fee, sign, validate against the
//! mempool, broadcast.
//!
//! A single linear pipeline. Each step's output fixes bytes the next step
//! depends on, so the order is load-bearing: outputs must be final before
//! any input is signed, and nothing is broadcast before the node accepts
//! the transaction into a simulated mempool.

use crate::address::Address;
use crate::constants::LOCKTIME_THRESHOLD;
use crate::derive::derive_address;
use crate::error::{EscrowError, Result};
use crate::fee::{fee_for_size, to_satoshis};
use crate::keys::PrivateKey;
use crate::rpc::LedgerRpc;
use crate::transaction::{self, sign_p2sh_input, txid_to_bytes, unsigned_input};
use crate::types::{Network, OutPoint, Transaction, TransactionOutput};
use secp256k1::Secp256k1;

/// Everything the spend produced, for reporting.
#[derive(Debug)]
pub struct SpendReport {
    pub address: String,
    pub total_amount: u64,
    pub fee: u64,
    pub unsigned_hex: String,
    pub signed_hex: String,
    pub txid: String,
    pub broadcast_txid: String,
}

/// Spend every UTXO locked to the escrow address derived from `height`
/// and `key`'s public key, paying the remainder after fees to
/// `destination`.
///
/// `expected_address` is the address the counterparty funded; if the
/// recomputed address disagrees the spend aborts before touching the
/// node, since signing would commit to a script the funds are not
/// actually locked by.
pub fn spend<R: LedgerRpc>(
    rpc: &R,
    network: Network,
    height: u32,
    key: &PrivateKey,
    expected_address: &str,
    destination: &str,
) -> Result<SpendReport> {
    // A tx-level locktime at or above the threshold is a timestamp, which
    // would silently change the meaning of the height-based CLTV.
    if height >= LOCKTIME_THRESHOLD {
        return Err(EscrowError::InvalidInput(format!(
            "height {} is not a block height (threshold {})",
            height, LOCKTIME_THRESHOLD
        )));
    }

    let secp = Secp256k1::new();

    // Step 1: recompute the redeem script and address, validate both
    // user-supplied addresses before any network contact.
    let recipient = key.public_key(&secp);
    let (redeem_script, derived) = derive_address(network, height, &recipient)?;
    let derived_str = derived.to_base58();
    if derived_str != expected_address.trim() {
        return Err(EscrowError::AddressMismatch {
            expected: expected_address.trim().to_string(),
            derived: derived_str,
        });
    }
    let destination = Address::from_base58(destination)?;
    // Regtest shares testnet's version bytes, so compare encodings rather
    // than enum values.
    if destination.network.p2pkh_version() != network.p2pkh_version() {
        return Err(EscrowError::InvalidInput(format!(
            "destination address is encoded for {}, not {}",
            destination.network, network
        )));
    }
    log::info!("escrow address validated: {}", derived_str);

    // Step 2: register the watch address (idempotent) and aggregate every
    // unspent output locked to it.
    rpc.import_address(&derived_str, "cltv escrow", false)?;
    let utxos = rpc.list_unspent()?;

    let mut inputs = Vec::new();
    let mut total_amount: u64 = 0;
    for utxo in utxos.iter().filter(|u| u.address == derived_str) {
        total_amount += to_satoshis(utxo.amount)?;
        inputs.push(unsigned_input(OutPoint {
            txid: txid_to_bytes(&utxo.txid)?,
            vout: utxo.vout,
        }));
    }
    if inputs.is_empty() {
        return Err(EscrowError::NoFundsAvailable(derived_str));
    }
    log::info!(
        "found {} UTXO(s) totalling {} sat on {}",
        inputs.len(),
        total_amount,
        derived_str
    );

    // Steps 3-4: assemble a throwaway transaction paying out the full
    // amount, purely to measure the serialized size for the fee.
    let sizing_tx = Transaction {
        version: 2,
        inputs: inputs.clone(),
        outputs: vec![TransactionOutput {
            value: total_amount,
            script_pubkey: destination.script_pubkey(),
        }],
        lock_time: height,
    };
    let size_bytes = transaction::serialize(&sizing_tx).len();
    let rate = rpc.estimate_smart_fee(1)?;
    let fee = fee_for_size(size_bytes, rate)?;
    if fee >= total_amount {
        return Err(EscrowError::InsufficientFunds {
            total: total_amount,
            fee,
        });
    }
    log::info!("fee {} sat for {} bytes at {} BTC/kB", fee, size_bytes, rate);

    // Step 5: the real unsigned transaction, fee-adjusted.
    let mut tx = Transaction {
        outputs: vec![TransactionOutput {
            value: total_amount - fee,
            script_pubkey: destination.script_pubkey(),
        }],
        ..sizing_tx
    };
    let unsigned_hex = transaction::to_hex(&tx);

    // Step 6: sign each input against the redeem script. Outputs are
    // final at this point; signatures are independent per input.
    for index in 0..tx.inputs.len() {
        let script_sig = sign_p2sh_input(&secp, &tx, index, &redeem_script, key)?;
        tx.inputs[index].script_sig = script_sig;
    }
    let signed_hex = transaction::to_hex(&tx);
    let txid = transaction::txid(&tx);
    log::info!("signed transaction {}", txid);

    // Step 7: mempool-acceptance gate, then broadcast.
    let verdict = rpc.test_mempool_accept(&signed_hex)?;
    if !verdict.allowed {
        return Err(EscrowError::RejectedByNetwork(
            verdict
                .reject_reason
                .unwrap_or_else(|| "no reason given".to_string()),
        ));
    }
    let broadcast_txid = rpc.send_raw_transaction(&signed_hex)?;
    log::info!("broadcast accepted: {}", broadcast_txid);

    Ok(SpendReport {
        address: derived_str,
        total_amount,
        fee,
        unsigned_hex,
        signed_hex,
        txid,
        broadcast_txid,
    })
}
