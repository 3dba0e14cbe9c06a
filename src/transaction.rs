//! Legacy transaction wire format, txid, signature hash and input signing

use crate::constants::{SIGHASH_ALL, SEQUENCE_LOCKTIME_ENABLED};
use crate::error::{EscrowError, Result};
use crate::hashes::sha256d;
use crate::keys::PrivateKey;
use crate::script::Script;
use crate::types::{Hash, OutPoint, Transaction, TransactionInput};
use secp256k1::{All, Message, Secp256k1};

/// Encode a u64 as a Bitcoin varint.
pub fn write_varint(buf: &mut Vec<u8>, n: u64) {
    if n < 0xfd {
        buf.push(n as u8);
    } else if n <= 0xffff {
        buf.push(0xfd);
        buf.extend_from_slice(&(n as u16).to_le_bytes());
    } else if n <= 0xffff_ffff {
        buf.push(0xfe);
        buf.extend_from_slice(&(n as u32).to_le_bytes());
    } else {
        buf.push(0xff);
        buf.extend_from_slice(&n.to_le_bytes());
    }
}

/// Decode a varint, advancing the cursor.
pub fn read_varint(bytes: &[u8], cursor: &mut usize) -> Result<u64> {
    let first = *bytes.get(*cursor).ok_or_else(eof)?;
    *cursor += 1;
    let (width, value) = match first {
        n @ 0..=0xfc => (0usize, u64::from(n)),
        0xfd => (2, 0),
        0xfe => (4, 0),
        0xff => (8, 0),
    };
    if width == 0 {
        return Ok(value);
    }
    let slice = bytes.get(*cursor..*cursor + width).ok_or_else(eof)?;
    *cursor += width;
    let mut out = 0u64;
    for (i, b) in slice.iter().enumerate() {
        out |= u64::from(*b) << (8 * i);
    }
    Ok(out)
}

fn eof() -> EscrowError {
    EscrowError::Serialization("truncated transaction".to_string())
}

fn read_bytes<'a>(bytes: &'a [u8], cursor: &mut usize, len: usize) -> Result<&'a [u8]> {
    let slice = bytes.get(*cursor..*cursor + len).ok_or_else(eof)?;
    *cursor += len;
    Ok(slice)
}

fn read_u32(bytes: &[u8], cursor: &mut usize) -> Result<u32> {
    let slice: [u8; 4] = read_bytes(bytes, cursor, 4)?.try_into().map_err(|_| eof())?;
    Ok(u32::from_le_bytes(slice))
}

/// Serialize a transaction to the legacy (pre-segwit) wire format.
pub fn serialize(tx: &Transaction) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(&tx.version.to_le_bytes());

    write_varint(&mut buf, tx.inputs.len() as u64);
    for input in &tx.inputs {
        buf.extend_from_slice(&input.prevout.txid);
        buf.extend_from_slice(&input.prevout.vout.to_le_bytes());
        write_varint(&mut buf, input.script_sig.len() as u64);
        buf.extend_from_slice(input.script_sig.as_bytes());
        buf.extend_from_slice(&input.sequence.to_le_bytes());
    }

    write_varint(&mut buf, tx.outputs.len() as u64);
    for output in &tx.outputs {
        buf.extend_from_slice(&output.value.to_le_bytes());
        write_varint(&mut buf, output.script_pubkey.len() as u64);
        buf.extend_from_slice(output.script_pubkey.as_bytes());
    }

    buf.extend_from_slice(&tx.lock_time.to_le_bytes());
    buf
}

pub fn to_hex(tx: &Transaction) -> String {
    hex::encode(serialize(tx))
}

/// Parse a legacy-format transaction. Trailing bytes are an error.
pub fn deserialize(bytes: &[u8]) -> Result<Transaction> {
    let mut cursor = 0usize;
    let version = read_u32(bytes, &mut cursor)?;

    let input_count = read_varint(bytes, &mut cursor)?;
    // An input serializes to at least 41 bytes; a count the remaining
    // bytes cannot satisfy must fail before any allocation
    if input_count > ((bytes.len() - cursor) / 41) as u64 {
        return Err(eof());
    }
    let mut inputs = Vec::with_capacity(input_count as usize);
    for _ in 0..input_count {
        let mut txid = [0u8; 32];
        txid.copy_from_slice(read_bytes(bytes, &mut cursor, 32)?);
        let vout = read_u32(bytes, &mut cursor)?;
        let script_len = read_varint(bytes, &mut cursor)? as usize;
        let script_sig = Script::from_bytes(read_bytes(bytes, &mut cursor, script_len)?.to_vec());
        let sequence = read_u32(bytes, &mut cursor)?;
        inputs.push(TransactionInput {
            prevout: OutPoint { txid, vout },
            script_sig,
            sequence,
        });
    }

    let output_count = read_varint(bytes, &mut cursor)?;
    // Value plus an empty script is 9 bytes, the smallest possible output
    if output_count > ((bytes.len() - cursor) / 9) as u64 {
        return Err(eof());
    }
    let mut outputs = Vec::with_capacity(output_count as usize);
    for _ in 0..output_count {
        let value_bytes: [u8; 8] = read_bytes(bytes, &mut cursor, 8)?
            .try_into()
            .map_err(|_| eof())?;
        let script_len = read_varint(bytes, &mut cursor)? as usize;
        let script_pubkey = Script::from_bytes(read_bytes(bytes, &mut cursor, script_len)?.to_vec());
        outputs.push(crate::types::TransactionOutput {
            value: u64::from_le_bytes(value_bytes),
            script_pubkey,
        });
    }

    let lock_time = read_u32(bytes, &mut cursor)?;
    if cursor != bytes.len() {
        return Err(EscrowError::Serialization(format!(
            "{} trailing bytes after transaction",
            bytes.len() - cursor
        )));
    }
    Ok(Transaction {
        version,
        inputs,
        outputs,
        lock_time,
    })
}

pub fn from_hex(raw: &str) -> Result<Transaction> {
    let bytes = hex::decode(raw)
        .map_err(|e| EscrowError::Serialization(format!("invalid transaction hex: {}", e)))?;
    deserialize(&bytes)
}

/// Transaction id: double SHA-256 of the serialized form, displayed in
/// reversed byte order.
pub fn txid(tx: &Transaction) -> String {
    let mut hash = sha256d(&serialize(tx));
    hash.reverse();
    hex::encode(hash)
}

/// Decode a displayed txid into internal byte order.
pub fn txid_to_bytes(txid: &str) -> Result<Hash> {
    let mut bytes = hex::decode(txid)
        .map_err(|e| EscrowError::InvalidInput(format!("invalid txid hex: {}", e)))?;
    if bytes.len() != 32 {
        return Err(EscrowError::InvalidInput(format!(
            "invalid txid length: {}",
            bytes.len()
        )));
    }
    bytes.reverse();
    let mut out = [0u8; 32];
    out.copy_from_slice(&bytes);
    Ok(out)
}

/// Build an input spending `prevout` with the locktime-enabled sequence
/// and an empty unlocking script.
pub fn unsigned_input(prevout: OutPoint) -> TransactionInput {
    TransactionInput {
        prevout,
        script_sig: Script::new(),
        sequence: SEQUENCE_LOCKTIME_ENABLED,
    }
}

/// Legacy SIGHASH_ALL signature hash for one input.
///
/// The preimage is the transaction with every input's unlocking script
/// blanked and the signed input's replaced by `script_code`. For a P2SH
/// input that is the redeem script, never the P2SH output script. The
/// 4-byte sighash type is appended before the double hash.
pub fn signature_hash(tx: &Transaction, input_index: usize, script_code: &Script) -> Result<Hash> {
    if input_index >= tx.inputs.len() {
        return Err(EscrowError::Serialization(format!(
            "input index {} out of range ({} inputs)",
            input_index,
            tx.inputs.len()
        )));
    }
    let mut preimage_tx = tx.clone();
    for (i, input) in preimage_tx.inputs.iter_mut().enumerate() {
        input.script_sig = if i == input_index {
            script_code.clone()
        } else {
            Script::new()
        };
    }
    let mut preimage = serialize(&preimage_tx);
    preimage.extend_from_slice(&u32::from(SIGHASH_ALL).to_le_bytes());
    Ok(sha256d(&preimage))
}

/// Sign input `input_index` against `redeem_script` and return the P2SH
/// unlocking script `[signature, pubkey, serialized redeem script]`.
///
/// Outputs must be final before this is called; any later output change
/// invalidates the signature.
pub fn sign_p2sh_input(
    secp: &Secp256k1<All>,
    tx: &Transaction,
    input_index: usize,
    redeem_script: &Script,
    key: &PrivateKey,
) -> Result<Script> {
    let sighash = signature_hash(tx, input_index, redeem_script)?;
    let message = Message::from_digest_slice(&sighash)
        .map_err(|e| EscrowError::Serialization(format!("sighash: {}", e)))?;
    let signature = secp.sign_ecdsa(&message, key.secret_key());

    let mut sig_bytes = signature.serialize_der().to_vec();
    sig_bytes.push(SIGHASH_ALL);

    let pubkey = key.public_key(secp);
    let mut script_sig = Script::new();
    script_sig
        .push_data(&sig_bytes)
        .push_data(&pubkey.to_bytes())
        .push_data(redeem_script.as_bytes());
    Ok(script_sig)
}
