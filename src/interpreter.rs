//! Script interpreter for the escrow spend path.
//!
//! Covers the opcodes the CLTV+P2PKH templates use, with real ECDSA
//! checking against the transaction sighash and BIP-65 locktime rules.
//! P2SH outputs are executed twice: once as the hash check, then the
//! revealed redeem script against the remaining unlocking data.

use crate::constants::*;
use crate::error::{EscrowError, Result};
use crate::hashes::hash160;
use crate::script::{script_num_decode, Script};
use crate::transaction::signature_hash;
use crate::types::Transaction;
use secp256k1::{ecdsa::Signature, Message, PublicKey, Secp256k1};

/// Transaction context for OP_CHECKSIG and OP_CHECKLOCKTIMEVERIFY.
pub struct TransactionChecker<'a> {
    pub tx: &'a Transaction,
    pub input_index: usize,
}

/// Verify one input's unlocking script against a locking script,
/// including the P2SH redeem path.
pub fn verify_input(tx: &Transaction, input_index: usize, script_pubkey: &Script) -> Result<bool> {
    let input = tx.inputs.get(input_index).ok_or_else(|| {
        EscrowError::ScriptExecution(format!("no input at index {}", input_index))
    })?;
    let checker = TransactionChecker { tx, input_index };

    // Unlocking scripts must be push-only; anything else is non-standard
    // and would break the P2SH stack-copy rule.
    let pushes = collect_pushes(input.script_sig.as_bytes())?;
    let mut stack: Vec<Vec<u8>> = pushes.clone();

    if !eval_script(script_pubkey.as_bytes(), &mut stack, &checker)? {
        return Ok(false);
    }
    if !stack_top_is_true(&stack) {
        return Ok(false);
    }

    if script_pubkey.is_p2sh() {
        let mut redeem_stack = pushes;
        let redeem_bytes = redeem_stack.pop().ok_or_else(|| {
            EscrowError::ScriptExecution("P2SH spend with empty unlocking script".to_string())
        })?;
        if !eval_script(&redeem_bytes, &mut redeem_stack, &checker)? {
            return Ok(false);
        }
        return Ok(stack_top_is_true(&redeem_stack));
    }

    Ok(true)
}

fn stack_top_is_true(stack: &[Vec<u8>]) -> bool {
    stack.last().map_or(false, |top| cast_to_bool(top))
}

/// Script truthiness: any non-zero byte, ignoring a negative-zero sign bit.
fn cast_to_bool(data: &[u8]) -> bool {
    for (i, b) in data.iter().enumerate() {
        if *b != 0 {
            return !(i == data.len() - 1 && *b == 0x80);
        }
    }
    false
}

/// Split a push-only script into its pushed elements.
fn collect_pushes(script: &[u8]) -> Result<Vec<Vec<u8>>> {
    let mut pushes = Vec::new();
    let mut pc = 0usize;
    while pc < script.len() {
        let opcode = script[pc];
        pc += 1;
        match opcode {
            OP_0 => pushes.push(Vec::new()),
            0x01..=0x4b => {
                let len = opcode as usize;
                pushes.push(read_push(script, &mut pc, len)?);
            }
            OP_PUSHDATA1 => {
                let len = *script.get(pc).ok_or_else(truncated)? as usize;
                pc += 1;
                pushes.push(read_push(script, &mut pc, len)?);
            }
            OP_PUSHDATA2 => {
                let bytes: [u8; 2] = script
                    .get(pc..pc + 2)
                    .ok_or_else(truncated)?
                    .try_into()
                    .map_err(|_| truncated())?;
                pc += 2;
                pushes.push(read_push(script, &mut pc, u16::from_le_bytes(bytes) as usize)?);
            }
            op @ OP_1..=OP_16 => pushes.push(vec![op - OP_1 + 1]),
            OP_1NEGATE => pushes.push(vec![0x81]),
            other => {
                return Err(EscrowError::ScriptExecution(format!(
                    "non-push opcode 0x{:02x} in unlocking script",
                    other
                )))
            }
        }
    }
    Ok(pushes)
}

fn read_push(script: &[u8], pc: &mut usize, len: usize) -> Result<Vec<u8>> {
    let data = script.get(*pc..*pc + len).ok_or_else(truncated)?.to_vec();
    *pc += len;
    Ok(data)
}

fn truncated() -> EscrowError {
    EscrowError::ScriptExecution("truncated push in script".to_string())
}

/// Execute a script against the stack. Returns false on a failed check,
/// errors on structural violations (truncated pushes, limits).
pub fn eval_script(
    script: &[u8],
    stack: &mut Vec<Vec<u8>>,
    checker: &TransactionChecker<'_>,
) -> Result<bool> {
    let mut pc = 0usize;
    let mut op_count = 0usize;

    while pc < script.len() {
        let opcode = script[pc];
        pc += 1;

        if stack.len() > MAX_STACK_SIZE {
            return Err(EscrowError::ScriptExecution("stack overflow".to_string()));
        }

        // Data pushes do not count against the operation limit
        match opcode {
            OP_0 => {
                stack.push(Vec::new());
                continue;
            }
            0x01..=0x4b => {
                stack.push(read_push(script, &mut pc, opcode as usize)?);
                continue;
            }
            OP_PUSHDATA1 => {
                let len = *script.get(pc).ok_or_else(truncated)? as usize;
                pc += 1;
                stack.push(read_push(script, &mut pc, len)?);
                continue;
            }
            OP_PUSHDATA2 => {
                let bytes: [u8; 2] = script
                    .get(pc..pc + 2)
                    .ok_or_else(truncated)?
                    .try_into()
                    .map_err(|_| truncated())?;
                pc += 2;
                stack.push(read_push(script, &mut pc, u16::from_le_bytes(bytes) as usize)?);
                continue;
            }
            op @ OP_1..=OP_16 => {
                stack.push(vec![op - OP_1 + 1]);
                continue;
            }
            OP_1NEGATE => {
                stack.push(vec![0x81]);
                continue;
            }
            _ => {}
        }

        op_count += 1;
        if op_count > MAX_SCRIPT_OPS {
            return Err(EscrowError::ScriptExecution(
                "operation limit exceeded".to_string(),
            ));
        }

        match opcode {
            OP_DUP => {
                let top = match stack.last() {
                    Some(item) => item.clone(),
                    None => return Ok(false),
                };
                stack.push(top);
            }

            OP_DROP => {
                if stack.pop().is_none() {
                    return Ok(false);
                }
            }

            OP_HASH160 => {
                let item = match stack.pop() {
                    Some(item) => item,
                    None => return Ok(false),
                };
                stack.push(hash160(&item).to_vec());
            }

            OP_EQUAL => {
                if stack.len() < 2 {
                    return Ok(false);
                }
                let a = stack.pop().unwrap();
                let b = stack.pop().unwrap();
                stack.push(if a == b { vec![1] } else { vec![] });
            }

            OP_EQUALVERIFY => {
                if stack.len() < 2 {
                    return Ok(false);
                }
                let a = stack.pop().unwrap();
                let b = stack.pop().unwrap();
                if a != b {
                    return Ok(false);
                }
            }

            OP_VERIFY => match stack.pop() {
                Some(top) if cast_to_bool(&top) => {}
                _ => return Ok(false),
            },

            OP_CHECKSIG => {
                if stack.len() < 2 {
                    return Ok(false);
                }
                let pubkey_bytes = stack.pop().unwrap();
                let sig_bytes = stack.pop().unwrap();
                let ok = check_signature(checker, script, &pubkey_bytes, &sig_bytes)?;
                stack.push(if ok { vec![1] } else { vec![] });
            }

            OP_CHECKLOCKTIMEVERIFY => {
                if !check_lock_time(checker, stack)? {
                    return Ok(false);
                }
            }

            other => {
                return Err(EscrowError::ScriptExecution(format!(
                    "unsupported opcode 0x{:02x}",
                    other
                )))
            }
        }
    }

    Ok(true)
}

/// BIP-65: the operand must be a non-negative script number of the same
/// locktime type as the transaction's, not greater than it, and the input
/// must not carry a final sequence.
fn check_lock_time(checker: &TransactionChecker<'_>, stack: &mut Vec<Vec<u8>>) -> Result<bool> {
    // CLTV peeks; the template's OP_DROP removes the operand afterwards
    let operand = match stack.last() {
        Some(item) => item.clone(),
        None => return Ok(false),
    };
    let lock_value = script_num_decode(&operand)?;
    if lock_value < 0 {
        return Ok(false);
    }
    let lock_value = lock_value as u64;
    let tx_lock_time = u64::from(checker.tx.lock_time);

    let threshold = u64::from(LOCKTIME_THRESHOLD);
    if (lock_value < threshold) != (tx_lock_time < threshold) {
        return Ok(false);
    }
    if lock_value > tx_lock_time {
        return Ok(false);
    }
    if checker.tx.inputs[checker.input_index].sequence == SEQUENCE_FINAL {
        return Ok(false);
    }
    Ok(true)
}

fn check_signature(
    checker: &TransactionChecker<'_>,
    script_code: &[u8],
    pubkey_bytes: &[u8],
    sig_bytes: &[u8],
) -> Result<bool> {
    // Empty signature is an ordinary failure, not an error
    let Some((&sighash_type, der)) = sig_bytes.split_last() else {
        return Ok(false);
    };
    if sighash_type != SIGHASH_ALL {
        return Ok(false);
    }
    let pubkey = match PublicKey::from_slice(pubkey_bytes) {
        Ok(pk) => pk,
        Err(_) => return Ok(false),
    };
    let signature = match Signature::from_der(der) {
        Ok(sig) => sig,
        Err(_) => return Ok(false),
    };

    let sighash = signature_hash(
        checker.tx,
        checker.input_index,
        &Script::from_bytes(script_code.to_vec()),
    )?;
    let message = Message::from_digest_slice(&sighash)
        .map_err(|e| EscrowError::ScriptExecution(format!("sighash: {}", e)))?;

    let secp = Secp256k1::verification_only();
    Ok(secp.verify_ecdsa(&message, &signature, &pubkey).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::cltv_p2pkh_redeem_script;
    use crate::transaction::{sign_p2sh_input, unsigned_input};
    use crate::types::{Network, OutPoint, TransactionOutput};
    use crate::keys::PrivateKey;

    const KEY_HEX: &str = "0101010101010101010101010101010101010101010101010101010101010101";

    fn locked_spend(height: u32, lock_time: u32, sequence: u32) -> (Transaction, Script) {
        let secp = Secp256k1::new();
        let key = PrivateKey::from_hex(KEY_HEX, Network::Regtest).unwrap();
        let redeem = cltv_p2pkh_redeem_script(height, &key.public_key(&secp).hash160());

        let mut input = unsigned_input(OutPoint {
            txid: [0x33; 32],
            vout: 0,
        });
        input.sequence = sequence;
        let mut tx = Transaction {
            version: 2,
            inputs: vec![input],
            outputs: vec![TransactionOutput {
                value: 50_000,
                script_pubkey: crate::script::p2pkh_script(&[0x44; 20]),
            }],
            lock_time,
        };
        tx.inputs[0].script_sig = sign_p2sh_input(&secp, &tx, 0, &redeem, &key).unwrap();
        (tx, redeem)
    }

    fn p2sh_script_pubkey(redeem: &Script) -> Script {
        crate::script::p2sh_script(&hash160(redeem.as_bytes()))
    }

    #[test]
    fn test_cltv_p2sh_spend_verifies() {
        let (tx, redeem) = locked_spend(500_000, 500_000, SEQUENCE_LOCKTIME_ENABLED);
        assert!(verify_input(&tx, 0, &p2sh_script_pubkey(&redeem)).unwrap());
    }

    #[test]
    fn test_cltv_fails_when_lock_time_below_height() {
        let (tx, redeem) = locked_spend(500_000, 499_999, SEQUENCE_LOCKTIME_ENABLED);
        assert!(!verify_input(&tx, 0, &p2sh_script_pubkey(&redeem)).unwrap());
    }

    #[test]
    fn test_cltv_fails_on_final_sequence() {
        let (tx, redeem) = locked_spend(500_000, 500_000, SEQUENCE_FINAL);
        assert!(!verify_input(&tx, 0, &p2sh_script_pubkey(&redeem)).unwrap());
    }

    #[test]
    fn test_cltv_fails_on_locktime_type_mismatch() {
        // Script wants a block height, transaction carries a timestamp
        let (tx, redeem) = locked_spend(500_000, LOCKTIME_THRESHOLD, SEQUENCE_LOCKTIME_ENABLED);
        assert!(!verify_input(&tx, 0, &p2sh_script_pubkey(&redeem)).unwrap());
    }

    #[test]
    fn test_wrong_script_hash_fails() {
        let (tx, _) = locked_spend(500_000, 500_000, SEQUENCE_LOCKTIME_ENABLED);
        let other = crate::script::p2sh_script(&[0x55; 20]);
        assert!(!verify_input(&tx, 0, &other).unwrap());
    }

    #[test]
    fn test_tampered_output_invalidates_signature() {
        let (mut tx, redeem) = locked_spend(500_000, 500_000, SEQUENCE_LOCKTIME_ENABLED);
        tx.outputs[0].value += 1;
        assert!(!verify_input(&tx, 0, &p2sh_script_pubkey(&redeem)).unwrap());
    }

    #[test]
    fn test_non_push_unlocking_script_rejected() {
        let (mut tx, redeem) = locked_spend(500_000, 500_000, SEQUENCE_LOCKTIME_ENABLED);
        let mut bad = tx.inputs[0].script_sig.clone().into_bytes();
        bad.push(OP_DUP);
        tx.inputs[0].script_sig = Script::from_bytes(bad);
        assert!(verify_input(&tx, 0, &p2sh_script_pubkey(&redeem)).is_err());
    }

    #[test]
    fn test_cast_to_bool_negative_zero() {
        assert!(!cast_to_bool(&[]));
        assert!(!cast_to_bool(&[0x00, 0x00]));
        assert!(!cast_to_bool(&[0x00, 0x80]));
        assert!(cast_to_bool(&[0x01]));
        assert!(cast_to_bool(&[0x80, 0x01]));
    }
}
