//! Script construction: byte builder, minimal integer encoding, and the
//! escrow script templates.
//!
//! The redeem script template is the contract both parties recompute
//! independently, so every push here must be byte-exact: integers use
//! minimal script-number encoding (empty for 0, OP_1..OP_16 for small
//! values, otherwise the shortest little-endian sign-magnitude form).

use crate::constants::*;
use crate::error::{EscrowError, Result};

/// A serialized script. Immutable once built through the template
/// constructors; the byte form is both the sighash scriptCode input and
/// the redeem script revealed in the unlocking script.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Script(Vec<u8>);

impl Script {
    pub fn new() -> Self {
        Script(Vec::new())
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Script(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    pub fn push_opcode(&mut self, opcode: u8) -> &mut Self {
        self.0.push(opcode);
        self
    }

    /// Append a data push with the canonical push prefix for its length.
    pub fn push_data(&mut self, data: &[u8]) -> &mut Self {
        let len = data.len();
        if len < OP_PUSHDATA1 as usize {
            self.0.push(len as u8);
        } else if len <= 0xff {
            self.0.push(OP_PUSHDATA1);
            self.0.push(len as u8);
        } else if len <= 0xffff {
            self.0.push(OP_PUSHDATA2);
            self.0.extend_from_slice(&(len as u16).to_le_bytes());
        } else {
            self.0.push(OP_PUSHDATA4);
            self.0.extend_from_slice(&(len as u32).to_le_bytes());
        }
        self.0.extend_from_slice(data);
        self
    }

    /// Append an integer push using minimal encoding: OP_0 for zero,
    /// OP_1..OP_16 for 1..=16, OP_1NEGATE for -1, otherwise a data push of
    /// the script-number bytes.
    pub fn push_int(&mut self, value: i64) -> &mut Self {
        match value {
            0 => self.push_opcode(OP_0),
            -1 => self.push_opcode(OP_1NEGATE),
            1..=16 => self.push_opcode(OP_1 + (value as u8) - 1),
            _ => self.push_data(&script_num_encode(value)),
        }
    }

    /// True for the 23-byte P2SH pattern: OP_HASH160 <20 bytes> OP_EQUAL
    pub fn is_p2sh(&self) -> bool {
        self.0.len() == 23
            && self.0[0] == OP_HASH160
            && self.0[1] == 0x14
            && self.0[22] == OP_EQUAL
    }
}

/// Minimal little-endian sign-magnitude encoding (CScriptNum). Zero is the
/// empty vector; a high bit on the top magnitude byte gets a sign byte.
pub fn script_num_encode(value: i64) -> Vec<u8> {
    if value == 0 {
        return Vec::new();
    }
    let negative = value < 0;
    let mut abs = value.unsigned_abs();
    let mut out = Vec::new();
    while abs > 0 {
        out.push((abs & 0xff) as u8);
        abs >>= 8;
    }
    if out.last().map_or(false, |b| b & 0x80 != 0) {
        out.push(if negative { 0x80 } else { 0x00 });
    } else if negative {
        let last = out.len() - 1;
        out[last] |= 0x80;
    }
    out
}

/// Decode a script-number operand, enforcing the operand size limit.
/// Non-minimal forms are accepted here; the builder never produces them.
pub fn script_num_decode(bytes: &[u8]) -> Result<i64> {
    if bytes.len() > MAX_SCRIPT_NUM_SIZE {
        return Err(EscrowError::ScriptExecution(format!(
            "script number operand too large: {} bytes",
            bytes.len()
        )));
    }
    if bytes.is_empty() {
        return Ok(0);
    }
    let mut value: i64 = 0;
    for (i, b) in bytes.iter().enumerate() {
        value |= i64::from(*b) << (8 * i);
    }
    let top = bytes[bytes.len() - 1];
    if top & 0x80 != 0 {
        let mask = i64::from(0x80u8) << (8 * (bytes.len() - 1));
        value = -(value & !mask);
    }
    Ok(value)
}

/// The escrow redeem script:
/// `<height> OP_CHECKLOCKTIMEVERIFY OP_DROP OP_DUP OP_HASH160
/// <hash160(pubkey)> OP_EQUALVERIFY OP_CHECKSIG`
pub fn cltv_p2pkh_redeem_script(height: u32, pubkey_hash: &[u8; 20]) -> Script {
    let mut script = Script::new();
    script
        .push_int(i64::from(height))
        .push_opcode(OP_CHECKLOCKTIMEVERIFY)
        .push_opcode(OP_DROP)
        .push_opcode(OP_DUP)
        .push_opcode(OP_HASH160)
        .push_data(pubkey_hash)
        .push_opcode(OP_EQUALVERIFY)
        .push_opcode(OP_CHECKSIG);
    script
}

/// Standard P2PKH locking script
pub fn p2pkh_script(pubkey_hash: &[u8; 20]) -> Script {
    let mut script = Script::new();
    script
        .push_opcode(OP_DUP)
        .push_opcode(OP_HASH160)
        .push_data(pubkey_hash)
        .push_opcode(OP_EQUALVERIFY)
        .push_opcode(OP_CHECKSIG);
    script
}

/// Standard P2SH locking script
pub fn p2sh_script(script_hash: &[u8; 20]) -> Script {
    let mut script = Script::new();
    script
        .push_opcode(OP_HASH160)
        .push_data(script_hash)
        .push_opcode(OP_EQUAL);
    script
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_num_encode_zero_is_empty() {
        assert!(script_num_encode(0).is_empty());
    }

    #[test]
    fn test_script_num_encode_small() {
        assert_eq!(script_num_encode(1), vec![0x01]);
        assert_eq!(script_num_encode(127), vec![0x7f]);
        // 128 needs a sign byte: 0x80 alone would read as -0
        assert_eq!(script_num_encode(128), vec![0x80, 0x00]);
        assert_eq!(script_num_encode(-1), vec![0x81]);
    }

    #[test]
    fn test_script_num_encode_heights() {
        // 500_000 = 0x07a120, little-endian
        assert_eq!(script_num_encode(500_000), vec![0x20, 0xa1, 0x07]);
        // 499_999_999 = 0x1dcd64ff
        assert_eq!(script_num_encode(499_999_999), vec![0xff, 0x64, 0xcd, 0x1d]);
        // 500_000_000 = 0x1dcd6500
        assert_eq!(script_num_encode(500_000_000), vec![0x00, 0x65, 0xcd, 0x1d]);
    }

    #[test]
    fn test_script_num_round_trip() {
        for v in [0i64, 1, 16, 17, 127, 128, 255, 256, 500_000, 499_999_999, 500_000_000, -5] {
            let bytes = script_num_encode(v);
            assert_eq!(script_num_decode(&bytes).unwrap(), v, "value {}", v);
        }
    }

    #[test]
    fn test_script_num_decode_rejects_oversize() {
        assert!(script_num_decode(&[0x01; 6]).is_err());
    }

    #[test]
    fn test_push_int_small_values_use_op_n() {
        let mut s = Script::new();
        s.push_int(0);
        assert_eq!(s.as_bytes(), &[OP_0]);

        let mut s = Script::new();
        s.push_int(5);
        assert_eq!(s.as_bytes(), &[OP_1 + 4]);

        let mut s = Script::new();
        s.push_int(16);
        assert_eq!(s.as_bytes(), &[OP_16]);

        let mut s = Script::new();
        s.push_int(17);
        assert_eq!(s.as_bytes(), &[0x01, 0x11]);
    }

    #[test]
    fn test_redeem_script_bytes_height_500000() {
        let pubkey_hash = [0xab; 20];
        let script = cltv_p2pkh_redeem_script(500_000, &pubkey_hash);

        let mut expected = vec![0x03, 0x20, 0xa1, 0x07, OP_CHECKLOCKTIMEVERIFY, OP_DROP, OP_DUP, OP_HASH160, 0x14];
        expected.extend_from_slice(&pubkey_hash);
        expected.push(OP_EQUALVERIFY);
        expected.push(OP_CHECKSIG);
        assert_eq!(script.as_bytes(), expected.as_slice());
    }

    #[test]
    fn test_redeem_script_height_zero() {
        let script = cltv_p2pkh_redeem_script(0, &[0x00; 20]);
        // Height 0 encodes as a bare OP_0, no data push
        assert_eq!(script.as_bytes()[0], OP_0);
        assert_eq!(script.as_bytes()[1], OP_CHECKLOCKTIMEVERIFY);
    }

    #[test]
    fn test_p2pkh_script_shape() {
        let script = p2pkh_script(&[0x11; 20]);
        assert_eq!(script.len(), 25);
        assert_eq!(script.as_bytes()[0], OP_DUP);
        assert_eq!(script.as_bytes()[24], OP_CHECKSIG);
    }

    #[test]
    fn test_p2sh_script_detected() {
        let script = p2sh_script(&[0x22; 20]);
        assert!(script.is_p2sh());
        assert!(!p2pkh_script(&[0x22; 20]).is_p2sh());
    }

    #[test]
    fn test_push_data_large() {
        let mut s = Script::new();
        s.push_data(&[0xaa; 80]);
        assert_eq!(s.as_bytes()[0], OP_PUSHDATA1);
        assert_eq!(s.as_bytes()[1], 80);
        assert_eq!(s.len(), 82);
    }
}
