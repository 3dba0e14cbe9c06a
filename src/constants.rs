//! Protocol constants for script building, address encoding and timelocks

/// Satoshis per BTC
pub const SATOSHIS_PER_BTC: i64 = 100_000_000;

/// Lock time threshold: transactions with lock time < this are block height
pub const LOCKTIME_THRESHOLD: u32 = 500_000_000;

/// Sequence number for final transaction
pub const SEQUENCE_FINAL: u32 = 0xffffffff;

/// Non-final sequence that does not impose a BIP-68 relative lock.
/// Required on every input of a CLTV spend: a final sequence disables
/// locktime enforcement entirely.
pub const SEQUENCE_LOCKTIME_ENABLED: u32 = 0xfffffffe;

/// Maximum byte length of a script-number operand (BIP-65 allows 5 for CLTV)
pub const MAX_SCRIPT_NUM_SIZE: usize = 5;

/// Maximum stack size during script execution
pub const MAX_STACK_SIZE: usize = 1000;

/// Maximum number of operations in script
pub const MAX_SCRIPT_OPS: usize = 201;

// Script opcodes used by the escrow templates
pub const OP_0: u8 = 0x00;
pub const OP_PUSHDATA1: u8 = 0x4c;
pub const OP_PUSHDATA2: u8 = 0x4d;
pub const OP_PUSHDATA4: u8 = 0x4e;
pub const OP_1NEGATE: u8 = 0x4f;
pub const OP_1: u8 = 0x51;
pub const OP_16: u8 = 0x60;
pub const OP_VERIFY: u8 = 0x69;
pub const OP_DROP: u8 = 0x75;
pub const OP_DUP: u8 = 0x76;
pub const OP_EQUAL: u8 = 0x87;
pub const OP_EQUALVERIFY: u8 = 0x88;
pub const OP_HASH160: u8 = 0xa9;
pub const OP_CHECKSIG: u8 = 0xac;
pub const OP_CHECKLOCKTIMEVERIFY: u8 = 0xb1;

/// SIGHASH_ALL flag appended to every signature
pub const SIGHASH_ALL: u8 = 0x01;

// Base58 version bytes, mainnet
pub const MAINNET_P2PKH_VERSION: u8 = 0x00;
pub const MAINNET_P2SH_VERSION: u8 = 0x05;
pub const MAINNET_WIF_VERSION: u8 = 0x80;

// Base58 version bytes, testnet/regtest
pub const TESTNET_P2PKH_VERSION: u8 = 0x6f;
pub const TESTNET_P2SH_VERSION: u8 = 0xc4;
pub const TESTNET_WIF_VERSION: u8 = 0xef;
