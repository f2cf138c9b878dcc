use chrono::{DateTime, NaiveDateTime};
use serde::Serialize;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};

use super::action::Action;
use super::ChainError;

/// Binary serialization in the EOSIO wire format.
pub trait Pack {
    fn pack(&self, out: &mut Vec<u8>);
}

pub fn write_varuint32(out: &mut Vec<u8>, mut value: u32) {
    loop {
        let mut byte = (value & 0x7f) as u8;
        value >>= 7;
        if value > 0 {
            byte |= 0x80;
        }
        out.push(byte);
        if value == 0 {
            break;
        }
    }
}

/// TaPoS reference to a recent block plus the expiration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionHeader {
    /// Seconds since the Unix epoch.
    pub expiration: u32,
    pub ref_block_num: u16,
    pub ref_block_prefix: u32,
}

impl TransactionHeader {
    /// Build a header referencing `block_num`/`block_id` that expires
    /// `expire_seconds` after `block_timestamp`.
    pub fn from_reference_block(
        block_num: u32,
        block_id: &str,
        block_timestamp: &str,
        expire_seconds: u32,
    ) -> Result<Self, ChainError> {
        let block_time = parse_block_timestamp(block_timestamp)?;
        Ok(Self {
            expiration: block_time.saturating_add(expire_seconds),
            ref_block_num: (block_num & 0xffff) as u16,
            ref_block_prefix: ref_block_prefix(block_id)?,
        })
    }
}

/// Bytes 8..12 of the block id, read little-endian.
pub fn ref_block_prefix(block_id: &str) -> Result<u32, ChainError> {
    let raw = hex::decode(block_id)
        .map_err(|e| ChainError::InvalidResponse(format!("block id is not hex: {e}")))?;
    if raw.len() < 12 {
        return Err(ChainError::InvalidResponse(format!(
            "block id too short: {block_id}"
        )));
    }
    Ok(u32::from_le_bytes([raw[8], raw[9], raw[10], raw[11]]))
}

/// Node timestamps are UTC without a zone suffix, e.g. `2024-05-01T12:00:00.500`.
fn parse_block_timestamp(text: &str) -> Result<u32, ChainError> {
    let naive = NaiveDateTime::parse_from_str(text.trim_end_matches('Z'), "%Y-%m-%dT%H:%M:%S%.f")
        .map_err(|e| ChainError::InvalidResponse(format!("bad block timestamp '{text}': {e}")))?;
    u32::try_from(naive.and_utc().timestamp())
        .map_err(|_| ChainError::InvalidResponse(format!("block timestamp out of range: {text}")))
}

fn format_expiration(seconds: u32) -> String {
    DateTime::from_timestamp(seconds as i64, 0)
        .map(|t| t.format("%Y-%m-%dT%H:%M:%S").to_string())
        .unwrap_or_default()
}

#[derive(Debug, Clone)]
pub struct Transaction {
    pub header: TransactionHeader,
    pub actions: Vec<Action>,
}

impl Pack for Transaction {
    fn pack(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.header.expiration.to_le_bytes());
        out.extend_from_slice(&self.header.ref_block_num.to_le_bytes());
        out.extend_from_slice(&self.header.ref_block_prefix.to_le_bytes());
        write_varuint32(out, 0); // max_net_usage_words
        out.push(0); // max_cpu_usage_ms
        write_varuint32(out, 0); // delay_sec
        write_varuint32(out, 0); // context_free_actions
        write_varuint32(out, self.actions.len() as u32);
        for action in &self.actions {
            action.pack(out);
        }
        write_varuint32(out, 0); // transaction_extensions
    }
}

impl Transaction {
    pub fn packed(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.pack(&mut out);
        out
    }

    /// Transaction id: SHA-256 of the packed transaction.
    pub fn id(&self) -> String {
        hex::encode(Sha256::digest(self.packed()))
    }

    /// JSON form accepted by a wallet's `sign_transaction`, with action data
    /// already serialized to hex.
    pub fn to_wallet_json(&self) -> Value {
        let actions: Vec<Value> = self
            .actions
            .iter()
            .map(|action| {
                let authorization: Vec<Value> = action
                    .authorization
                    .iter()
                    .map(|level| json!({ "actor": level.actor, "permission": level.permission }))
                    .collect();
                json!({
                    "account": action.account,
                    "name": action.name(),
                    "authorization": authorization,
                    "data": hex::encode(action.packed_data()),
                })
            })
            .collect();

        json!({
            "expiration": format_expiration(self.header.expiration),
            "ref_block_num": self.header.ref_block_num,
            "ref_block_prefix": self.header.ref_block_prefix,
            "max_net_usage_words": 0,
            "max_cpu_usage_ms": 0,
            "delay_sec": 0,
            "context_free_actions": [],
            "actions": actions,
            "transaction_extensions": [],
        })
    }
}

/// Body of `push_transaction`.
#[derive(Debug, Serialize)]
pub struct PackedTransaction {
    pub signatures: Vec<String>,
    pub compression: u8,
    pub packed_context_free_data: String,
    pub packed_trx: String,
}

impl PackedTransaction {
    pub fn new(transaction: &Transaction, signatures: Vec<String>) -> Self {
        Self {
            signatures,
            compression: 0,
            packed_context_free_data: String::new(),
            packed_trx: hex::encode(transaction.packed()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_varuint32_encoding() {
        let encode = |v| {
            let mut out = Vec::new();
            write_varuint32(&mut out, v);
            out
        };
        assert_eq!(encode(0), vec![0]);
        assert_eq!(encode(127), vec![0x7f]);
        assert_eq!(encode(128), vec![0x80, 0x01]);
        assert_eq!(encode(300), vec![0xac, 0x02]);
    }

    #[test]
    fn test_ref_block_prefix() {
        let id = "0000000a000000000102030400000000000000000000000000000000000000ff";
        assert_eq!(ref_block_prefix(id).unwrap(), 0x04030201);
        assert!(ref_block_prefix("zz").is_err());
        assert!(ref_block_prefix("00").is_err());
    }

    #[test]
    fn test_header_from_reference_block() {
        let id = "0000000a000000000102030400000000000000000000000000000000000000ff";
        let header =
            TransactionHeader::from_reference_block(0x1_0005, id, "2024-01-01T00:00:00.500", 60)
                .unwrap();
        assert_eq!(header.expiration, 1_704_067_260);
        assert_eq!(header.ref_block_num, 5);
        assert_eq!(format_expiration(header.expiration), "2024-01-01T00:01:00");
    }

    #[test]
    fn test_empty_transaction_layout() {
        let trx = Transaction {
            header: TransactionHeader {
                expiration: 1,
                ref_block_num: 2,
                ref_block_prefix: 3,
            },
            actions: vec![],
        };
        assert_eq!(
            hex::encode(trx.packed()),
            "01000000020003000000000000000000"
        );
        assert_eq!(trx.id().len(), 64);
        assert_eq!(trx.to_wallet_json()["expiration"], "1970-01-01T00:00:01");
    }
}
