use std::str::FromStr;

use ripemd::{Digest, Ripemd160};

use super::ChainError;

const LEGACY_PREFIX: &str = "EOS";
const K1_PREFIX: &str = "PUB_K1_";
const KEY_LEN: usize = 33;
const CHECKSUM_LEN: usize = 4;

/// A compressed secp256k1 public key in either the legacy `EOS...` or the
/// `PUB_K1_...` text form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    compressed: [u8; KEY_LEN],
}

impl PublicKey {
    /// Wire form: key type (0 = K1) followed by the compressed point.
    pub fn pack(&self, out: &mut Vec<u8>) {
        out.push(0);
        out.extend_from_slice(&self.compressed);
    }
}

fn checksum(data: &[u8], suffix: &[u8]) -> [u8; CHECKSUM_LEN] {
    let mut hasher = Ripemd160::new();
    hasher.update(data);
    hasher.update(suffix);
    let digest = hasher.finalize();
    let mut out = [0u8; CHECKSUM_LEN];
    out.copy_from_slice(&digest[..CHECKSUM_LEN]);
    out
}

fn decode(encoded: &str, checksum_suffix: &[u8]) -> Result<[u8; KEY_LEN], ChainError> {
    let raw = bs58::decode(encoded)
        .into_vec()
        .map_err(|e| ChainError::Codec(format!("invalid base58: {e}")))?;
    if raw.len() != KEY_LEN + CHECKSUM_LEN {
        return Err(ChainError::Codec(format!(
            "public key decodes to {} bytes, expected {}",
            raw.len(),
            KEY_LEN + CHECKSUM_LEN
        )));
    }

    let (key, sum) = raw.split_at(KEY_LEN);
    if checksum(key, checksum_suffix).as_slice() != sum {
        return Err(ChainError::Codec("public key checksum mismatch".into()));
    }

    k256::PublicKey::from_sec1_bytes(key)
        .map_err(|_| ChainError::Codec("public key is not a secp256k1 point".into()))?;

    let mut compressed = [0u8; KEY_LEN];
    compressed.copy_from_slice(key);
    Ok(compressed)
}

impl FromStr for PublicKey {
    type Err = ChainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compressed = if let Some(rest) = s.strip_prefix(K1_PREFIX) {
            decode(rest, b"K1")?
        } else if let Some(rest) = s.strip_prefix(LEGACY_PREFIX) {
            decode(rest, b"")?
        } else {
            return Err(ChainError::Codec("unknown public key prefix".into()));
        };
        Ok(PublicKey { compressed })
    }
}

/// Key-validity oracle used by request validation.
pub fn is_valid_public_key(key: &str) -> bool {
    key.parse::<PublicKey>().is_ok()
}
