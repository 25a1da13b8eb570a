//! Key material and expanded round-key schedules.

use crate::block::Block;
use crate::error::Error;

/// Cipher key of 16, 24, or 32 bytes (`Nk` = 4, 6, or 8 words).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CipherKey {
    bytes: Vec<u8>,
}

impl CipherKey {
    /// Validates the key length.
    pub fn new(bytes: Vec<u8>) -> Result<Self, Error> {
        match bytes.len() {
            16 | 24 | 32 => Ok(Self { bytes }),
            n => Err(Error::KeyLength(n)),
        }
    }

    /// Key length in 32-bit words.
    pub fn nk(&self) -> usize {
        self.bytes.len() / 4
    }

    /// Number of cipher rounds for this key (`Nk + 6`).
    pub fn rounds(&self) -> usize {
        self.nk() + 6
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl From<[u8; 16]> for CipherKey {
    fn from(value: [u8; 16]) -> Self {
        Self {
            bytes: value.to_vec(),
        }
    }
}

impl From<[u8; 24]> for CipherKey {
    fn from(value: [u8; 24]) -> Self {
        Self {
            bytes: value.to_vec(),
        }
    }
}

impl From<[u8; 32]> for CipherKey {
    fn from(value: [u8; 32]) -> Self {
        Self {
            bytes: value.to_vec(),
        }
    }
}

/// Immutable expanded schedule: one 16-byte round key per round `0..=Nr`,
/// each flattened column-major like the state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoundKeys {
    keys: Vec<Block>,
}

impl RoundKeys {
    pub(crate) fn from_blocks(keys: Vec<Block>) -> Self {
        Self { keys }
    }

    /// Returns the round key at the requested index (0..=Nr).
    #[inline]
    pub fn get(&self, round: usize) -> &Block {
        &self.keys[round]
    }

    /// The final round index `Nr`.
    pub fn last_round(&self) -> usize {
        self.keys.len() - 1
    }
}
