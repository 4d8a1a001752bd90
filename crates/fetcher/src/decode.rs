//! Bond account decoding.
//!
//! The on-chain bond layout is not decoded yet; [`LengthOnlyDecoder`] stands
//! in, reporting only the raw buffer length. The trait marks the seam where a
//! layout-aware decoder will slot in.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Decoded view of a bond account's raw data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BondAccountData {
    pub balance: u64,
    pub data_size: usize,
    pub exists: bool,
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("bond account data truncated: {0} bytes")]
    Truncated(usize),
}

/// Turns a raw account buffer into a [`BondAccountData`].
pub trait BondDecoder: Send + Sync {
    fn decode(&self, data: &[u8]) -> Result<BondAccountData, DecodeError>;
}

/// Placeholder decoder: constant zero balance, buffer length, `exists: true`.
///
/// TODO: decode the real bond fields once the on-chain schema is frozen. The
/// balance stays a constant zero until then, even though lamports are
/// available from account metadata.
pub struct LengthOnlyDecoder;

impl BondDecoder for LengthOnlyDecoder {
    fn decode(&self, data: &[u8]) -> Result<BondAccountData, DecodeError> {
        Ok(BondAccountData {
            balance: 0,
            data_size: data.len(),
            exists: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_reports_length_only() {
        let data = vec![7u8; 42];
        let decoded = LengthOnlyDecoder.decode(&data).unwrap();
        assert_eq!(decoded.balance, 0);
        assert_eq!(decoded.data_size, 42);
        assert!(decoded.exists);
    }

    #[test]
    fn test_decode_accepts_empty_buffer() {
        let decoded = LengthOnlyDecoder.decode(&[]).unwrap();
        assert_eq!(decoded.data_size, 0);
        assert!(decoded.exists);
    }
}
