// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Length-prefixed binary encoding for the variable-length aggregates of
//! decoded events: a u32 element count, then each element as u32 length +
//! bytes, all big-endian.

use alloy_primitives::{Address, U256};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("truncated input")]
    Truncated,
    #[error("trailing bytes")]
    TrailingBytes,
    #[error("invalid element length {0}")]
    InvalidElementLength(usize),
    #[error("invalid utf-8 string")]
    InvalidString,
}

pub fn encode_bytes_list<T: AsRef<[u8]>>(items: &[T]) -> Vec<u8> {
    let mut out = Vec::with_capacity(4 + items.len() * 4);
    out.extend_from_slice(&(items.len() as u32).to_be_bytes());
    for item in items {
        let bytes = item.as_ref();
        out.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
        out.extend_from_slice(bytes);
    }
    out
}

pub fn decode_bytes_list(buf: &[u8]) -> Result<Vec<Vec<u8>>, CodecError> {
    let (count, mut rest) = read_u32(buf)?;
    let mut items = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let (len, tail) = read_u32(rest)?;
        let len = len as usize;
        if tail.len() < len {
            return Err(CodecError::Truncated);
        }
        let (item, tail) = tail.split_at(len);
        items.push(item.to_vec());
        rest = tail;
    }
    if !rest.is_empty() {
        return Err(CodecError::TrailingBytes);
    }
    Ok(items)
}

pub fn encode_address_list(addresses: &[Address]) -> Vec<u8> {
    encode_bytes_list(&addresses.iter().map(|a| a.to_vec()).collect::<Vec<_>>())
}

pub fn decode_address_list(buf: &[u8]) -> Result<Vec<Address>, CodecError> {
    decode_bytes_list(buf)?
        .into_iter()
        .map(|bytes| {
            Address::try_from(bytes.as_slice())
                .map_err(|_| CodecError::InvalidElementLength(bytes.len()))
        })
        .collect()
}

pub fn encode_u256_list(values: &[U256]) -> Vec<u8> {
    encode_bytes_list(&values.iter().map(u256_to_bytes).collect::<Vec<_>>())
}

pub fn decode_u256_list(buf: &[u8]) -> Result<Vec<U256>, CodecError> {
    decode_bytes_list(buf)?
        .into_iter()
        .map(|bytes| {
            U256::try_from_be_slice(&bytes)
                .ok_or(CodecError::InvalidElementLength(bytes.len()))
        })
        .collect()
}

pub fn encode_string_list(strings: &[String]) -> Vec<u8> {
    encode_bytes_list(&strings.iter().map(|s| s.as_bytes()).collect::<Vec<_>>())
}

pub fn decode_string_list(buf: &[u8]) -> Result<Vec<String>, CodecError> {
    decode_bytes_list(buf)?
        .into_iter()
        .map(|bytes| String::from_utf8(bytes).map_err(|_| CodecError::InvalidString))
        .collect()
}

/// Minimal big-endian representation; empty for zero.
pub fn u256_to_bytes(value: &U256) -> Vec<u8> {
    let bytes = value.to_be_bytes::<32>();
    let start = bytes.iter().position(|b| *b != 0).unwrap_or(32);
    bytes[start..].to_vec()
}

pub fn u256_from_bytes(bytes: &[u8]) -> Result<U256, CodecError> {
    U256::try_from_be_slice(bytes).ok_or(CodecError::InvalidElementLength(bytes.len()))
}

fn read_u32(buf: &[u8]) -> Result<(u32, &[u8]), CodecError> {
    if buf.len() < 4 {
        return Err(CodecError::Truncated);
    }
    let (head, tail) = buf.split_at(4);
    let mut raw = [0u8; 4];
    raw.copy_from_slice(head);
    Ok((u32::from_be_bytes(raw), tail))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    #[test]
    fn bytes_list_round_trip() {
        let lists: [&[Vec<u8>]; 3] = [
            &[],
            &[vec![]],
            &[vec![1, 2, 3], vec![], vec![0xff; 40]],
        ];
        for list in lists {
            let encoded = encode_bytes_list(list);
            assert_eq!(decode_bytes_list(&encoded).unwrap(), list.to_vec());
        }
    }

    #[test]
    fn rejects_truncated_and_trailing_input() {
        let encoded = encode_bytes_list(&[vec![1u8, 2, 3]]);
        assert_eq!(
            decode_bytes_list(&encoded[..encoded.len() - 1]),
            Err(CodecError::Truncated)
        );
        let mut trailing = encoded.clone();
        trailing.push(0);
        assert_eq!(decode_bytes_list(&trailing), Err(CodecError::TrailingBytes));
        assert_eq!(decode_bytes_list(&[0, 0]), Err(CodecError::Truncated));
    }

    #[test]
    fn address_list_round_trip() {
        let addresses = vec![
            address!("00000000000000000000000000000000000000aa"),
            address!("00000000000000000000000000000000000000bb"),
        ];
        let encoded = encode_address_list(&addresses);
        assert_eq!(decode_address_list(&encoded).unwrap(), addresses);
    }

    #[test]
    fn u256_list_round_trip() {
        let values = vec![U256::ZERO, U256::from(1u64), U256::MAX];
        let encoded = encode_u256_list(&values);
        assert_eq!(decode_u256_list(&encoded).unwrap(), values);
    }

    #[test]
    fn string_list_round_trip() {
        let strings = vec!["".to_string(), "transfer(address,uint256)".to_string()];
        let encoded = encode_string_list(&strings);
        assert_eq!(decode_string_list(&encoded).unwrap(), strings);
    }

    #[test]
    fn u256_bytes_are_minimal_big_endian() {
        assert!(u256_to_bytes(&U256::ZERO).is_empty());
        assert_eq!(u256_to_bytes(&U256::from(0x0102u64)), vec![1, 2]);
        assert_eq!(u256_from_bytes(&[1, 2]).unwrap(), U256::from(0x0102u64));
        assert!(u256_from_bytes(&[0xff; 33]).is_err());
    }
}
