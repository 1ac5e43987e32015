//! Base32 codec used by account addresses.
//!
//! The alphabet drops `0`, `2`, `l` and `v`. Input bytes are read as one
//! big-endian bit stream, 5 bits per symbol, with zero bits prepended so
//! the stream length is a multiple of 5. This is not RFC 4648 base32.

use thiserror::Error;

const ALPHABET: &[u8; 32] = b"13456789abcdefghijkmnopqrstuwxyz";

/// Reverse lookup, `0xFF` marks a byte outside the alphabet.
const DECODE_TABLE: [u8; 256] = {
    let mut table = [0xFFu8; 256];
    let mut i = 0;
    while i < ALPHABET.len() {
        table[ALPHABET[i] as usize] = i as u8;
        i += 1;
    }
    table
};

/// Errors produced while decoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Base32Error {
    #[error("invalid base32 character: {0:?}")]
    InvalidCharacter(char),
}

/// Check whether a character belongs to the alphabet.
pub fn is_symbol(c: char) -> bool {
    c.is_ascii() && DECODE_TABLE[c as usize] != 0xFF
}

/// Encode bytes into base32 symbols.
pub fn encode(input: &[u8]) -> String {
    let total_bits = input.len() * 8;
    let pad = (5 - total_bits % 5) % 5;
    let mut output = String::with_capacity((total_bits + pad) / 5);

    // The pad bits are implicit zeros already sitting in the accumulator.
    let mut acc: u32 = 0;
    let mut bits = pad;
    for &byte in input {
        acc = (acc << 8) | u32::from(byte);
        bits += 8;
        while bits >= 5 {
            bits -= 5;
            output.push(ALPHABET[((acc >> bits) & 31) as usize] as char);
        }
        acc &= (1 << bits) - 1;
    }

    output
}

/// Decode base32 symbols back into bytes.
///
/// When `5 * len` is not a multiple of 8 the leading `5 * len % 8` bits
/// are the encoder's pad and are dropped.
pub fn decode(input: &str) -> Result<Vec<u8>, Base32Error> {
    let total_bits = input.len() * 5;
    let mut skip = total_bits % 8;
    let mut output = Vec::with_capacity(total_bits / 8);

    let mut acc: u32 = 0;
    let mut bits = 0usize;
    for c in input.chars() {
        if !is_symbol(c) {
            return Err(Base32Error::InvalidCharacter(c));
        }
        acc = (acc << 5) | u32::from(DECODE_TABLE[c as usize]);
        bits += 5;

        if skip > 0 && bits >= skip {
            bits -= skip;
            skip = 0;
            acc &= (1 << bits) - 1;
        }
        while bits >= 8 {
            bits -= 8;
            output.push((acc >> bits) as u8);
            acc &= (1 << bits) - 1;
        }
    }

    Ok(output)
}
