//! # LPF2 Checksum
//!
//! Complemented XOR checksum used by every LPF2 message.
//!
//! The checksum covers the header and payload; it is never itself checksummed.

/// Initial checksum value
const CHECKSUM_SEED: u8 = 0xFF;

/// Calculate the checksum of `data`: XOR of all bytes, XOR 0xFF
///
/// # Examples
///
/// ```
/// use lpf2_device::lpf2::checksum::checksum;
///
/// assert_eq!(checksum(&[0x40, 0x41]), 0xFE);
/// ```
pub fn checksum(data: &[u8]) -> u8 {
    data.iter().fold(CHECKSUM_SEED, |acc, &byte| acc ^ byte)
}

/// Append the checksum of `data` to it
pub fn append_checksum(mut data: Vec<u8>) -> Vec<u8> {
    let chk = checksum(&data);
    data.push(chk);
    data
}

/// Check that the trailing byte of `message` is the checksum of the rest
pub fn verify(message: &[u8]) -> bool {
    match message.split_last() {
        Some((&chk, body)) => checksum(body) == chk,
        None => false,
    }
}
