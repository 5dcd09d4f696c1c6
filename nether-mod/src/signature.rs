//! Format signature recognition

use crate::{IDENTIFY_SCORE, MAX_CHANNELS, MOD_HEADER_SIZE, SIGNATURE_OFFSET};

/// Known signatures and their channel counts
const KNOWN_SIGNATURES: [(&[u8; 4], u8); 7] = [
    (b"M.K.", 4),
    (b"M!K!", 4),
    (b"FLT4", 4),
    (b"6CHN", 6),
    (b"8CHN", 8),
    (b"FLT8", 8),
    (b"OCTA", 8),
];

/// Channel count declared by a signature, None if unrecognized.
///
/// Besides the fixed table, `NNCH` with NN in 1..=32 is accepted.
pub fn channels_for_signature(signature: &[u8; 4]) -> Option<u8> {
    if let Some(&(_, channels)) = KNOWN_SIGNATURES.iter().find(|(sig, _)| *sig == signature) {
        return Some(channels);
    }

    if &signature[2..] != b"CH" || !signature[..2].iter().all(u8::is_ascii_digit) {
        return None;
    }
    let channels = (signature[0] - b'0') * 10 + (signature[1] - b'0');
    (1..=MAX_CHANNELS).contains(&channels).then_some(channels)
}

/// Read the signature of a full-size header
pub(crate) fn signature_of(data: &[u8]) -> Option<[u8; 4]> {
    if data.len() < MOD_HEADER_SIZE {
        return None;
    }
    data[SIGNATURE_OFFSET..SIGNATURE_OFFSET + 4].try_into().ok()
}

/// Confidence score that `data` is a MOD file
pub fn identify(data: &[u8]) -> u32 {
    match signature_of(data) {
        Some(signature) if channels_for_signature(&signature).is_some() => IDENTIFY_SCORE,
        _ => 0,
    }
}
