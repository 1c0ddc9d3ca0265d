//! PKCS#7 padding, applied strictly and removed leniently

/// Largest padding value accepted on removal
pub const MAX_PADDING: usize = 16;

/// Length of `data` after lenient PKCS#7 removal.
///
/// Padding is stripped only when the final byte `p` is in `1..=16` and the
/// last `p` bytes all equal `p`. Anything else leaves the length unchanged.
pub fn unpadded_len(data: &[u8]) -> usize {
    let Some(&last) = data.last() else {
        return 0;
    };
    let pad = usize::from(last);
    if pad == 0 || pad > MAX_PADDING || pad > data.len() {
        return data.len();
    }
    if data[data.len() - pad..].iter().all(|&b| b == last) {
        data.len() - pad
    } else {
        data.len()
    }
}

/// Lenient PKCS#7 removal as a subslice
pub fn unpad_lenient(data: &[u8]) -> &[u8] {
    &data[..unpadded_len(data)]
}

/// Append PKCS#7 padding up to the next multiple of `block_size`
pub fn pkcs7_pad(data: &[u8], block_size: usize) -> Vec<u8> {
    let pad = block_size - (data.len() % block_size);
    let mut padded = Vec::with_capacity(data.len() + pad);
    padded.extend_from_slice(data);
    // block_size is at most 255 for PKCS#7
    padded.resize(data.len() + pad, pad as u8);
    padded
}
