/// decode one little endian 8 byte word into a float. Short chunks are zero padded.
pub(crate) fn bytes_to_float(bytes: &[u8]) -> f64 {
    f64::from_le_bytes(word(bytes))
}

/// decode one little endian 8 byte word into a signed integer
pub(crate) fn bytes_to_int(bytes: &[u8]) -> i64 {
    i64::from_le_bytes(word(bytes))
}

fn word(bytes: &[u8]) -> [u8; 8] {
    let mut arr = [0; 8];
    bytes
        .iter()
        .take(8)
        .enumerate()
        .for_each(|(idx, value)| arr[idx] = *value);
    arr
}
