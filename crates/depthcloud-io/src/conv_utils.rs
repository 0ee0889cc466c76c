// PNG stores 16-bit samples big-endian.

pub(crate) fn convert_buf_u8_u16(buf: Vec<u8>) -> Vec<u16> {
    buf.chunks_exact(2)
        .map(|chunk| u16::from_be_bytes([chunk[0], chunk[1]]))
        .collect()
}

pub(crate) fn convert_buf_u16_u8(buf: &[u16]) -> Vec<u8> {
    buf.iter().flat_map(|v| v.to_be_bytes()).collect()
}
