const MODULUS: u32 = 65_521;
// Largest block that keeps both sums below 2^32 before reduction is ~5552;
// the engine uses a smaller fixed block.
const BLOCK_LEN: usize = 3_800;

/// Two-accumulator rolling checksum stored at the head of every save.
pub fn payload_checksum(data: &[u8]) -> u32 {
    let mut s1: u32 = 1;
    let mut s2: u32 = 0;
    for block in data.chunks(BLOCK_LEN) {
        for &b in block {
            s1 += u32::from(b);
            s2 += s1;
        }
        s1 %= MODULUS;
        s2 %= MODULUS;
    }
    (s2 << 16) | s1
}
