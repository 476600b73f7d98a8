/// Fast 2-value hash with xorshift
#[inline(always)]
pub fn hash2(a: u64, b: u64) -> u64 {
    let mut seed = a.wrapping_mul(2654435761).wrapping_add(b.wrapping_mul(2246822519));
    seed ^= seed << 13;
    seed ^= seed >> 7;
    seed ^= seed << 17;
    seed
}

/// splitmix64 step, spreads small seeds across the full range
#[inline(always)]
pub fn splitmix64(seed: u64) -> u64 {
    let mut x = seed.wrapping_mul(0x9e3779b97f4a7c15);
    x ^= x >> 30;
    x = x.wrapping_mul(0xbf58476d1ce4e5b9);
    x ^= x >> 27;
    x = x.wrapping_mul(0x94d049bb133111eb);
    x ^= x >> 31;
    x
}

const ID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Length of generated document ids
pub const DOCUMENT_ID_LEN: usize = 20;

/// Deterministic 20-char alphanumeric id for a seed
pub fn document_id(seed: u64) -> String {
    let mut state = seed;
    (0..DOCUMENT_ID_LEN)
        .map(|i| {
            state = splitmix64(hash2(state, i as u64));
            ID_ALPHABET[(state % ID_ALPHABET.len() as u64) as usize] as char
        })
        .collect()
}
