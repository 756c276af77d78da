// Engine dvar hash: FNV-1a over the lowercased name plus its NUL terminator,
// seeded with non-standard constants.
const DVAR_HASH_OFFSET_BASIS: u32 = 0xB3CB_2E29;
const DVAR_HASH_PRIME: u32 = 0x3197_12C3;

pub const HASH_PREFIX: &str = "0x";

/// Map a dvar name to the key it is stored under in the save.
///
/// Names that already look like a hash (`0x` prefix) are returned as-is.
pub fn hash_dvar(name: &str) -> String {
    if is_hashed(name) {
        return name.to_string();
    }
    format!("{HASH_PREFIX}{:08X}", dvar_hash_raw(name))
}

pub fn is_hashed(name: &str) -> bool {
    name.starts_with(HASH_PREFIX)
}

fn dvar_hash_raw(name: &str) -> u32 {
    name.bytes()
        .map(|b| b.to_ascii_lowercase())
        .chain(std::iter::once(0u8))
        .fold(DVAR_HASH_OFFSET_BASIS, |hash, b| {
            (hash ^ u32::from(b)).wrapping_mul(DVAR_HASH_PRIME)
        })
}
