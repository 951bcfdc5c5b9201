use rand::Rng;

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

// 'x' is any nibble, 'y' is a variant nibble (8, 9, a or b)
const HYPHENATED_TEMPLATE: &str = "xxxxxxxx-xxxx-4xxx-yxxx-xxxxxxxxxxxx";
const COMPACT_TEMPLATE: &str = "xxxxxxxxxxxx4xxxyxxxxxxxxxxxxxxx";

/// Random identifier shaped like a version 4 UUID
///
/// 32 lowercase hex digits, optionally grouped 8-4-4-4-12. Uses the thread
/// RNG, so it must not be relied on for anything security sensitive.
pub fn pseudo_uuid(hyphenated: bool) -> String {
    pseudo_uuid_with(&mut rand::rng(), hyphenated)
}

/// [`pseudo_uuid`] drawing from a caller-supplied generator
pub fn pseudo_uuid_with<R: Rng + ?Sized>(rng: &mut R, hyphenated: bool) -> String {
    let template = if hyphenated { HYPHENATED_TEMPLATE } else { COMPACT_TEMPLATE };

    template
        .chars()
        .map(|c| match c {
            'x' => hex_digit(rng.random_range(0..16)),
            'y' => hex_digit((rng.random_range(0..16) & 0x3) | 0x8),
            other => other,
        })
        .collect()
}

#[inline(always)]
fn hex_digit(nibble: u8) -> char {
    HEX_DIGITS[usize::from(nibble & 0xf)] as char
}
