use rand::Rng;

/// Uniform random integer in `[min, max]`, both ends inclusive
///
/// Bounds given in reverse order are swapped.
pub fn random_int(min: i64, max: i64) -> i64 {
    random_int_with(&mut rand::rng(), min, max)
}

/// [`random_int`] drawing from a caller-supplied generator
pub fn random_int_with<R: Rng + ?Sized>(rng: &mut R, min: i64, max: i64) -> i64 {
    let (low, high) = if min <= max { (min, max) } else { (max, min) };
    rng.random_range(low..=high)
}

/// Uniform random integer in `[1, max]`; returns 1 when `max` is 0
pub fn random_up_to(max: u64) -> u64 {
    random_up_to_with(&mut rand::rng(), max)
}

/// [`random_up_to`] drawing from a caller-supplied generator
pub fn random_up_to_with<R: Rng + ?Sized>(rng: &mut R, max: u64) -> u64 {
    rng.random_range(1..=max.max(1))
}
