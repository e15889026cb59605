//! Cache key derivation.
//!
//! 32-bit rolling hash over UTF-16 code units. Collisions are tolerable: a
//! wrong hit only costs a stale categorization, never a security decision.

/// Deterministic key for `(content, operation)`.
///
/// ```rust
/// use parley_core::cache::generate_key;
///
/// let a = generate_key("Hello there", "categorization");
/// assert_eq!(a, generate_key("Hello there", "categorization"));
/// assert!(a.starts_with("categorization_"));
/// ```
pub fn generate_key(content: &str, operation: &str) -> String {
    let input = format!("{}:{}", operation, content);
    format!("{}_{}", operation, to_base36(rolling_hash(&input).unsigned_abs()))
}

pub(crate) fn rolling_hash(input: &str) -> i32 {
    input
        .encode_utf16()
        .fold(0i32, |hash, unit| hash.wrapping_mul(31).wrapping_add(unit as i32))
}

fn to_base36(mut n: u32) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::with_capacity(7);
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}
