//! One-time-pad combination of equal-length byte strings.

/// XORs two equal-length byte strings.
///
/// The operation is symmetric and involutive: `combine(combine(a, b), b) == a`.
/// Returns `None` when the lengths differ.
pub fn combine(a: &[u8], b: &[u8]) -> Option<Vec<u8>> {
    if a.len() != b.len() {
        return None;
    }
    Some(a.iter().zip(b).map(|(x, y)| x ^ y).collect())
}
