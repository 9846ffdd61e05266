//! Deterministic string hashing for stable per-key derived values.

/// Maps `key` to a value in `[0, 1]` via a 32-bit polynomial rolling hash
/// over the string's UTF-16 code units (`h = h * 31 + unit`, wrapping).
///
/// The same key always yields the same value for the life of the process
/// and across processes; this is what lets derived visuals (flow-line
/// curvature) survive rebuilds without jitter.
pub fn unit_interval(key: &str) -> f64 {
    let mut h: i32 = 0;
    for unit in key.encode_utf16() {
        h = h.wrapping_mul(31).wrapping_add(i32::from(unit));
    }
    (f64::from(h.unsigned_abs()) / f64::from(i32::MAX)).min(1.0)
}
