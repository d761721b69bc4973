//! 0-100 string similarity scores.

/// Normalised Levenshtein similarity, `100 * (1 - distance / max(|a|, |b|))`, rounded.
///
/// Returns 0 when either side is empty.
pub fn ratio(a: &str, b: &str) -> u8 {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    to_score(strsim::normalized_levenshtein(a, b))
}

/// Best [`ratio`] of the shorter string against any aligned window of the
/// longer one, windows clipped at either end included.
///
/// 100 whenever the shorter string occurs verbatim in the longer.
pub fn partial_ratio(a: &str, b: &str) -> u8 {
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let (short, long) = if a.chars().count() <= b.chars().count() {
        (a, b)
    } else {
        (b, a)
    };
    if long.contains(short) {
        return 100;
    }

    let long: Vec<char> = long.chars().collect();
    let (m, n) = (short.chars().count() as isize, long.len() as isize);

    let mut best = 0;
    for start in (1 - m)..n {
        let lo = start.max(0) as usize;
        let hi = (start + m).min(n) as usize;
        let window: String = long[lo..hi].iter().collect();
        best = best.max(ratio(short, &window));
    }
    best
}

fn to_score(similarity: f64) -> u8 {
    (similarity * 100.0).round().clamp(0.0, 100.0) as u8
}
