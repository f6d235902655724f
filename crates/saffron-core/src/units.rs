//! Engineering units and SI prefix handling.

/// Parse a SPICE-style value with optional SI suffix.
///
/// Suffixes follow SPICE conventions and are case-insensitive:
/// `T` (1e12), `G` (1e9), `MEG` (1e6), `K` (1e3), `M` (1e-3), `U` (1e-6),
/// `N` (1e-9), `P` (1e-12), `F` (1e-15). Trailing unit letters after the
/// suffix are ignored, so `100nF` and `2.2k` both parse.
pub fn parse_value(s: &str) -> Option<f64> {
    let s = s.trim().to_uppercase();

    if let Ok(v) = s.parse::<f64>() {
        return Some(v);
    }

    // Split off the numeric prefix. 'E' is part of the mantissa only when it
    // introduces an exponent, so accept it inside the numeric scan.
    let num_end = s
        .find(|c: char| !c.is_ascii_digit() && c != '.' && c != '-' && c != '+' && c != 'E')
        .unwrap_or(s.len());
    if num_end == 0 {
        return None;
    }

    let (num_str, rest) = s.split_at(num_end);
    let value: f64 = num_str.parse().ok()?;

    let multiplier = if rest.starts_with("MEG") {
        1e6
    } else {
        match rest.chars().next() {
            None => 1.0,
            Some('T') => 1e12,
            Some('G') => 1e9,
            Some('K') => 1e3,
            Some('M') => 1e-3,
            Some('U') => 1e-6,
            Some('N') => 1e-9,
            Some('P') => 1e-12,
            Some('F') => 1e-15,
            Some(_) => return None,
        }
    };

    Some(value * multiplier)
}
