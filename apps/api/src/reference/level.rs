use crate::reference::models::RawLevel;

/// Reduces a raw Level cell to a single seniority value.
///
/// - missing → `None`
/// - text containing `-` → mean of the pure-integer tokens (`"3-5"` → 4.0), `None` if there are none
/// - negative numbers → `None`; written out (`"-3.0"`) they hold a hyphen but no integer token
/// - anything else → parsed as a float, `None` on failure
///
/// Non-finite results (`NaN`, `inf`) are treated as undefined so they never reach a comparison.
pub fn parse_level(raw: Option<&RawLevel>) -> Option<f64> {
    let value = match raw? {
        RawLevel::Number(n) if n.is_sign_negative() => return None,
        RawLevel::Number(n) => *n,
        RawLevel::Text(s) => parse_level_text(s)?,
    };
    value.is_finite().then_some(value)
}

fn parse_level_text(s: &str) -> Option<f64> {
    if s.contains('-') {
        let nums: Vec<f64> = s
            .split('-')
            .map(str::trim)
            .filter(|t| !t.is_empty() && t.chars().all(|c| c.is_ascii_digit()))
            .filter_map(|t| t.parse::<f64>().ok())
            .collect();
        if nums.is_empty() {
            return None;
        }
        return Some(nums.iter().sum::<f64>() / nums.len() as f64);
    }
    s.trim().parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Option<RawLevel> {
        Some(RawLevel::Text(s.to_string()))
    }

    #[test]
    fn test_range_is_mean() {
        assert_eq!(parse_level(text("3-5").as_ref()), Some(4.0));
        assert_eq!(parse_level(text(" 12 - 15 ").as_ref()), Some(13.5));
    }

    #[test]
    fn test_single_number() {
        assert_eq!(parse_level(text("7").as_ref()), Some(7.0));
        assert_eq!(parse_level(text(" 7.5 ").as_ref()), Some(7.5));
        assert_eq!(parse_level(Some(&RawLevel::Number(9.0))), Some(9.0));
    }

    #[test]
    fn test_missing_and_empty_are_undefined() {
        assert_eq!(parse_level(None), None);
        assert_eq!(parse_level(text("").as_ref()), None);
        assert_eq!(parse_level(text("   ").as_ref()), None);
    }

    #[test]
    fn test_garbage_is_undefined() {
        assert_eq!(parse_level(text("abc").as_ref()), None);
        assert_eq!(parse_level(text("a-b").as_ref()), None);
        assert_eq!(parse_level(text("-").as_ref()), None);
    }

    #[test]
    fn test_range_keeps_only_integer_tokens() {
        // "4.5" is not a pure integer token and is dropped
        assert_eq!(parse_level(text("4.5-6").as_ref()), Some(6.0));
        assert_eq!(parse_level(text("2-4-6").as_ref()), Some(4.0));
    }

    #[test]
    fn test_negative_number_is_undefined() {
        assert_eq!(parse_level(Some(&RawLevel::Number(-3.0))), None);
        assert_eq!(parse_level(Some(&RawLevel::Number(-0.0))), None);
        assert_eq!(parse_level(Some(&RawLevel::Number(0.0))), Some(0.0));
        // text keeps the hyphen rule
        assert_eq!(parse_level(text("-3").as_ref()), Some(3.0));
        assert_eq!(parse_level(text("-3.0").as_ref()), None);
    }

    #[test]
    fn test_non_finite_is_undefined() {
        assert_eq!(parse_level(text("NaN").as_ref()), None);
        assert_eq!(parse_level(text("inf").as_ref()), None);
        assert_eq!(parse_level(Some(&RawLevel::Number(f64::NAN))), None);
    }
}
