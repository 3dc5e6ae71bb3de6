//! Statistics arithmetic shared by derived fields and the stats service.

/// Completion rate as a percentage rounded to one decimal place.
///
/// Returns 0 when the denominator is 0, so empty collections never divide
/// by zero and report a clean baseline.
pub fn completion_rate(completed: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    let rate = (completed as f64 / total as f64) * 100.0;
    (rate * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_total_is_zero() {
        assert_eq!(completion_rate(0, 0), 0.0);
    }

    #[test]
    fn test_half_done_is_fifty() {
        assert_eq!(completion_rate(1, 2), 50.0);
        assert_eq!(completion_rate(5, 10), 50.0);
    }

    #[test]
    fn test_rounds_to_one_decimal() {
        assert_eq!(completion_rate(1, 3), 33.3);
        assert_eq!(completion_rate(2, 3), 66.7);
        assert_eq!(completion_rate(1, 7), 14.3);
    }

    #[test]
    fn test_all_done_is_hundred() {
        assert_eq!(completion_rate(4, 4), 100.0);
    }
}
