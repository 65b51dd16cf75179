use std::time::Instant;

/// Rounds to two decimal places, the precision every reported duration uses.
#[inline]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Milliseconds elapsed since `start`, rounded to two decimals.
pub fn elapsed_ms(start: Instant) -> f64 {
    round2(start.elapsed().as_secs_f64() * 1000.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2() {
        assert_eq!(round2(12.345_6), 12.35);
        assert_eq!(round2(0.004), 0.0);
        assert_eq!(round2(0.55 + (255.0 / 255.0) * 0.44), 0.99);
    }

    #[test]
    fn test_elapsed_is_non_negative() {
        let start = Instant::now();
        assert!(elapsed_ms(start) >= 0.0);
    }
}
