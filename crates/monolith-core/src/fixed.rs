use fixed::types::I32F32;

/// Q32.32 fixed-point: 32 integer bits, 32 fractional bits.
///
/// All fractional machine math (maintenance time/duration multipliers,
/// probability thresholds) runs on this type so results are identical
/// across platforms.
pub type Fixed64 = I32F32;

/// Ticks are the atomic unit of simulation time.
pub type Ticks = u64;

/// Convert an f64 to Fixed64. Use only for initialization, never in the
/// tick loop.
#[inline]
pub fn f64_to_fixed64(v: f64) -> Fixed64 {
    Fixed64::from_num(v)
}

/// Convert Fixed64 to f64. Use only for display, never in the tick loop.
#[inline]
pub fn fixed64_to_f64(v: Fixed64) -> f64 {
    v.to_num::<f64>()
}

/// Checked division for Fixed64 that returns None on zero divisor.
#[inline]
pub fn checked_div_64(a: Fixed64, b: Fixed64) -> Option<Fixed64> {
    a.checked_div(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_arithmetic() {
        let a = f64_to_fixed64(0.9);
        let b = f64_to_fixed64(1.1);
        assert!(a < b);
        assert_eq!(fixed64_to_f64(a + b), 2.0);
    }

    #[test]
    fn interval_division_truncates_deterministically() {
        // The maintenance interval is 1000 / time_multiplier; the same
        // inputs must give the same threshold everywhere.
        let interval = f64_to_fixed64(1000.0);
        let mult = f64_to_fixed64(1.1);
        let a = checked_div_64(interval, mult).unwrap();
        let b = checked_div_64(interval, mult).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_num::<i32>(), 909);
    }

    #[test]
    fn checked_div_by_zero() {
        let a = f64_to_fixed64(1.0);
        assert!(checked_div_64(a, Fixed64::ZERO).is_none());
    }

    #[test]
    fn ticks_type() {
        let t: Ticks = 20;
        assert_eq!(t, 20u64);
    }
}
