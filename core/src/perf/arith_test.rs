#[cfg(test)]
mod tests {
    use std::num::NonZeroI64;

    use crate::perf::arith::*;

    fn nz(d: i64) -> NonZeroI64 {
        NonZeroI64::new(d).expect("non-zero divisor")
    }

    #[test]
    fn test_million_by_seven() {
        let q = divide_all(1_000_000, nz(7));
        assert_eq!(q.int32, Some(142_857));
        assert_eq!(q.int64, Some(142_857));
        assert_eq!(q.int64_via_float64, 142_857);
        assert!((q.float64 - 142_857.142_857).abs() < 1e-6, "{}", q.float64);
        assert!((q.float32 - 142_857.14).abs() < 0.02, "{}", q.float32);
    }

    #[test]
    fn test_representations_agree_within_rounding_rules() {
        let dividends = [0i64, 1, -1, 6, -6, 7, 99, -99, 1_000_000, -1_000_000, 2_147_483_647, -2_147_483_648];
        let divisors = [1i64, -1, 2, -2, 3, 7, -7, 10, 1000, 65_537];
        for t in dividends {
            for d in divisors {
                let q = divide_all(t, nz(d));
                // Truncation toward zero.
                assert_eq!(q.int64, Some(t / d), "{} / {}", t, d);
                assert_eq!(q.int32.map(i64::from), i32::try_from(t / d).ok().map(i64::from), "{} / {}", t, d);
                assert_eq!(q.int64_via_float64, t / d, "{} / {} via f64", t, d);
                // Correctly rounded float quotients bracket the exact value.
                let exact = t as f64 / d as f64;
                assert_eq!(q.float64, exact);
                assert_eq!(q.float64.trunc() as i64, t / d, "{} / {}", t, d);
                assert!((q.float32 as f64 - exact).abs() <= exact.abs() * 1e-6 + 1e-6, "{} / {}", t, d);
            }
        }
    }

    #[test]
    fn test_int32_absent_when_operands_do_not_fit() {
        assert_eq!(divide_all(1 << 40, nz(3)).int32, None);
        assert_eq!(divide_all(5, nz(1 << 40)).int32, None);
    }

    #[test]
    fn test_min_by_minus_one_has_no_integer_quotient() {
        let q = divide_all(i32::MIN as i64, nz(-1));
        assert_eq!(q.int32, None);
        assert_eq!(q.int64, Some(2_147_483_648));
        assert_eq!(q.float64, 2_147_483_648.0);
        assert_eq!(q.int64_via_float64, 2_147_483_648);

        let q = divide_all(i64::MIN, nz(-1));
        assert_eq!(q.int32, None);
        assert_eq!(q.int64, None);
        assert_eq!(q.float64, 9_223_372_036_854_775_808.0);
        assert_eq!(q.int64_via_float64, i64::MAX);
    }

    #[test]
    fn test_via_float_matches_native_below_exact_limit() {
        let d = 999;
        let mut t = F64_EXACT_LIMIT - d - 100_000;
        while t + d <= F64_EXACT_LIMIT {
            assert_eq!(via_f64(t, d), t / d, "{} / {}", t, d);
            assert_eq!(via_f64(-t, d), -t / d, "-{} / {}", t, d);
            t += 1;
        }
        let mut d = 1i64;
        while d < 1 << 40 {
            let t = F64_EXACT_LIMIT - d;
            assert_eq!(via_f64(t, d), t / d, "{} / {}", t, d);
            d = d * 3 + 1;
        }
    }

    #[test]
    fn test_via_float_diverges_past_exact_limit() {
        // Known boundary: i64::MAX is not representable in f64 and rounds up to
        // 2^63, so the quotient for d = 1 saturates instead of being exact.
        let t = i64::MAX - 1;
        assert_eq!(t / 1, i64::MAX - 1);
        assert_ne!(via_f64(t, 1), t);
        assert_eq!(via_f64(t, 1), i64::MAX);
        // 2^53 + 1 has no f64 representation either.
        let t = F64_EXACT_LIMIT + 1;
        assert_ne!(via_f64(t, 1), t);
    }

    #[test]
    fn test_divisors_never_zero() {
        assert_eq!(divisor_i32(0), 1);
        assert_eq!(divisor_i32(u64::MAX), i32::MAX);
        assert_eq!(divisor_i64(0), 1);
        assert_eq!(divisor_i64(u64::MAX), i64::MAX);
        assert_eq!(divisor_u64(0).get(), 1);
        assert_eq!(divisor_u64(12).get(), 12);
        assert_eq!(divisor_f32(0), 1.0);
        assert_eq!(divisor_f64(7), 7.0);
    }

    #[test]
    fn test_division_kernels() {
        assert_eq!(div_i32(0), i32::MAX);
        assert_eq!(div_i32(1), i32::MAX);
        assert_eq!(div_i32(2), i32::MAX / 2 / 2);
        assert_eq!(div_i64(3), i64::MAX / 27);
        assert_eq!(div_i64_checked(3), div_i64(3));
        assert_eq!(div_u64_nonzero(4), u64::MAX / 256);
        assert_eq!(div_i64_via_f64(1), i64::MAX);
        assert_eq!(div_i64_via_f64(1000), 0);
        assert_eq!(div_f64(2), 1e308 / 4.0);
        assert_eq!(div_f32(10), 1e38f32 / 10.0 / 10.0 / 10.0 / 10.0 / 10.0 / 10.0 / 10.0 / 10.0 / 10.0 / 10.0);
        assert_eq!(div_i64(100), 0);
    }

    #[test]
    fn test_shift_equals_halving_for_non_negative() {
        for t in (0..100_000i32).chain([i32::MAX - 1, i32::MAX]) {
            assert!(shr1_matches_div2_i32(t), "{}", t);
        }
        for t in (0..100_000i64).chain([i64::MAX - 1, i64::MAX, 1 << 40]) {
            assert!(shr1_matches_div2_i64(t), "{}", t);
        }
    }

    #[test]
    fn test_shift_diverges_from_division_on_negative_odd() {
        // Arithmetic shift floors; division truncates toward zero.
        assert_eq!(-7i32 >> 1, -4);
        assert_eq!(-7i32 / 2, -3);
        for t in -10_000i64..0 {
            let odd = t % 2 != 0;
            assert_eq!(shr1_matches_div2_i64(t), !odd, "{}", t);
            assert_eq!(shr1_matches_div2_i32(t as i32), !odd, "{}", t);
            assert_eq!(t >> 1, t.div_euclid(2), "{}", t);
            if odd {
                assert_eq!(t >> 1, t / 2 - 1, "{}", t);
            }
        }
        assert!(shr1_matches_div2_i32(i32::MIN));
        assert!(shr1_matches_div2_i64(i64::MIN));
    }

    #[test]
    fn test_shift_kernels() {
        assert_eq!(shr_i32(0), i32::MAX);
        assert_eq!(shr_i32(1), i32::MAX / 2);
        assert_eq!(shr_i32(31), 0);
        assert_eq!(shr_i32(1000), 0);
        assert_eq!(shr_i64(62), 1);
        assert_eq!(shr_i64(63), 0);
    }
}
