#[cfg(test)]
mod tests {
    use crate::driver::measure;
    use crate::perf::format::{FloatStrategy, FormatVariant, IntStrategy, write_float, write_int};
    use crate::perf::scenarios::find;

    const INT_STRATEGIES: [IntStrategy; 4] = [
        IntStrategy::Display,
        IntStrategy::Itoa,
        IntStrategy::ToString,
        IntStrategy::FormatMacro,
    ];

    const FLOAT_STRATEGIES: [FloatStrategy; 3] = [FloatStrategy::Fixed, FloatStrategy::Shortest, FloatStrategy::Ryu];

    fn render_int<I: itoa::Integer + std::fmt::Display>(strategy: IntStrategy, v: I) -> String {
        let mut buf = String::new();
        write_int(&mut buf, strategy, v);
        buf
    }

    fn render_float<F: ryu::Float + std::fmt::Display>(strategy: FloatStrategy, v: F) -> String {
        let mut buf = String::new();
        write_float(&mut buf, strategy, v);
        buf
    }

    #[test]
    fn test_int_strategies_round_trip() {
        for strategy in INT_STRATEGIES {
            for v in [0i32, 1, -1, 42, -42, i32::MAX, i32::MIN] {
                let s = render_int(strategy, v);
                assert_eq!(s.parse::<i32>().unwrap(), v, "{:?} rendered {}", strategy, s);
            }
            for v in [0i64, 7, -7, 1 << 40, i64::MAX, i64::MIN] {
                let s = render_int(strategy, v);
                assert_eq!(s.parse::<i64>().unwrap(), v, "{:?} rendered {}", strategy, s);
            }
        }
    }

    #[test]
    fn test_int_strategies_agree() {
        for v in [-123_456_789i64, 0, 98_765] {
            let expected = render_int(IntStrategy::Display, v);
            for strategy in INT_STRATEGIES {
                assert_eq!(render_int(strategy, v), expected, "{:?}", strategy);
            }
        }
    }

    #[test]
    fn test_shortest_float_strategies_round_trip() {
        let f64s = [
            0.0f64,
            1.0,
            -1.5,
            0.1,
            123_456.789,
            1e-300,
            f64::MIN_POSITIVE,
            f64::MAX,
            f64::MIN,
        ];
        let f32s = [0.0f32, 1.0, -2.5, 0.1, 3.402_823e38, f32::MAX, f32::MIN, f32::MIN_POSITIVE];
        for strategy in [FloatStrategy::Shortest, FloatStrategy::Ryu] {
            for v in f64s {
                let s = render_float(strategy, v);
                assert_eq!(s.parse::<f64>().unwrap(), v, "{:?} rendered {}", strategy, s);
            }
            for v in f32s {
                let s = render_float(strategy, v);
                assert_eq!(s.parse::<f32>().unwrap(), v, "{:?} rendered {}", strategy, s);
            }
        }
    }

    #[test]
    fn test_fixed_round_trips_values_with_short_fractions() {
        for v in [0.0f64, 1.0, -1.5, 0.25, 123_456.5, -1e300, f64::MAX] {
            let s = render_float(FloatStrategy::Fixed, v);
            assert_eq!(s.split_once('.').map(|(_, frac)| frac.len()), Some(6), "{}", s);
            assert_eq!(s.parse::<f64>().unwrap(), v, "rendered {}", s);
        }
        for v in [0.0f32, 1.0, -2.5, 0.1, f32::MAX] {
            let s = render_float(FloatStrategy::Fixed, v);
            assert_eq!(s.parse::<f32>().unwrap(), v, "rendered {}", s);
        }
    }

    #[test]
    fn test_fixed_is_lossy_past_six_fraction_digits() {
        let s = render_float(FloatStrategy::Fixed, 1e-7f64);
        assert_eq!(s, "0.000000");
        assert_ne!(s.parse::<f64>().unwrap(), 1e-7);

        let s = render_float(FloatStrategy::Fixed, 0.123_456_7f64);
        assert_eq!(s, "0.123457");
    }

    #[test]
    fn test_float_renderings() {
        assert_eq!(render_float(FloatStrategy::Fixed, 3.0f64), "3.000000");
        assert_eq!(render_float(FloatStrategy::Shortest, 3.0f64), "3");
        assert_eq!(render_float(FloatStrategy::Ryu, 3.0f64), "3.0");
        assert_eq!(render_float(FloatStrategy::Ryu, 1e308f64), "1e308");
        for strategy in FLOAT_STRATEGIES {
            assert!(!render_float(strategy, -0.5f32).is_empty());
        }
    }

    #[test]
    fn test_variants_render_counter() {
        let mut buf = String::new();
        FormatVariant::DisplayInt32.render(5, &mut buf);
        FormatVariant::ItoaInt64.render(6, &mut buf);
        FormatVariant::FixedFloat32.render(7, &mut buf);
        assert_eq!(buf, "567.000000");

        buf.clear();
        FormatVariant::DisplayInt32.render((1u64 << 32) + 1, &mut buf);
        assert_eq!(buf, "1");
    }

    #[test]
    fn test_non_allocating_variants_report_zero_allocs() {
        for variant in [
            FormatVariant::DisplayInt32,
            FormatVariant::DisplayInt64,
            FormatVariant::FixedFloat32,
            FormatVariant::FixedFloat64,
            FormatVariant::ShortestFloat32,
            FormatVariant::ShortestFloat64,
            FormatVariant::RyuFloat64,
            FormatVariant::ItoaInt64,
        ] {
            let name = format!("format/{}", variant.name());
            let case = find(&name).expect("registered format case");
            let m = measure(case, 500).unwrap();
            let allocs = m.allocs.expect("format cases report allocations");
            assert_eq!(allocs.allocs, 0, "{}", name);
        }
    }

    #[test]
    fn test_temporary_string_variants_allocate_every_iteration() {
        for variant in [FormatVariant::ToStringInt64, FormatVariant::FormatMacroInt32] {
            let name = format!("format/{}", variant.name());
            let case = find(&name).expect("registered format case");
            let m = measure(case, 500).unwrap();
            assert!(m.allocs_per_iter().unwrap() >= 1, "{}: {:?}", name, m.allocs);
        }
    }
}
