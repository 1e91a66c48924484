use proptest::prelude::*;
use sonar_core::stabilizer::{DIST_MAX_MM, DIST_MIN_MM, MAX_STEP_PER_TICK_MM};
use sonar_core::{RawRange, StabilizerCfg, StabilizerState, update};

// Raw readings biased toward the interesting regions: misses, out-of-range
// junk on both sides, and plausible distances.
fn raw_strategy() -> impl Strategy<Value = RawRange> {
    prop_oneof![
        2 => Just(RawRange::NoEcho),
        1 => (0u32..DIST_MIN_MM).prop_map(RawRange::Distance),
        1 => (DIST_MAX_MM + 1..6_000u32).prop_map(RawRange::Distance),
        6 => (DIST_MIN_MM..=DIST_MAX_MM).prop_map(RawRange::Distance),
    ]
}

proptest! {
    #[test]
    fn output_is_placeholder_or_in_range(inputs in prop::collection::vec(raw_strategy(), 1..300)) {
        let cfg = StabilizerCfg::default();
        let mut st = StabilizerState::new();
        for raw in inputs {
            let (out, next) = update(raw, st, &cfg);
            if next.initialized {
                prop_assert!((DIST_MIN_MM..=DIST_MAX_MM).contains(&out), "out {} escaped range", out);
            } else {
                prop_assert_eq!(out, 0);
            }
            prop_assert!(next.smoothed.is_finite());
            st = next;
        }
    }

    #[test]
    fn rejected_readings_never_touch_the_hold(inputs in prop::collection::vec(raw_strategy(), 1..300)) {
        let cfg = StabilizerCfg::default();
        let mut st = StabilizerState::new();
        for raw in inputs {
            let (_, next) = update(raw, st, &cfg);
            match cfg.accepts(raw) {
                Some(mm) => prop_assert_eq!(next.last_accepted, mm),
                None => {
                    prop_assert_eq!(next.last_accepted, st.last_accepted);
                    prop_assert_eq!(next.initialized, st.initialized);
                }
            }
            // Once set, never cleared.
            prop_assert!(!st.initialized || next.initialized);
            st = next;
        }
    }

    #[test]
    fn published_value_never_jumps_more_than_one_step(
        inputs in prop::collection::vec(raw_strategy(), 2..300),
        alpha in 0.01f64..=1.0,
    ) {
        let cfg = StabilizerCfg { alpha, ..StabilizerCfg::default() };
        let mut st = StabilizerState::new();
        let mut prev: Option<u32> = None;
        for raw in inputs {
            let (out, next) = update(raw, st, &cfg);
            if let (Some(p), true) = (prev, st.initialized) {
                prop_assert!(p.abs_diff(out) <= MAX_STEP_PER_TICK_MM, "{} -> {}", p, out);
            }
            prev = next.initialized.then_some(out);
            st = next;
        }
    }

    #[test]
    fn first_accepted_value_is_published_verbatim(
        misses in 0usize..20,
        v in DIST_MIN_MM..=DIST_MAX_MM,
    ) {
        let cfg = StabilizerCfg::default();
        let mut st = StabilizerState::new();
        for _ in 0..misses {
            st = update(RawRange::NoEcho, st, &cfg).1;
        }
        let (out, st) = update(RawRange::Distance(v), st, &cfg);
        prop_assert_eq!(out, v);
        prop_assert_eq!(st.smoothed, f64::from(v));
    }

    #[test]
    fn constant_input_converges(
        start in DIST_MIN_MM..=DIST_MAX_MM,
        v in DIST_MIN_MM..=DIST_MAX_MM,
    ) {
        let cfg = StabilizerCfg::default();
        let mut st = update(RawRange::Distance(start), StabilizerState::new(), &cfg).1;
        // 1950 mm at <= 20 mm per tick, then geometric at 0.75 per tick.
        for _ in 0..160 {
            st = update(RawRange::Distance(v), st, &cfg).1;
        }
        prop_assert!((st.smoothed - f64::from(v)).abs() < 1.0);
    }

    #[test]
    fn hold_converges_toward_last_good_value(
        start in DIST_MIN_MM..=DIST_MAX_MM,
        v in DIST_MIN_MM..=DIST_MAX_MM,
        gap in 160usize..200,
    ) {
        let cfg = StabilizerCfg::default();
        let mut st = update(RawRange::Distance(start), StabilizerState::new(), &cfg).1;
        st = update(RawRange::Distance(v), st, &cfg).1;
        for _ in 0..gap {
            st = update(RawRange::NoEcho, st, &cfg).1;
            prop_assert_eq!(st.last_accepted, v);
        }
        prop_assert!((st.smoothed - f64::from(v)).abs() < 1.0);
    }
}
