use sonar_core::error::BuildError;
use sonar_core::mocks::FailingInput;
use sonar_core::{RangingCfg, RawRange, StabilizerCfg, TelemetryRecord, TelemetrySampler};
use sonar_hardware::{
    ButtonBias, SimulatedButton, SimulatedPot, SimulatedTransducer, echo_us_for_mm,
};

fn sim_sampler(
    echoes: Vec<u32>,
) -> (
    TelemetrySampler<SimulatedTransducer, SimulatedButton, SimulatedPot>,
    SimulatedButton,
    SimulatedButton,
    SimulatedPot,
) {
    let b1 = SimulatedButton::new();
    let b2 = SimulatedButton::new();
    let pot = SimulatedPot::new(2048);
    let sampler = TelemetrySampler::builder()
        .with_transducer(SimulatedTransducer::scripted(echoes))
        .with_buttons(b1.clone(), b2.clone())
        .with_pot(pot.clone())
        .build()
        .unwrap();
    (sampler, b1, b2, pot)
}

#[test]
fn end_to_end_three_ticks() {
    let (mut s, ..) = sim_sampler(vec![echo_us_for_mm(500), 0, echo_us_for_mm(1800)]);

    let dists: Vec<u32> = (0..3).map(|_| s.sample().unwrap().dist_mm).collect();
    assert_eq!(dists, vec![500, 500, 520]);
    assert_eq!(s.ticks(), 3);
    assert_eq!(s.last_raw(), Some(RawRange::Distance(1800)));
    assert_eq!(s.stabilizer().state().last_accepted, 1800);
}

#[test]
fn buttons_and_pot_pass_through() {
    let (mut s, b1, _b2, pot) = sim_sampler(vec![]);
    b1.press();
    let rec = s.sample().unwrap();
    assert_eq!(
        rec,
        TelemetryRecord {
            btn1: true,
            btn2: false,
            pot: 2048,
            dist_mm: 0,
        }
    );
    assert_eq!(rec.to_string(), "1,0,2048,0");

    b1.release();
    pot.set(17);
    let rec = s.sample().unwrap();
    assert_eq!(rec.to_string(), "0,0,17,0");
}

#[test]
fn silent_sensor_publishes_placeholder_forever() {
    let (mut s, ..) = sim_sampler(vec![]);
    for _ in 0..50 {
        assert_eq!(s.sample().unwrap().dist_mm, 0);
    }
    assert!(!s.stabilizer().state().initialized);
}

#[test]
fn dropouts_hold_the_last_good_distance() {
    let mut echoes = vec![echo_us_for_mm(900)];
    echoes.extend(std::iter::repeat_n(0, 10));
    echoes.push(echo_us_for_mm(10)); // too close: rejected
    let (mut s, ..) = sim_sampler(echoes);
    for _ in 0..12 {
        assert_eq!(s.sample().unwrap().dist_mm, 900);
    }
}

#[test]
fn input_failures_fail_the_tick() {
    let mut s = TelemetrySampler::builder()
        .with_transducer(SimulatedTransducer::constant_mm(500))
        .with_buttons(FailingInput, FailingInput)
        .with_pot(SimulatedPot::new(0))
        .build()
        .unwrap();
    let err = s.sample().expect_err("button read failure must surface");
    assert!(err.to_string().contains("input line unavailable"));
}

#[test]
fn builder_reports_missing_parts() {
    let err = TelemetrySampler::<SimulatedTransducer, SimulatedButton, SimulatedPot>::builder()
        .try_build()
        .unwrap_err();
    assert!(matches!(err, BuildError::MissingTransducer));

    let err = TelemetrySampler::<SimulatedTransducer, SimulatedButton, SimulatedPot>::builder()
        .with_transducer(SimulatedTransducer::silent())
        .try_build()
        .unwrap_err();
    assert!(matches!(err, BuildError::MissingButtons));

    let err = TelemetrySampler::<SimulatedTransducer, SimulatedButton, SimulatedPot>::builder()
        .with_transducer(SimulatedTransducer::silent())
        .with_buttons(SimulatedButton::new(), SimulatedButton::new())
        .try_build()
        .unwrap_err();
    assert!(matches!(err, BuildError::MissingPot));
}

#[test]
fn builder_rejects_invalid_policy() {
    let err = TelemetrySampler::builder()
        .with_transducer(SimulatedTransducer::silent())
        .with_buttons(SimulatedButton::new(), SimulatedButton::new())
        .with_pot(SimulatedPot::new(0))
        .with_stabilizer(StabilizerCfg {
            alpha: 0.0,
            ..StabilizerCfg::default()
        })
        .try_build()
        .unwrap_err();
    assert!(matches!(err, BuildError::InvalidConfig(_)));

    let err = TelemetrySampler::builder()
        .with_transducer(SimulatedTransducer::silent())
        .with_buttons(SimulatedButton::new(), SimulatedButton::new())
        .with_pot(SimulatedPot::new(0))
        .with_ranging(RangingCfg {
            echo_timeout: std::time::Duration::ZERO,
            ..RangingCfg::default()
        })
        .try_build()
        .unwrap_err();
    assert!(matches!(err, BuildError::InvalidConfig(_)));
}

#[test]
fn active_high_buttons_can_be_selected() {
    let b1 = SimulatedButton::with_bias(ButtonBias::PullDown);
    let b2 = SimulatedButton::with_bias(ButtonBias::PullDown);
    let mut s = TelemetrySampler::builder()
        .with_transducer(SimulatedTransducer::silent())
        .with_buttons(b1.clone(), b2)
        .with_pot(SimulatedPot::new(0))
        .buttons_active_low(false)
        .build()
        .unwrap();
    let rec = s.sample().unwrap();
    assert!(!rec.btn1 && !rec.btn2, "released pulled-down buttons read 0");
    b1.press();
    let rec = s.sample().unwrap();
    assert!(rec.btn1 && !rec.btn2);
}
