use std::sync::atomic::AtomicBool;
use std::time::Duration;

use sonar_core::mocks::VecSink;
use sonar_core::runner::{RunParams, poll_tick, run};
use sonar_core::{TelemetrySampler, TickGate, TickStatus};
use sonar_hardware::{SimulatedButton, SimulatedPot, SimulatedTransducer, echo_us_for_mm};
use sonar_traits::Clock;
use sonar_traits::clock::test_clock::TestClock;

fn sampler(
    echoes: Vec<u32>,
) -> TelemetrySampler<SimulatedTransducer, SimulatedButton, SimulatedPot> {
    TelemetrySampler::builder()
        .with_transducer(SimulatedTransducer::scripted(echoes))
        .with_buttons(SimulatedButton::new(), SimulatedButton::new())
        .with_pot(SimulatedPot::new(2048))
        .build()
        .unwrap()
}

#[test]
fn runs_exactly_max_ticks_at_the_nominal_rate() {
    let clock = TestClock::new();
    let mut s = sampler(vec![echo_us_for_mm(500), 0, echo_us_for_mm(1800)]);
    let mut sink = VecSink::default();
    let shutdown = AtomicBool::new(false);

    let stats = run(
        &mut s,
        &mut sink,
        &clock,
        RunParams {
            tick_hz: 30,
            max_ticks: Some(5),
        },
        &shutdown,
    )
    .unwrap();

    assert_eq!(stats.ticks, 5);
    assert_eq!(stats.overruns, 0);
    assert!(sink.began && sink.flushed);
    let dists: Vec<u32> = sink.records.iter().map(|r| r.dist_mm).collect();
    // Ticks 4 and 5 keep easing toward 1800 under the slew limit.
    assert_eq!(dists[..3], [500, 500, 520]);
    assert!(dists[3] > 520 && dists[3] - 520 <= 80);
    // First tick fires at t=0; four more intervals of 33_333us follow.
    assert_eq!(clock.elapsed(), Duration::from_micros(4 * 33_333));
}

#[test]
fn raised_shutdown_stops_before_the_first_tick() {
    let clock = TestClock::new();
    let mut s = sampler(vec![]);
    let mut sink = VecSink::default();
    let shutdown = AtomicBool::new(true);

    let stats = run(
        &mut s,
        &mut sink,
        &clock,
        RunParams {
            tick_hz: 30,
            max_ticks: None,
        },
        &shutdown,
    )
    .unwrap();

    assert_eq!(stats.ticks, 0);
    assert!(sink.records.is_empty());
    assert!(sink.flushed);
}

#[test]
fn poll_tick_reports_time_until_due() {
    let clock = TestClock::new();
    let mut s = sampler(vec![echo_us_for_mm(250)]);
    let mut gate = TickGate::new(Duration::from_millis(33));
    let mut sink = VecSink::default();

    let t0 = clock.now();
    match poll_tick(&mut s, &mut gate, &mut sink, t0).unwrap() {
        TickStatus::Sampled(rec) => assert_eq!(rec.dist_mm, 250),
        other => panic!("expected a tick, got {other:?}"),
    }
    clock.advance(Duration::from_millis(10));
    assert_eq!(
        poll_tick(&mut s, &mut gate, &mut sink, clock.now()).unwrap(),
        TickStatus::NotDue(Duration::from_millis(23))
    );
    assert_eq!(sink.records.len(), 1);
}
