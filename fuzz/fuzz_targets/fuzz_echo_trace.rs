#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(trace) = sonar_config::parse_echo_trace(data) {
        let echoes = trace.echoes_per_tick();
        let rows = trace.rows();
        // Gap filling spans first..=last tick.
        if let (Some(first), Some(last)) = (rows.first(), rows.last()) {
            assert_eq!(echoes.len() as u64, last.tick - first.tick + 1);
        }
    }
});
