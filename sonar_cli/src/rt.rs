//! Real-time scheduling helpers (Linux SCHED_FIFO / mlockall).

/// Clamp a requested SCHED_FIFO priority into the platform range; `None`
/// picks the midpoint so the sampler does not starve kernel threads.
pub fn effective_priority(requested: Option<i32>, min: i32, max: i32) -> i32 {
    let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
    requested.map_or(lo + (hi - lo) / 2, |p| p.clamp(lo, hi))
}

#[cfg(target_os = "linux")]
pub fn setup_rt_once(rt: bool, prio: Option<i32>) {
    use libc::{
        MCL_CURRENT, MCL_FUTURE, SCHED_FIFO, mlockall, sched_get_priority_max,
        sched_get_priority_min, sched_param, sched_setscheduler,
    };
    use std::sync::OnceLock;
    static RT_ONCE: OnceLock<()> = OnceLock::new();

    if !rt {
        return;
    }

    RT_ONCE.get_or_init(|| {
        let (min, max) =
            unsafe { (sched_get_priority_min(SCHED_FIFO), sched_get_priority_max(SCHED_FIFO)) };
        if min < 0 || max < 0 {
            tracing::warn!(
                error = %std::io::Error::last_os_error(),
                "cannot query SCHED_FIFO priority range; skipping"
            );
        } else {
            let want = effective_priority(prio, min, max);
            if prio.is_some_and(|p| p != want) {
                tracing::warn!(requested = ?prio, used = want, min, max, "rt priority clamped");
            }
            // sched_param has extra fields on some targets; start zeroed.
            let mut param: sched_param = unsafe { std::mem::zeroed() };
            param.sched_priority = want;
            let rc = unsafe { sched_setscheduler(0, SCHED_FIFO, &param) };
            if rc == 0 {
                tracing::info!(prio = want, "SCHED_FIFO enabled");
            } else {
                tracing::warn!(
                    error = %std::io::Error::last_os_error(),
                    "SCHED_FIFO unavailable; continuing with default scheduling"
                );
            }
        }

        let rc = unsafe { mlockall(MCL_CURRENT | MCL_FUTURE) };
        if rc == 0 {
            tracing::info!("memory locked (mlockall)");
        } else {
            tracing::warn!(
                error = %std::io::Error::last_os_error(),
                "mlockall failed; raise the memlock ulimit or run with CAP_IPC_LOCK"
            );
        }
    });
}

#[cfg(not(target_os = "linux"))]
pub fn setup_rt_once(rt: bool, _prio: Option<i32>) {
    if rt {
        tracing::warn!("real-time mode is only supported on Linux; ignoring --rt");
    }
}
