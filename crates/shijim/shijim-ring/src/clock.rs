/// Returns the current monotonic time in nanoseconds.
///
/// Used to stamp `publish_ts_ns` on the publish path; a raw clock_gettime
/// avoids the Instant bookkeeping.
#[inline(always)]
pub fn monotonic_ns() -> u64 {
    clock_ns(libc::CLOCK_MONOTONIC)
}

/// Returns the realtime (epoch) clock in nanoseconds.
///
/// Only used for the diagnostic `created_ns` header field.
#[inline(always)]
pub fn epoch_ns() -> u64 {
    clock_ns(libc::CLOCK_REALTIME)
}

#[inline(always)]
fn clock_ns(clock: libc::clockid_t) -> u64 {
    let mut ts: libc::timespec = unsafe { core::mem::zeroed() };
    unsafe { libc::clock_gettime(clock, &mut ts) };
    ts.tv_sec as u64 * 1_000_000_000 + ts.tv_nsec as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monotonic_does_not_go_backwards() {
        let a = monotonic_ns();
        let b = monotonic_ns();
        assert!(b >= a);
    }
}
