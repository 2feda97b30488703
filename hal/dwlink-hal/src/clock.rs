//! Monotonic time source

/// Monotonic microsecond clock
///
/// Wraparound follows plain `i64` overflow; callers compute elapsed time
/// with `wrapping_sub`.
pub trait MonotonicClock {
    /// Current time in microseconds since an arbitrary epoch
    fn now_us(&self) -> i64;
}

impl<T: MonotonicClock + ?Sized> MonotonicClock for &T {
    fn now_us(&self) -> i64 {
        T::now_us(self)
    }
}

/// Clock backed by the embassy time driver
#[cfg(feature = "embassy-time")]
#[derive(Debug, Default, Clone, Copy)]
pub struct EmbassyClock;

#[cfg(feature = "embassy-time")]
impl MonotonicClock for EmbassyClock {
    fn now_us(&self) -> i64 {
        embassy_time::Instant::now().as_micros() as i64
    }
}
