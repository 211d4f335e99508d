//! Monotonic microsecond clock.

/// Source of monotonic time in microseconds.
///
/// The counter is expected to wrap around at `u32::MAX` like the timer of a
/// microcontroller; all elapsed-time arithmetic in this crate uses wrapping
/// subtraction so that the wrap is invisible to the engine.
pub trait Clock {
    /// Microseconds since a clock-specific reference point, wrapping.
    fn now_micros(&self) -> u32;

    /// Microseconds elapsed since `since`, correct across one wrap.
    #[inline]
    fn elapsed_since(&self, since: u32) -> u32 {
        self.now_micros().wrapping_sub(since)
    }
}

impl<F> Clock for F
where
    F: Fn() -> u32,
{
    #[inline]
    fn now_micros(&self) -> u32 {
        self()
    }
}

/// Clock backed by the operating system's monotonic clock.
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy)]
pub struct StdClock {
    origin: std::time::Instant,
}

#[cfg(feature = "std")]
impl StdClock {
    /// Create a clock starting at zero now.
    pub fn new() -> Self {
        Self {
            origin: std::time::Instant::now(),
        }
    }
}

#[cfg(feature = "std")]
impl Default for StdClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl Clock for StdClock {
    fn now_micros(&self) -> u32 {
        // Truncation is the wrap
        self.origin.elapsed().as_micros() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    #[test]
    fn test_closure_clock() {
        let now = Cell::new(1_000u32);
        let clock = || now.get();
        assert_eq!(clock.now_micros(), 1_000);
        now.set(1_500);
        assert_eq!(clock.elapsed_since(1_000), 500);
    }

    #[test]
    fn test_elapsed_across_wrap() {
        let now = Cell::new(u32::MAX - 99);
        let clock = || now.get();
        let start = clock.now_micros();
        now.set(now.get().wrapping_add(250));
        assert_eq!(clock.now_micros(), 150);
        assert_eq!(clock.elapsed_since(start), 250);
    }

    #[cfg(feature = "std")]
    #[test]
    fn test_std_clock_is_monotonic() {
        let clock = StdClock::new();
        let a = clock.now_micros();
        std::thread::sleep(std::time::Duration::from_millis(2));
        assert!(clock.elapsed_since(a) >= 2_000);
    }
}
