use std::sync::atomic::{AtomicBool, Ordering};

/// Single-slot request guard.
///
/// At most one holder at a time. A caller that finds the slot taken is
/// expected to drop its request: nothing is queued and the running request
/// is never cancelled, so the result a caller sees may be older than its own
/// trigger.
#[derive(Debug, Default)]
pub struct SingleFlight {
    busy: AtomicBool,
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_acquire(&self) -> Option<FlightPermit<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| FlightPermit { busy: &self.busy })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Frees the slot on drop, including when the owning future is dropped mid-flight.
#[derive(Debug)]
pub struct FlightPermit<'a> {
    busy: &'a AtomicBool,
}

impl Drop for FlightPermit<'_> {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}
