//! Gate for the stderr log layer while the terminal session owns the screen.

use std::sync::atomic::{AtomicBool, Ordering};

static SUSPENDED: AtomicBool = AtomicBool::new(false);

/// Whether console logging is currently held back.
pub fn is_suspended() -> bool {
    SUSPENDED.load(Ordering::Acquire)
}

/// Hold back console logging until the returned guard is dropped.
pub fn suspend() -> ConsoleSuspension {
    ConsoleSuspension {
        previous: SUSPENDED.swap(true, Ordering::AcqRel),
    }
}

pub struct ConsoleSuspension {
    previous: bool,
}

impl Drop for ConsoleSuspension {
    fn drop(&mut self) {
        SUSPENDED.store(self.previous, Ordering::Release);
    }
}
