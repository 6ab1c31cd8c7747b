use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use uuid::Uuid;

use crate::math::Vector;
use crate::options::DefaultOptions;
use crate::page::Page;

/// Everything a cursor's operations share: the page, the tracked pointer
/// position, the idle gate and the configured defaults.
///
/// One context per cursor. The idle task holds its own `Arc` to it.
pub struct CursorContext<P: Page> {
    id: Uuid,
    page: Arc<P>,
    previous: Mutex<Vector>,
    idle_allowed: AtomicBool,
    defaults: DefaultOptions,
}

impl<P: Page> CursorContext<P> {
    pub fn new(page: Arc<P>, start: Vector, defaults: DefaultOptions) -> Self {
        Self {
            id: Uuid::new_v4(),
            page,
            previous: Mutex::new(start),
            idle_allowed: AtomicBool::new(false),
            defaults,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    pub fn defaults(&self) -> &DefaultOptions {
        &self.defaults
    }

    /// Last position the pointer was moved to.
    pub fn location(&self) -> Vector {
        *self.previous.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn set_location(&self, point: Vector) {
        *self.previous.lock().unwrap_or_else(PoisonError::into_inner) = point;
    }

    pub fn idle_allowed(&self) -> bool {
        self.idle_allowed.load(Ordering::Acquire)
    }

    pub fn set_idle_allowed(&self, allowed: bool) {
        self.idle_allowed.store(allowed, Ordering::Release);
    }

    /// Close the idle gate until the returned guard drops.
    pub(crate) fn begin_action(&self) -> ActionGuard<'_> {
        let prior = self.idle_allowed.swap(false, Ordering::AcqRel);
        ActionGuard {
            gate: &self.idle_allowed,
            prior,
        }
    }
}

/// Restores the idle gate to its value before the action started.
pub(crate) struct ActionGuard<'a> {
    gate: &'a AtomicBool,
    prior: bool,
}

impl Drop for ActionGuard<'_> {
    fn drop(&mut self) {
        self.gate.store(self.prior, Ordering::Release);
    }
}
