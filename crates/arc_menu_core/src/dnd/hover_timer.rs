use std::time::Duration;

use log::debug;

/// Result of [`HoverTimer::arm`].
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ArmOutcome<T> {
    Armed,
    /// The same target was already pending; nothing changed.
    AlreadyArmed,
    /// A different target was pending and got cancelled.
    Replaced(T),
}

#[derive(Debug, Clone)]
struct Pending<T> {
    target: T,
    deadline: Duration,
}

/// A single cancellable "open this target later" action.
///
/// Armed means exactly one pending target. [`HoverTimer::poll`] hands the
/// target back once, when the deadline has passed, and disarms the timer.
#[derive(Debug, Clone)]
pub struct HoverTimer<T> {
    pending: Option<Pending<T>>,
}

impl<T> Default for HoverTimer<T> {
    fn default() -> Self {
        HoverTimer { pending: None }
    }
}

impl<T: PartialEq + Clone + std::fmt::Debug> HoverTimer<T> {
    pub fn arm(&mut self, target: T, delay: Duration, now: Duration) -> ArmOutcome<T> {
        let replaced = match self.pending.take() {
            Some(pending) if pending.target == target => {
                self.pending = Some(pending);
                return ArmOutcome::AlreadyArmed;
            }
            Some(pending) => Some(pending.target),
            None => None,
        };
        debug!("hover timer armed for {:?} in {:?}", target, delay);
        self.pending = Some(Pending {
            target,
            deadline: now + delay,
        });
        match replaced {
            Some(old) => ArmOutcome::Replaced(old),
            None => ArmOutcome::Armed,
        }
    }

    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|p| p.target)
    }

    /// Cancels only when `target` is the pending one.
    pub fn cancel_for(&mut self, target: &T) -> bool {
        if self.target() == Some(target) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    pub fn poll(&mut self, now: Duration) -> Option<T> {
        let due = self
            .pending
            .as_ref()
            .map_or(false, |pending| now >= pending.deadline);
        if due {
            self.pending.take().map(|p| p.target)
        } else {
            None
        }
    }

    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    pub fn target(&self) -> Option<&T> {
        self.pending.as_ref().map(|p| &p.target)
    }

    /// Time left until the pending target fires.
    pub fn remaining(&self, now: Duration) -> Option<Duration> {
        self.pending
            .as_ref()
            .map(|p| p.deadline.saturating_sub(now))
    }
}
