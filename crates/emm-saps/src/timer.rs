//! Timer service. `SoftwareTimerService` is grounded on the reference stack's CMCE call-hangtime
//! expiry check (`hangtime_start: Option<TdmaTime>`, aged via `TdmaTime::age` and polled once per
//! tick in `tick_start`): the same `Option<deadline> + age-check-on-poll` shape, translated from
//! TDMA frame count to wall-clock `std::time::Instant`, since the Attach core has no radio frame
//! clock of its own.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use emm_core::ids::{TimerId, UeId};

/// Which NAS timer a running deadline belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Attach Accept retransmission, owned by the Attach Coordinator.
    T3450,
    /// Authentication Request retransmission, owned by the Authentication common procedure.
    T3460,
    /// Identity Request retransmission, owned by the Identification common procedure.
    T3470,
}

pub trait TimerService {
    fn start(&mut self, ueid: UeId, kind: TimerKind, duration: Duration) -> TimerId;
    fn restart(&mut self, id: TimerId, duration: Duration) -> TimerId;
    fn stop(&mut self, id: TimerId);
    /// Returns the `(UeId, TimerKind)` pairs whose deadline has passed as of `now`, removing
    /// them from the running set. Meant to be called once per event-loop tick.
    fn poll_expired(&mut self, now: Instant) -> Vec<(UeId, TimerKind)>;
}

struct RunningTimer {
    ueid: UeId,
    kind: TimerKind,
    deadline: Instant,
}

/// Reference `TimerService` implementation: an in-memory map of running deadlines, aged against
/// a caller-supplied `Instant` on each `poll_expired` call.
#[derive(Default)]
pub struct SoftwareTimerService {
    next_id: u64,
    running: HashMap<TimerId, RunningTimer>,
}

impl SoftwareTimerService {
    pub fn new() -> Self {
        Self { next_id: 1, running: HashMap::new() }
    }

    fn alloc_id(&mut self) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        id
    }
}

impl TimerService for SoftwareTimerService {
    fn start(&mut self, ueid: UeId, kind: TimerKind, duration: Duration) -> TimerId {
        let id = self.alloc_id();
        let deadline = Instant::now() + duration;
        self.running.insert(id, RunningTimer { ueid, kind, deadline });
        id
    }

    fn restart(&mut self, id: TimerId, duration: Duration) -> TimerId {
        if let Some(timer) = self.running.get_mut(&id) {
            timer.deadline = Instant::now() + duration;
            id
        } else {
            // Stopped or never-started timer: nothing to restart against, matching the
            // reference `restart(id) -> id` contract of returning the handle regardless.
            id
        }
    }

    fn stop(&mut self, id: TimerId) {
        self.running.remove(&id);
    }

    fn poll_expired(&mut self, now: Instant) -> Vec<(UeId, TimerKind)> {
        let expired_ids: Vec<TimerId> =
            self.running.iter().filter(|(_, t)| now >= t.deadline).map(|(id, _)| *id).collect();

        expired_ids
            .into_iter()
            .filter_map(|id| self.running.remove(&id).map(|t| (t.ueid, t.kind)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expired_timer_is_reported_once() {
        let mut svc = SoftwareTimerService::new();
        let id = svc.start(UeId(1), TimerKind::T3450, Duration::from_millis(0));
        let now = Instant::now() + Duration::from_millis(1);
        let expired = svc.poll_expired(now);
        assert_eq!(expired, vec![(UeId(1), TimerKind::T3450)]);
        assert!(svc.poll_expired(now).is_empty());
        let _ = id;
    }

    #[test]
    fn stopped_timer_never_expires() {
        let mut svc = SoftwareTimerService::new();
        let id = svc.start(UeId(2), TimerKind::T3460, Duration::from_millis(0));
        svc.stop(id);
        let now = Instant::now() + Duration::from_millis(5);
        assert!(svc.poll_expired(now).is_empty());
    }
}
