use std::time::Instant;

/// Deferred controller events that complete a flip or navigation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DelayedEvent {
    NavSettle { delta: isize },
    FlipSettle,
}

#[derive(Debug)]
struct Scheduled {
    seq: u64,
    due: Instant,
    event: DelayedEvent,
}

/// Timers owned by the controller. Nothing fires on its own: the event loop
/// calls [`Timers::take_due`] on every tick.
#[derive(Debug, Default)]
pub struct Timers {
    pending: Vec<Scheduled>,
    next_seq: u64,
}

impl Timers {
    /// Events due at the same instant fire in scheduling order.
    pub fn schedule(&mut self, event: DelayedEvent, due: Instant) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push(Scheduled { seq, due, event });
    }

    pub fn cancel_all(&mut self) {
        self.pending.clear();
    }

    /// Remove and return every event due at `now`, earliest first.
    pub fn take_due(&mut self, now: Instant) -> Vec<DelayedEvent> {
        let (mut due, rest): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|s| s.due <= now);
        self.pending = rest;
        due.sort_by_key(|s| (s.due, s.seq));
        due.into_iter().map(|s| s.event).collect()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.iter().map(|s| s.due).min()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn fires_only_when_due_in_order() {
        let start = Instant::now();
        let mut timers = Timers::default();
        timers.schedule(DelayedEvent::FlipSettle, start + Duration::from_millis(200));
        timers.schedule(
            DelayedEvent::NavSettle { delta: 1 },
            start + Duration::from_millis(100),
        );

        assert!(timers.take_due(start).is_empty());
        assert_eq!(
            timers.take_due(start + Duration::from_millis(250)),
            vec![DelayedEvent::NavSettle { delta: 1 }, DelayedEvent::FlipSettle]
        );
        assert!(timers.is_empty());
    }

    #[test]
    fn same_deadline_keeps_scheduling_order() {
        let start = Instant::now();
        let mut timers = Timers::default();
        timers.schedule(DelayedEvent::FlipSettle, start);
        timers.schedule(DelayedEvent::NavSettle { delta: -1 }, start);
        assert_eq!(
            timers.take_due(start),
            vec![DelayedEvent::FlipSettle, DelayedEvent::NavSettle { delta: -1 }]
        );
    }

    #[test]
    fn cancel_all_drops_pending_events() {
        let start = Instant::now();
        let mut timers = Timers::default();
        timers.schedule(DelayedEvent::FlipSettle, start);
        timers.cancel_all();
        assert!(timers.take_due(start + Duration::from_secs(1)).is_empty());
    }

    #[test]
    fn next_deadline_is_earliest() {
        let start = Instant::now();
        let mut timers = Timers::default();
        assert_eq!(timers.next_deadline(), None);
        timers.schedule(DelayedEvent::FlipSettle, start + Duration::from_millis(50));
        timers.schedule(DelayedEvent::FlipSettle, start + Duration::from_millis(10));
        assert_eq!(timers.next_deadline(), Some(start + Duration::from_millis(10)));
        timers.cancel_all();
        assert!(timers.is_empty());
    }
}
