//! Delayed close of the bar after the pointer leaves it.
//!
//! Leaving the surface arms a close; entering the surface (or any button)
//! before the delay runs out disarms it. Only the most recently armed close
//! can ever be honoured: every arm gets a fresh generation and a timeout
//! carrying an older generation is dropped.

use std::time::Duration;
use tracing::{debug, trace};

pub const DEFAULT_CLOSE_DELAY: Duration = Duration::from_millis(500);

/// Something that can be cancelled before it fires.
pub trait PendingClose {
    fn cancel(self);
}

impl PendingClose for iced::task::Handle {
    fn cancel(self) {
        self.abort();
    }
}

#[derive(Debug)]
pub enum DismissState<H> {
    Idle,
    PendingClose { generation: u64, handle: H },
}

#[derive(Debug)]
pub struct DismissTimer<H> {
    state: DismissState<H>,
    next_generation: u64,
    delay: Duration,
}

impl<H: PendingClose> DismissTimer<H> {
    pub fn new(delay: Duration) -> Self {
        Self { state: DismissState::Idle, next_generation: 1, delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, DismissState::PendingClose { .. })
    }

    pub fn state(&self) -> &DismissState<H> {
        &self.state
    }

    /// Arm a close. `arm` receives the generation and delay and returns the
    /// handle of the scheduled action.
    pub fn schedule<F>(&mut self, arm: F) -> u64
    where
        F: FnOnce(u64, Duration) -> H,
    {
        self.cancel();

        let generation = self.next_generation;
        self.next_generation += 1;

        let handle = arm(generation, self.delay);
        self.state = DismissState::PendingClose { generation, handle };
        debug!("Close armed (generation {}, {:?})", generation, self.delay);
        generation
    }

    /// Disarm a pending close. No-op when idle.
    pub fn cancel(&mut self) {
        if let DismissState::PendingClose { generation, handle } =
            std::mem::replace(&mut self.state, DismissState::Idle)
        {
            debug!("Close cancelled (generation {})", generation);
            handle.cancel();
        }
    }

    /// Called when a scheduled close fires. Returns true if it is the one
    /// currently pending, in which case the timer is back to idle and the
    /// caller should shut down.
    pub fn expire(&mut self, fired: u64) -> bool {
        match self.state {
            DismissState::PendingClose { generation, .. } if generation == fired => {
                self.state = DismissState::Idle;
                debug!("Close timeout reached (generation {})", fired);
                true
            }
            _ => {
                trace!("Ignoring stale close timeout (generation {})", fired);
                false
            }
        }
    }
}

impl<H: PendingClose> Default for DismissTimer<H> {
    fn default() -> Self {
        Self::new(DEFAULT_CLOSE_DELAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Records which generations got cancelled.
    #[derive(Clone, Default)]
    struct Log(Rc<RefCell<Vec<u64>>>);

    struct FakeHandle {
        generation: u64,
        log: Log,
    }

    impl PendingClose for FakeHandle {
        fn cancel(self) {
            self.log.0.borrow_mut().push(self.generation);
        }
    }

    #[derive(Clone, Copy)]
    enum Pointer {
        Leave,
        Enter,
    }

    /// Feeds pointer events into the timer. Returns the generations armed
    /// so far.
    fn drive(timer: &mut DismissTimer<FakeHandle>, log: &Log, events: &[Pointer]) -> Vec<u64> {
        let mut armed = Vec::new();
        for event in events {
            match event {
                Pointer::Leave => {
                    let log = log.clone();
                    armed.push(timer.schedule(|generation, _| FakeHandle { generation, log }));
                }
                Pointer::Enter => timer.cancel(),
            }
        }
        armed
    }

    #[test]
    fn test_cancel_when_idle_is_noop() {
        let mut timer: DismissTimer<FakeHandle> = DismissTimer::default();
        timer.cancel();
        timer.cancel();
        assert!(!timer.is_pending());
        assert!(matches!(timer.state(), DismissState::Idle));
    }

    #[test]
    fn test_default_delay() {
        let timer: DismissTimer<FakeHandle> = DismissTimer::default();
        assert_eq!(timer.delay(), Duration::from_millis(500));
    }

    #[test]
    fn test_schedule_passes_delay_to_arm() {
        let mut timer = DismissTimer::new(Duration::from_millis(120));
        let log = Log::default();
        let mut seen = None;
        timer.schedule(|generation, delay| {
            seen = Some(delay);
            FakeHandle { generation, log: log.clone() }
        });
        assert_eq!(seen, Some(Duration::from_millis(120)));
        assert!(timer.is_pending());
    }

    #[test]
    fn test_leave_then_expire_fires_once() {
        let mut timer = DismissTimer::default();
        let log = Log::default();
        let armed = drive(&mut timer, &log, &[Pointer::Leave]);

        assert!(timer.expire(armed[0]));
        assert!(!timer.expire(armed[0]));
        assert!(!timer.is_pending());
    }

    #[test]
    fn test_enter_before_expiry_prevents_close() {
        let mut timer = DismissTimer::default();
        let log = Log::default();
        let armed = drive(&mut timer, &log, &[Pointer::Leave, Pointer::Enter]);

        assert!(!timer.is_pending());
        assert_eq!(*log.0.borrow(), armed);
        assert!(!timer.expire(armed[0]));
    }

    #[test]
    fn test_rescheduling_cancels_previous() {
        let mut timer = DismissTimer::default();
        let log = Log::default();
        let armed = drive(&mut timer, &log, &[Pointer::Leave, Pointer::Leave, Pointer::Leave]);

        assert_eq!(armed, vec![1, 2, 3]);
        assert_eq!(*log.0.borrow(), vec![1, 2]);
        assert!(!timer.expire(1));
        assert!(!timer.expire(2));
        assert!(timer.expire(3));
    }

    #[test]
    fn test_hovering_across_buttons_keeps_bar_open() {
        // Surface leave followed by a button enter, repeated while crossing gaps.
        let mut timer = DismissTimer::default();
        let log = Log::default();
        let events = [
            Pointer::Leave,
            Pointer::Enter,
            Pointer::Leave,
            Pointer::Enter,
            Pointer::Leave,
            Pointer::Enter,
        ];
        let armed = drive(&mut timer, &log, &events);

        assert!(!timer.is_pending());
        for generation in armed {
            assert!(!timer.expire(generation));
        }
    }

    #[test]
    fn test_last_event_decides_outcome() {
        let sequences: [&[Pointer]; 4] = [
            &[Pointer::Enter, Pointer::Leave],
            &[Pointer::Leave, Pointer::Enter, Pointer::Leave],
            &[Pointer::Leave, Pointer::Leave, Pointer::Enter],
            &[Pointer::Enter, Pointer::Enter],
        ];

        for events in sequences {
            let mut timer = DismissTimer::default();
            let log = Log::default();
            let armed = drive(&mut timer, &log, events);

            let fired = armed.iter().filter(|g| timer.expire(**g)).count();
            match events.last() {
                Some(Pointer::Leave) => assert_eq!(fired, 1),
                _ => assert_eq!(fired, 0),
            }
        }
    }
}
