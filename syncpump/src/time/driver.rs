use super::timer::TimerEntry;

use std::collections::BinaryHeap;
use std::sync::OnceLock;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Instant;

/// Command channel of the timer thread, started on first use.
static TIMER_THREAD: OnceLock<Sender<TimerEntry>> = OnceLock::new();

/// Hands `entry` to the timer thread.
///
/// The entry's waker is invoked from the timer thread once the deadline
/// passes. For a pumped future this posts a `Wake` item to its pump.
pub(crate) fn register(entry: TimerEntry) {
    let sender = TIMER_THREAD.get_or_init(start);

    if let Err(mpsc::SendError(entry)) = sender.send(entry) {
        // Without a timer thread nothing would ever wake the future.
        tracing::error!("timer thread unavailable, firing timer immediately");
        entry.slot.fire();
    }
}

fn start() -> Sender<TimerEntry> {
    let (transmitter, receiver) = mpsc::channel();

    let spawned = thread::Builder::new()
        .name("syncpump-timer".into())
        .spawn(move || TimerDriver::new(receiver).run());

    if let Err(err) = spawned {
        tracing::error!(%err, "failed to start timer thread");
    }

    transmitter
}

/// Owns pending timers and fires them as their deadlines pass.
struct TimerDriver {
    receiver: Receiver<TimerEntry>,
    timers: BinaryHeap<TimerEntry>,
}

impl TimerDriver {
    fn new(receiver: Receiver<TimerEntry>) -> Self {
        Self {
            receiver,
            timers: BinaryHeap::new(),
        }
    }

    fn run(mut self) {
        loop {
            self.fire_expired();

            let next = match self.timers.peek() {
                Some(timer) => self
                    .receiver
                    .recv_timeout(timer.deadline.saturating_duration_since(Instant::now())),
                None => self
                    .receiver
                    .recv()
                    .map_err(|_| RecvTimeoutError::Disconnected),
            };

            match next {
                Ok(entry) => {
                    self.timers.push(entry);
                    while let Ok(entry) = self.receiver.try_recv() {
                        self.timers.push(entry);
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => return,
            }
        }
    }

    fn fire_expired(&mut self) {
        let now = Instant::now();

        while let Some(timer) = self.timers.peek() {
            if timer.deadline > now {
                break;
            }

            if let Some(timer) = self.timers.pop() {
                timer.slot.fire();
            }
        }
    }
}
