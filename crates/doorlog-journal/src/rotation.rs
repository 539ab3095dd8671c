//! Daily rotation scheduling.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::{Days, Local, NaiveTime};
use tracing::{info, warn};

use crate::writer::JournalWriter;

/// Delay between retries after a failed rotation.
const RETRY_DELAY: Duration = Duration::from_secs(30);

/// Handle to the background rotation thread.
///
/// Dropping the handle detaches the thread, which then runs for the process
/// lifetime like the original daemon loop. Call [`shutdown`](Self::shutdown)
/// for an orderly stop at process exit.
pub struct RotationHandle {
    stop: Sender<()>,
    thread: Option<JoinHandle<()>>,
}

impl RotationHandle {
    /// Signals the rotation thread to stop and waits for it to exit.
    pub fn shutdown(mut self) {
        let _ = self.stop.send(());
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

/// Spawns the background task that keeps the writer on today's file.
///
/// The thread sleeps until the next local midnight and then calls
/// [`JournalWriter::update_output`]. A failed rotation is logged and retried
/// every 30 seconds until it succeeds; it is never fatal to the process.
pub fn spawn_rotation(writer: Arc<JournalWriter>) -> RotationHandle {
    let (stop, stop_rx) = mpsc::channel::<()>();
    let thread = thread::spawn(move || loop {
        let today = Local::now().date_naive();
        match stop_rx.recv_timeout(until_next_midnight()) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => return,
            Err(RecvTimeoutError::Timeout) => {}
        }
        if Local::now().date_naive() == today {
            // Woke before the calendar date changed (clock adjustment or a
            // DST shift); just sleep again.
            continue;
        }
        loop {
            match writer.update_output() {
                Ok(()) => {
                    info!(path = %writer.current_path().display(), "rotated journal output");
                    break;
                }
                Err(error) => {
                    warn!(%error, "failed to update journal output");
                    match stop_rx.recv_timeout(RETRY_DELAY) {
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => return,
                        Err(RecvTimeoutError::Timeout) => {}
                    }
                }
            }
        }
    });
    RotationHandle {
        stop,
        thread: Some(thread),
    }
}

/// Time remaining until the next local midnight.
fn until_next_midnight() -> Duration {
    let now = Local::now();
    let midnight = (now.date_naive() + Days::new(1)).and_time(NaiveTime::MIN);
    let wait = match midnight.and_local_timezone(Local).earliest() {
        Some(next) => next - now,
        // Midnight falls into a DST gap; the naive difference is close
        // enough, the date check after waking covers the remainder.
        None => midnight - now.naive_local(),
    };
    wait.to_std().unwrap_or(Duration::from_secs(1))
}
