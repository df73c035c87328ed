//! Terminal alarm: rings the terminal bell until stopped.

use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use voxa_core::port::AlarmDevice;

/// Rings by writing a bell character on an interval.
///
/// Ringing runs as a background task on the current tokio runtime; outside
/// a runtime `play` reports the alarm as unavailable.
pub struct TerminalAlarm {
    out: Arc<Mutex<Box<dyn Write + Send>>>,
    interval: Duration,
    ringing: Mutex<Option<CancellationToken>>,
}

impl TerminalAlarm {
    pub fn new(out: Box<dyn Write + Send>, interval: Duration) -> Self {
        Self {
            out: Arc::new(Mutex::new(out)),
            interval,
            ringing: Mutex::new(None),
        }
    }

    pub fn stderr() -> Self {
        Self::new(Box::new(std::io::stderr()), Duration::from_secs(1))
    }
}

impl AlarmDevice for TerminalAlarm {
    fn play(&self) -> bool {
        let mut ringing = self.ringing.lock().expect("alarm lock poisoned");
        if ringing.is_some() {
            return true;
        }
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            return false;
        };

        let token = CancellationToken::new();
        let child = token.clone();
        let out = Arc::clone(&self.out);
        let interval = self.interval;
        handle.spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    biased;
                    _ = child.cancelled() => break,
                    _ = ticker.tick() => {
                        let mut out = out.lock().expect("alarm output lock poisoned");
                        let _ = out.write_all(b"\x07").and_then(|()| out.flush());
                    }
                }
            }
        });

        debug!("alarm started");
        *ringing = Some(token);
        true
    }

    fn stop(&self) {
        if let Some(token) = self.ringing.lock().expect("alarm lock poisoned").take() {
            token.cancel();
            debug!("alarm stopped");
        }
    }

    fn is_playing(&self) -> bool {
        self.ringing.lock().expect("alarm lock poisoned").is_some()
    }
}

impl Drop for TerminalAlarm {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Default)]
    struct Bells(Arc<Mutex<Vec<u8>>>);

    impl Write for Bells {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl Bells {
        fn count(&self) -> usize {
            self.0.lock().unwrap().len()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_rings_until_stopped() {
        let bells = Bells::default();
        let alarm = TerminalAlarm::new(Box::new(bells.clone()), Duration::from_secs(1));

        assert!(alarm.play());
        assert!(alarm.is_playing());
        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert_eq!(bells.count(), 3);

        alarm.stop();
        assert!(!alarm.is_playing());
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(bells.count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_play_while_ringing_is_idempotent() {
        let bells = Bells::default();
        let alarm = TerminalAlarm::new(Box::new(bells.clone()), Duration::from_secs(1));
        assert!(alarm.play());
        assert!(alarm.play());
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(bells.count(), 1);
    }

    #[test]
    fn test_unavailable_outside_runtime() {
        let alarm = TerminalAlarm::new(Box::new(std::io::sink()), Duration::from_secs(1));
        assert!(!alarm.play());
        assert!(!alarm.is_playing());
    }
}
