//! Alarm sound device.

/// Plays the timer alarm.
pub trait AlarmDevice: Send + Sync {
    /// Start ringing. Returns `false` when no alarm sound is available, in
    /// which case callers fall back to speech.
    fn play(&self) -> bool;

    fn stop(&self);

    fn is_playing(&self) -> bool;
}
