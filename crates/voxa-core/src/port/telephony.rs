//! Address book and phone dialer.

use voxa_types::contact::Contact;
use voxa_types::error::UpstreamError;

/// Source of contacts for the telephone skill.
pub trait ContactBook: Send + Sync {
    fn contacts(&self) -> Vec<Contact>;
}

/// Places phone calls.
pub trait Dialer: Send + Sync {
    fn call(&self, number: &str) -> Result<(), UpstreamError>;
}
