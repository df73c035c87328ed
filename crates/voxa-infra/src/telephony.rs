//! Address book and dialer adapters.
//!
//! There is no telephony hardware on a desktop, so [`LoggingDialer`]
//! records and logs calls instead of placing them.

use std::sync::Mutex;

use tracing::info;

use voxa_core::port::{ContactBook, Dialer};
use voxa_types::contact::Contact;
use voxa_types::error::UpstreamError;

/// Contacts listed in `config.toml`.
#[derive(Debug, Clone, Default)]
pub struct ConfigContactBook {
    contacts: Vec<Contact>,
}

impl ConfigContactBook {
    pub fn new(contacts: Vec<Contact>) -> Self {
        Self { contacts }
    }
}

impl ContactBook for ConfigContactBook {
    fn contacts(&self) -> Vec<Contact> {
        self.contacts.clone()
    }
}

/// Logs each call and keeps the dialled numbers.
#[derive(Debug, Default)]
pub struct LoggingDialer {
    dialled: Mutex<Vec<String>>,
}

impl LoggingDialer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dialled(&self) -> Vec<String> {
        self.dialled.lock().expect("dialer lock poisoned").clone()
    }
}

impl Dialer for LoggingDialer {
    fn call(&self, number: &str) -> Result<(), UpstreamError> {
        let digits = number.chars().filter(char::is_ascii_digit).count();
        if digits == 0 {
            return Err(UpstreamError::Request(format!("not a phone number: '{number}'")));
        }
        info!(number, "placing call");
        self.dialled
            .lock()
            .expect("dialer lock poisoned")
            .push(number.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contact_book_returns_configured_contacts() {
        let book = ConfigContactBook::new(vec![
            Contact::new("Мама", vec!["+7 900 111-22-33".to_string()]),
            Contact::new("Папа", Vec::new()),
        ]);
        let contacts = book.contacts();
        assert_eq!(contacts.len(), 2);
        assert_eq!(contacts[0].name, "Мама");
    }

    #[test]
    fn test_dialer_records_calls() {
        let dialer = LoggingDialer::new();
        dialer.call("+7 900 111-22-33").unwrap();
        assert_eq!(dialer.dialled(), vec!["+7 900 111-22-33".to_string()]);
    }

    #[test]
    fn test_dialer_rejects_numbers_without_digits() {
        let dialer = LoggingDialer::new();
        let err = dialer.call("мама").unwrap_err();
        assert!(matches!(err, UpstreamError::Request(_)));
        assert!(dialer.dialled().is_empty());
    }
}
