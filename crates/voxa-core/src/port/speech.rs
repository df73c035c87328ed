//! Speech devices.

use futures_util::stream::BoxStream;

use voxa_types::speech::SpeechEvent;

/// Text-to-speech sink. Fire-and-forget: implementations queue or print.
pub trait SpeechOutput: Send + Sync {
    fn speak(&self, text: &str);
}

/// Speech-to-text source.
///
/// Each call to `listen` opens one listening session; the stream ends when
/// the session does.
pub trait SpeechInput: Send + Sync {
    fn listen(&self) -> BoxStream<'static, SpeechEvent>;
}
