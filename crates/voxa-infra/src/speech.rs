//! Console speech devices.
//!
//! [`ConsoleSpeech`] "speaks" by writing lines to a writer (stdout by
//! default). [`LineSpeechInput`] turns each input line into a final
//! utterance, which lets the engine be driven from a terminal or a pipe.

use std::io::Write;
use std::sync::{Arc, Mutex};

use futures_util::StreamExt;
use futures_util::stream::BoxStream;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};

use voxa_core::port::{SpeechInput, SpeechOutput};
use voxa_types::speech::SpeechEvent;

/// Writes every spoken phrase as one line.
pub struct ConsoleSpeech {
    out: Mutex<Box<dyn Write + Send>>,
    prefix: String,
}

impl ConsoleSpeech {
    pub fn new(out: Box<dyn Write + Send>, prefix: impl Into<String>) -> Self {
        Self {
            out: Mutex::new(out),
            prefix: prefix.into(),
        }
    }

    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::stdout()), "voxa: ")
    }

    /// Discards everything, for machine-readable output modes.
    pub fn silent() -> Self {
        Self::new(Box::new(std::io::sink()), "")
    }
}

impl SpeechOutput for ConsoleSpeech {
    fn speak(&self, text: &str) {
        let mut out = self.out.lock().expect("speech output lock poisoned");
        if let Err(e) = writeln!(out, "{}{text}", self.prefix).and_then(|()| out.flush()) {
            tracing::warn!(error = %e, "failed to write speech output");
        }
    }
}

impl std::fmt::Debug for ConsoleSpeech {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleSpeech")
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

/// Reads utterances line by line.
///
/// Every `listen` call opens a session over the same underlying reader, so
/// a session abandoned by the engine (to reopen the microphone) loses no
/// input. Blank lines are reported as silence; end of input ends the
/// session without events.
pub struct LineSpeechInput<R> {
    lines: Arc<tokio::sync::Mutex<Lines<R>>>,
}

/// Line input over the process's stdin.
pub type StdinSpeechInput = LineSpeechInput<BufReader<Stdin>>;

impl<R> LineSpeechInput<R>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    pub fn new(reader: R) -> Self {
        Self {
            lines: Arc::new(tokio::sync::Mutex::new(reader.lines())),
        }
    }
}

impl StdinSpeechInput {
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }
}

impl<R> SpeechInput for LineSpeechInput<R>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    fn listen(&self) -> BoxStream<'static, SpeechEvent> {
        let lines = Arc::clone(&self.lines);
        async_stream::stream! {
            loop {
                let next = lines.lock().await.next_line().await;
                match next {
                    Ok(Some(line)) => {
                        let text = line.trim();
                        if text.is_empty() {
                            yield SpeechEvent::Silence;
                        } else {
                            yield SpeechEvent::final_text(text);
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        yield SpeechEvent::Error { message: e.to_string() };
                        break;
                    }
                }
            }
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_console_speech_writes_lines() {
        let buf = SharedBuf::default();
        let speech = ConsoleSpeech::new(Box::new(buf.clone()), "> ");
        speech.speak("Таймер на пять минут запущен");
        speech.speak("пять");

        let written = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
        assert_eq!(written, "> Таймер на пять минут запущен\n> пять\n");
    }

    #[tokio::test]
    async fn test_line_input_yields_final_events() {
        let input = LineSpeechInput::new("  который час \n\nда\n".as_bytes());
        let events: Vec<SpeechEvent> = input.listen().collect().await;
        assert_eq!(
            events,
            vec![
                SpeechEvent::final_text("который час"),
                SpeechEvent::Silence,
                SpeechEvent::final_text("да"),
            ]
        );
    }

    #[tokio::test]
    async fn test_sessions_share_the_reader() {
        let input = LineSpeechInput::new(&b"first\nsecond\n"[..]);

        let mut session = input.listen();
        assert_eq!(session.next().await, Some(SpeechEvent::final_text("first")));
        drop(session);

        let rest: Vec<SpeechEvent> = input.listen().collect().await;
        assert_eq!(rest, vec![SpeechEvent::final_text("second")]);

        assert!(input.listen().next().await.is_none());
    }
}
