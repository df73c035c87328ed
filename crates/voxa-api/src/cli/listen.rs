//! `voxa listen`: drive the engine from stdin, one utterance per line.
//!
//! Lines are fed through the same speech-input path a microphone would use,
//! so follow-up questions and microphone reopening behave as in a live
//! session. Ctrl+C stops listening.

use std::io::Write;

use tokio_util::sync::CancellationToken;
use tracing::warn;

use voxa_infra::speech::StdinSpeechInput;

use crate::state::AppState;

use super::render::{ResponseView, print_response};

pub async fn run_listen(state: &AppState, json: bool) -> anyhow::Result<()> {
    let input = StdinSpeechInput::stdin();

    let shutdown = CancellationToken::new();
    let ctrl_c = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    let mut stdout = std::io::stdout();
    state
        .engine
        .run(&input, shutdown, |response| {
            let written = if json {
                serde_json::to_string(&ResponseView::from(response))
                    .map_err(std::io::Error::from)
                    .and_then(|line| writeln!(stdout, "{line}"))
            } else {
                print_response(&mut stdout, response)
            };
            if let Err(e) = written.and_then(|()| stdout.flush()) {
                warn!(error = %e, "failed to write response");
            }
        })
        .await;

    Ok(())
}
