//! The interactive read-eval-print loop.

use std::io::Write;

use docunova_common::DocunovaError;
use tokio::io::{AsyncBufReadExt, BufReader};

use super::command::Command;
use super::core::DocunovaApp;
use super::dispatch::Flow;

impl DocunovaApp {
    /// Read commands from stdin until `/quit`, end of input, or Ctrl-C.
    pub async fn run(&self) -> Result<(), DocunovaError> {
        println!(
            "{} is ready. Ask a question, or type /help.",
            self.assistant_name()
        );
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            print!("{}", self.prompt());
            let _ = std::io::stdout().flush();

            let line = tokio::select! {
                line = lines.next_line() => line?,
                _ = tokio::signal::ctrl_c() => None,
            };
            let Some(line) = line else {
                println!();
                break;
            };

            let command = match Command::parse(&line) {
                Ok(command) => command,
                Err(e) => {
                    eprintln!("{e}");
                    continue;
                }
            };
            match self.dispatch(command).await {
                Ok(Flow::Continue) => {}
                Ok(Flow::Quit) => break,
                Err(e) => {
                    tracing::debug!("command failed: {e}");
                    eprintln!("error: {e}");
                }
            }
        }
        Ok(())
    }
}
