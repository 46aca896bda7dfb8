//! Submitting a question and echoing the answer while it streams.

use std::io::Write;

use docunova_chat::{RejectReason, SubmitOutcome};
use docunova_common::{Event, Role};
use tokio::sync::broadcast::error::RecvError;

use super::core::DocunovaApp;
use super::render;

/// Writes assistant deltas for one message as they arrive.
///
/// If the subscriber lags and deltas are lost, printing stops and
/// [`DeltaPrinter::finish`] writes the missing tail from the final text.
pub(super) struct DeltaPrinter<W: Write> {
    out: W,
    index: Option<usize>,
    printed: String,
    lagged: bool,
}

impl<W: Write> DeltaPrinter<W> {
    pub(super) fn new(out: W) -> Self {
        Self {
            out,
            index: None,
            printed: String::new(),
            lagged: false,
        }
    }

    pub(super) fn handle(&mut self, event: Result<Event, RecvError>) {
        match event {
            Ok(Event::MessageAppended {
                index,
                role: Role::Assistant,
            }) if self.index.is_none() => {
                self.index = Some(index);
            }
            Ok(Event::AssistantDelta { index, delta }) => {
                if *self.index.get_or_insert(index) != index || self.lagged {
                    return;
                }
                self.printed.push_str(&delta);
                let _ = self.out.write_all(delta.as_bytes());
                let _ = self.out.flush();
            }
            Ok(_) => {}
            Err(RecvError::Lagged(missed)) => {
                tracing::debug!(missed, "answer printer lagged");
                self.lagged = true;
            }
            Err(RecvError::Closed) => {}
        }
    }

    pub(super) fn has_output(&self) -> bool {
        !self.printed.is_empty()
    }

    /// Complete the echoed answer given its final text, then end the line.
    pub(super) fn finish(mut self, final_text: Option<&str>) -> W {
        if let Some(rest) = final_text.and_then(|t| t.strip_prefix(self.printed.as_str())) {
            let _ = self.out.write_all(rest.as_bytes());
        }
        if self.has_output() || final_text.is_some_and(|t| !t.is_empty()) {
            let _ = self.out.write_all(b"\n");
        }
        let _ = self.out.flush();
        self.out
    }

    fn index(&self) -> Option<usize> {
        self.index
    }
}

impl DocunovaApp {
    /// Ask `question`, streaming the answer to stdout. Returns whether an
    /// answer completed.
    pub async fn ask(&self, question: &str) -> bool {
        let mut events = self.session.subscribe();
        let mut submit = Box::pin(self.session.submit_query(question));
        let mut printer = DeltaPrinter::new(std::io::stdout());

        let outcome = loop {
            tokio::select! {
                outcome = &mut submit => break Some(outcome),
                _ = tokio::signal::ctrl_c() => break None,
                event = events.recv() => printer.handle(event),
            }
        };
        // Dropping the submission cancels the stream and returns the session to idle.
        drop(submit);
        while let Ok(event) = events.try_recv() {
            printer.handle(Ok(event));
        }

        let messages = self.session.messages();
        let answer = printer.index().and_then(|i| messages.get(i));

        match outcome {
            Some(SubmitOutcome::Completed { .. }) => {
                printer.finish(answer.map(|m| m.content.as_str()));
                if let Some(answer) = answer {
                    print!("{}", render::sources(answer.sources(), self.citation_style));
                }
                true
            }
            Some(SubmitOutcome::Failed(e)) => {
                printer.finish(None);
                if let Some(last) = messages.last().filter(|m| m.role == Role::Assistant) {
                    println!("{}", last.content);
                }
                eprintln!("error: {e}");
                false
            }
            Some(SubmitOutcome::Rejected(RejectReason::EmptyQuestion)) => false,
            Some(SubmitOutcome::Rejected(RejectReason::Busy)) => {
                eprintln!("still answering the previous question");
                false
            }
            Some(SubmitOutcome::Cancelled) => {
                printer.finish(None);
                eprintln!("[cancelled]");
                false
            }
            None => {
                printer.finish(None);
                eprintln!("[interrupted]");
                false
            }
        }
    }
}
