//! Command dispatch: routes parsed REPL input to the session, caches and stores.

use docunova_common::DocunovaError;

use super::command::{Command, HELP};
use super::core::DocunovaApp;
use super::render;

/// Whether the REPL keeps reading after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Flow {
    Continue,
    Quit,
}

impl DocunovaApp {
    pub(super) async fn dispatch(&self, command: Command) -> Result<Flow, DocunovaError> {
        match command {
            Command::Empty => {}
            Command::Ask(question) => {
                self.ask(&question).await;
            }

            Command::Docs => {
                let docs = self.cache.documents().await?;
                print!("{}", render::documents(&docs, &self.selection));
            }
            Command::Toggle(id) => {
                let selected = self.selection.toggle(&id)?;
                println!(
                    "{id} {} ({} selected)",
                    if selected { "selected" } else { "deselected" },
                    self.selection.len()
                );
            }
            Command::SelectAll => {
                let docs = self.cache.documents().await?;
                let count = self.selection.select_all(&docs)?;
                println!("{count} processed documents selected");
            }
            Command::ClearSelection => {
                self.selection.clear()?;
                println!("selection cleared");
            }
            Command::Upload(path) => {
                let receipt = self.cache.upload_document(&path).await?;
                println!(
                    "uploaded {} as {} ({})",
                    receipt.filename, receipt.id, receipt.status
                );
            }
            Command::DeleteDocument(id) => {
                self.cache.delete_document(&id).await?;
                println!("document {id} deleted");
            }

            Command::List(search) => {
                let list = self.cache.conversations(&search).await?;
                let active = self.session.active_conversation_id();
                print!("{}", render::conversations(&list, active.as_deref()));
            }
            Command::Open(id) => {
                self.session.load_conversation(&id).await?;
                print!(
                    "{}",
                    render::history(
                        &self.session.messages(),
                        self.assistant_name(),
                        self.citation_style
                    )
                );
            }
            Command::New => {
                self.session.reset_to_new_session();
                println!("started a new conversation");
            }
            Command::Delete(id) => {
                self.cache.delete_conversation(&id).await?;
                if self.session.active_conversation_id().as_deref() == Some(id.as_str()) {
                    self.session.reset_to_new_session();
                }
                println!("conversation {id} deleted");
            }
            Command::Export { id, format } => {
                let text = self.cache.export_conversation(&id, format).await?;
                println!("{}", text.trim_end());
            }
            Command::Share(id) => {
                let link = self.cache.share_conversation(&id).await?;
                println!("{}", link.url(&self.config.api.web_origin));
            }
            Command::Shared(token) => {
                let detail = self.cache.shared_conversation(&token).await?;
                println!("{}", detail.conversation.display_title());
                print!(
                    "{}",
                    render::history(&detail.messages, self.assistant_name(), self.citation_style)
                );
            }
            Command::History => {
                print!(
                    "{}",
                    render::history(
                        &self.session.messages(),
                        self.assistant_name(),
                        self.citation_style
                    )
                );
            }

            Command::Stats => {
                let stats = self.backend.stats().await?;
                print!("{}", render::stats(&stats));
            }
            Command::Usage => {
                let usage = self.backend.usage().await?;
                print!("{}", render::usage(&usage));
            }
            Command::Theme(None) => println!("theme: {}", self.preferences.theme()),
            Command::Theme(Some(theme)) => {
                self.preferences.set_theme(theme)?;
                println!("theme set to {theme}");
            }
            Command::Sidebar => {
                let collapsed = !self.preferences.sidebar_collapsed();
                self.preferences.set_sidebar_collapsed(collapsed)?;
            }
            Command::Help => println!("{HELP}"),
            Command::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }
}
