//! REPL input parsing.

use std::path::PathBuf;

use docunova_chat::ExportFormat;
use docunova_platform::Theme;

pub(super) const HELP: &str = "\
Type a question to ask it in the current conversation.

Documents
  /docs                    list documents and the current selection
  /toggle <id>             add or remove a document from the selection
  /all                     select every processed document
  /clear                   clear the selection
  /upload <path>           upload a document
  /delete-doc <id>         delete a document

Conversations
  /list [search]           list conversations
  /open <id>               switch to a conversation and show its history
  /new                     start a new conversation
  /delete <id>             delete a conversation
  /export <id> [md|txt]    print a conversation export
  /share <id>              create a public share link
  /shared <token>          show a conversation shared with you
  /history                 show the current conversation

Other
  /stats                   document, conversation and message counts
  /usage                   token quota
  /theme [light|dark|system]
  /sidebar                 toggle the selection summary in the prompt
  /help
  /quit";

/// One line of REPL input.
#[derive(Debug, Clone, PartialEq)]
pub(super) enum Command {
    Ask(String),
    Docs,
    Toggle(String),
    SelectAll,
    ClearSelection,
    Upload(PathBuf),
    DeleteDocument(String),
    List(String),
    Open(String),
    New,
    Delete(String),
    Export { id: String, format: ExportFormat },
    Share(String),
    Shared(String),
    History,
    Stats,
    Usage,
    Theme(Option<Theme>),
    Sidebar,
    Help,
    Quit,
    Empty,
}

impl Command {
    pub(super) fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(Command::Empty);
        }
        let Some(rest) = line.strip_prefix('/') else {
            return Ok(Command::Ask(line.to_string()));
        };

        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest, ""),
        };

        let command = match name {
            "docs" => Command::Docs,
            "toggle" => Command::Toggle(required(name, arg)?),
            "all" => Command::SelectAll,
            "clear" => Command::ClearSelection,
            "upload" => Command::Upload(PathBuf::from(required(name, arg)?)),
            "delete-doc" => Command::DeleteDocument(required(name, arg)?),
            "list" => Command::List(arg.to_string()),
            "open" => Command::Open(required(name, arg)?),
            "new" => Command::New,
            "delete" => Command::Delete(required(name, arg)?),
            "export" => {
                let mut parts = arg.split_whitespace();
                let id = parts
                    .next()
                    .ok_or_else(|| "usage: /export <id> [md|txt]".to_string())?;
                let format = match parts.next() {
                    Some(f) => f.parse().map_err(|e| format!("{e}"))?,
                    None => ExportFormat::default(),
                };
                Command::Export {
                    id: id.to_string(),
                    format,
                }
            }
            "share" => Command::Share(required(name, arg)?),
            "shared" => Command::Shared(required(name, arg)?),
            "history" => Command::History,
            "stats" => Command::Stats,
            "usage" => Command::Usage,
            "theme" if arg.is_empty() => Command::Theme(None),
            "theme" => Command::Theme(Some(arg.parse().map_err(|e| format!("{e}"))?)),
            "sidebar" => Command::Sidebar,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            other => return Err(format!("unknown command '/{other}', try /help")),
        };
        Ok(command)
    }
}

fn required(name: &str, arg: &str) -> Result<String, String> {
    if arg.is_empty() {
        let placeholder = match name {
            "upload" => "path",
            "shared" => "token",
            _ => "id",
        };
        Err(format!("usage: /{name} <{placeholder}>"))
    } else {
        Ok(arg.to_string())
    }
}
