//! Plain-text rendering of backend data for the terminal.

use std::fmt::Write as _;

use docunova_chat::{CitationStyle, SelectionStore};
use docunova_common::{Conversation, Document, Message, Role, Source, Stats, UsageStats};

/// `Sources:` block under an answer, one citation per line. Empty without sources.
pub(super) fn sources(sources: &[Source], style: CitationStyle) -> String {
    let mut out = String::new();
    if sources.is_empty() {
        return out;
    }
    out.push_str("Sources:\n");
    for (i, source) in sources.iter().enumerate() {
        let _ = writeln!(out, "  [{}] {}", i + 1, style.format(source));
    }
    out
}

pub(super) fn message(message: &Message, assistant_name: &str, style: CitationStyle) -> String {
    let speaker = match message.role {
        Role::User => "You",
        Role::Assistant => assistant_name,
    };
    let mut out = format!("{speaker}: {}\n", message.content);
    out.push_str(&sources(message.sources(), style));
    out
}

pub(super) fn history(messages: &[Message], assistant_name: &str, style: CitationStyle) -> String {
    if messages.is_empty() {
        return "(no messages yet)\n".to_string();
    }
    messages
        .iter()
        .map(|m| message(m, assistant_name, style))
        .collect::<Vec<_>>()
        .join("\n")
}

pub(super) fn documents(docs: &[Document], selection: &SelectionStore) -> String {
    if docs.is_empty() {
        return "(no documents, use /upload <path>)\n".to_string();
    }
    let mut out = String::new();
    for doc in docs {
        let mark = if selection.contains(&doc.id) { "x" } else { " " };
        let chunks = doc
            .chunk_count
            .map(|n| format!(", {n} chunks"))
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "[{mark}] {}  {} ({}, {}{chunks})",
            doc.id,
            doc.filename,
            doc.status,
            file_size(doc.file_size)
        );
    }
    let _ = writeln!(out, "{} selected", selection.len());
    out
}

pub(super) fn conversations(list: &[Conversation], active: Option<&str>) -> String {
    if list.is_empty() {
        return "(no conversations)\n".to_string();
    }
    let mut out = String::new();
    for conversation in list {
        let mark = if active == Some(conversation.id.as_str()) {
            "*"
        } else {
            " "
        };
        let _ = writeln!(
            out,
            "{mark} {}  {}  {}",
            conversation.id,
            conversation.display_title(),
            conversation.updated_at
        );
    }
    out
}

pub(super) fn stats(stats: &Stats) -> String {
    format!(
        "documents: {}\nconversations: {}\nmessages: {}\n",
        stats.documents, stats.conversations, stats.messages
    )
}

pub(super) fn usage(usage: &UsageStats) -> String {
    format!(
        "daily:   {} / {} tokens ({:.1}%), {} remaining\n\
         monthly: {} / {} tokens ({:.1}%), {} remaining\n\
         total:   {} tokens over {} requests\n\
         resets in {}\n",
        usage.daily_used,
        usage.daily_limit,
        usage.daily_percentage,
        usage.daily_remaining,
        usage.monthly_used,
        usage.monthly_limit,
        usage.monthly_percentage,
        usage.monthly_remaining,
        usage.total_used,
        usage.total_requests,
        usage.resets_in
    )
}

pub(super) fn file_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    match bytes {
        b if b >= MB => format!("{:.1} MB", b as f64 / MB as f64),
        b if b >= KB => format!("{:.1} KB", b as f64 / KB as f64),
        b => format!("{b} B"),
    }
}
