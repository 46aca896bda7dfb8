//! Citation rendering for answer sources.

use std::fmt;
use std::str::FromStr;

use docunova_common::Source;

/// How a [`Source`] is rendered under an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CitationStyle {
    /// `file.pdf (p. 4)`, or just `file.pdf` without a page.
    #[default]
    Default,
    /// `file.pdf (p. 4)`, or `file.pdf (p. n.d.)`.
    Apa,
    /// `file.pdf, p. 4`, or `file.pdf, p. n.d.`.
    Mla,
}

impl CitationStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            CitationStyle::Default => "default",
            CitationStyle::Apa => "apa",
            CitationStyle::Mla => "mla",
        }
    }

    pub fn format(self, source: &Source) -> String {
        // Page 0 is what the backend sends for "unknown".
        let page = source.page.filter(|p| *p > 0);
        let page_text = page.map_or_else(|| "n.d.".to_string(), |p| p.to_string());
        match self {
            CitationStyle::Apa => format!("{} (p. {page_text})", source.filename),
            CitationStyle::Mla => format!("{}, p. {page_text}", source.filename),
            CitationStyle::Default => match page {
                Some(p) => format!("{} (p. {p})", source.filename),
                None => source.filename.clone(),
            },
        }
    }
}

impl fmt::Display for CitationStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CitationStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default" => Ok(CitationStyle::Default),
            "apa" => Ok(CitationStyle::Apa),
            "mla" => Ok(CitationStyle::Mla),
            other => Err(format!("unknown citation style '{other}'")),
        }
    }
}
