//! Ranked name/title matching and match highlighting.

use crate::model::member::Member;
use regex::{Regex, RegexBuilder};

#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome<'a> {
    /// Blank query; the results panel stays closed.
    Suppressed,
    NoMatches,
    Matches(Vec<&'a Member>),
}

impl<'a> SearchOutcome<'a> {
    pub fn matches(&self) -> &[&'a Member] {
        match self {
            Self::Matches(members) => members,
            Self::Suppressed | Self::NoMatches => &[],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum MatchTier {
    ExactName,
    NamePrefix,
    Contains,
}

/// Case-insensitive substring search over name and title.
///
/// Ranked exact name first, then name prefix, then any other match; each
/// tier ordered by case-insensitive name.
pub fn search<'a>(query: &str, members: &'a [Member]) -> SearchOutcome<'a> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return SearchOutcome::Suppressed;
    }

    let mut ranked = members
        .iter()
        .filter_map(|member| {
            let name = member.name.to_lowercase();
            let tier = if name == needle {
                MatchTier::ExactName
            } else if name.starts_with(&needle) {
                MatchTier::NamePrefix
            } else if name.contains(&needle) || member.title.to_lowercase().contains(&needle) {
                MatchTier::Contains
            } else {
                return None;
            };
            Some((tier, name, member))
        })
        .collect::<Vec<_>>();

    if ranked.is_empty() {
        return SearchOutcome::NoMatches;
    }
    ranked.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
    SearchOutcome::Matches(ranked.into_iter().map(|(_, _, member)| member).collect())
}

/// One piece of highlighted text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightSpan<'t> {
    pub text: &'t str,
    pub matched: bool,
}

/// Splits `text` into matched and unmatched runs of `query`, matched literally
/// and case-insensitively. A blank query yields one unmatched span.
pub fn highlight_spans<'t>(text: &'t str, query: &str) -> Vec<HighlightSpan<'t>> {
    let Some(pattern) = literal_pattern(query) else {
        return whole(text);
    };

    let mut spans = Vec::new();
    let mut last = 0;
    for found in pattern.find_iter(text) {
        if found.start() > last {
            spans.push(HighlightSpan {
                text: &text[last..found.start()],
                matched: false,
            });
        }
        spans.push(HighlightSpan {
            text: found.as_str(),
            matched: true,
        });
        last = found.end();
    }
    if last < text.len() || spans.is_empty() {
        spans.push(HighlightSpan {
            text: &text[last..],
            matched: false,
        });
    }
    spans
}

/// HTML-escaped `text` with every match of `query` wrapped in `<mark>`.
pub fn highlight(text: &str, query: &str) -> String {
    let mut out = String::with_capacity(text.len() + 16);
    for span in highlight_spans(text, query) {
        if span.matched {
            out.push_str("<mark>");
            push_escaped(&mut out, span.text);
            out.push_str("</mark>");
        } else {
            push_escaped(&mut out, span.text);
        }
    }
    out
}

fn literal_pattern(query: &str) -> Option<Regex> {
    let query = query.trim();
    if query.is_empty() {
        return None;
    }
    RegexBuilder::new(&regex::escape(query))
        .case_insensitive(true)
        .build()
        .ok()
}

fn whole(text: &str) -> Vec<HighlightSpan<'_>> {
    vec![HighlightSpan {
        text,
        matched: false,
    }]
}

fn push_escaped(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{highlight, highlight_spans, search, SearchOutcome};
    use crate::model::member::Member;

    fn names(outcome: &SearchOutcome<'_>) -> Vec<String> {
        outcome
            .matches()
            .iter()
            .map(|member| member.name.clone())
            .collect()
    }

    #[test]
    fn blank_query_is_suppressed() {
        let members = vec![Member::new("1", "Ann", "")];
        assert_eq!(search("   ", &members), SearchOutcome::Suppressed);
    }

    #[test]
    fn unmatched_query_reports_no_matches() {
        let members = vec![Member::new("1", "Ann", "Editor")];
        assert_eq!(
            search("zzz-no-such-string", &members),
            SearchOutcome::NoMatches
        );
    }

    #[test]
    fn prefix_matches_sort_alphabetically() {
        let members = vec![
            Member::new("1", "John", ""),
            Member::new("2", "Joe", ""),
            Member::new("3", "Josh", ""),
        ];
        assert_eq!(names(&search("jo", &members)), vec!["Joe", "John", "Josh"]);
    }

    #[test]
    fn exact_then_prefix_then_contains() {
        let members = vec![
            Member::new("1", "Marta Ed", ""),
            Member::new("2", "Ed", ""),
            Member::new("3", "Zoe", "Senior Editor"),
            Member::new("4", "Edna", ""),
        ];
        assert_eq!(
            names(&search(" ED ", &members)),
            vec!["Ed", "Edna", "Marta Ed", "Zoe"]
        );
    }

    #[test]
    fn highlight_escapes_html_and_matches_literally() {
        assert_eq!(
            highlight("<b>A.B a.b</b>", "a.b"),
            "&lt;b&gt;<mark>A.B</mark> <mark>a.b</mark>&lt;/b&gt;"
        );
        assert_eq!(highlight("Tom & Jerry", ""), "Tom &amp; Jerry");
    }

    #[test]
    fn spans_cover_the_whole_text() {
        let spans = highlight_spans("banana", "an");
        let joined = spans.iter().map(|span| span.text).collect::<String>();
        assert_eq!(joined, "banana");
        assert_eq!(spans.iter().filter(|span| span.matched).count(), 2);
    }
}
