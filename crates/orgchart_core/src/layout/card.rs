//! Card content for a member: compact on the chart, detailed in the side panel.

use crate::model::member::{Member, MemberId};
use once_cell::sync::Lazy;
use regex::Regex;

static URL_HOST: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*://(?:[^@/?#]*@)?([^/?#:]+)").ok()
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Avatar {
    Photo(String),
    Initials(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardVariant {
    Compact,
    Detail,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkBadge {
    pub url: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub member_id: MemberId,
    pub variant: CardVariant,
    pub name: String,
    /// Omitted when the member has no title.
    pub title: Option<String>,
    pub avatar: Avatar,
    /// Detail cards only.
    pub notes: Option<String>,
    /// Detail cards only; at most the configured number of badges.
    pub links: Vec<LinkBadge>,
    /// Links not shown as badges.
    pub hidden_links: usize,
}

impl Card {
    /// Chart card: avatar, name and title.
    pub fn compact(member: &Member) -> Self {
        Self {
            member_id: member.id.clone(),
            variant: CardVariant::Compact,
            name: member.name.clone(),
            title: non_blank(&member.title),
            avatar: avatar_for(member),
            notes: None,
            links: Vec::new(),
            hidden_links: 0,
        }
    }

    /// Panel card: compact content plus notes and up to `max_links` link badges.
    pub fn detail(member: &Member, max_links: usize) -> Self {
        let links = member
            .links
            .iter()
            .filter(|link| !link.trim().is_empty())
            .collect::<Vec<_>>();
        Self {
            variant: CardVariant::Detail,
            notes: non_blank(&member.notes),
            hidden_links: links.len().saturating_sub(max_links),
            links: links
                .into_iter()
                .take(max_links)
                .map(|url| LinkBadge {
                    url: url.clone(),
                    label: link_label(url),
                })
                .collect(),
            ..Self::compact(member)
        }
    }

    /// `"+N more"` when some links are hidden.
    pub fn more_links_label(&self) -> Option<String> {
        (self.hidden_links > 0).then(|| format!("+{} more", self.hidden_links))
    }
}

/// Host of `url` without a leading `www.`, or the raw text when it has no host.
pub fn link_label(url: &str) -> String {
    let trimmed = url.trim();
    let host = URL_HOST
        .as_ref()
        .and_then(|re| re.captures(trimmed))
        .and_then(|caps| caps.get(1))
        .map(|host| host.as_str());
    match host {
        Some(host) => host.strip_prefix("www.").unwrap_or(host).to_string(),
        None => trimmed.to_string(),
    }
}

fn avatar_for(member: &Member) -> Avatar {
    match member.photo.as_deref().map(str::trim) {
        Some(photo) if !photo.is_empty() => Avatar::Photo(photo.to_string()),
        _ => Avatar::Initials(member.initials()),
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
