//! Sibling and root ordering.

use super::forest::{build_forest, HierarchyNode};
use crate::model::member::Member;
use std::cmp::Ordering;

/// Seniority bucket derived from a free-text title. Lower sorts first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TitleRank {
    SeniorEditor,
    Editor,
    JuniorEditor,
    AssistantEditor,
    AssociateEditor,
    PgdEditor,
    Other,
    Untitled,
}

impl TitleRank {
    /// Case-insensitive substring classification; first matching bucket wins.
    pub fn of(title: &str) -> Self {
        let title = title.trim().to_lowercase();
        if title.is_empty() {
            Self::Untitled
        } else if title.contains("senior editor") {
            Self::SeniorEditor
        } else if title.contains("junior editor") {
            Self::JuniorEditor
        } else if title == "ae" || title.contains("assistant editor") {
            Self::AssistantEditor
        } else if title.contains("associate editor") {
            Self::AssociateEditor
        } else if title.contains("pgd editor") {
            Self::PgdEditor
        } else if title.contains("editor") {
            Self::Editor
        } else {
            Self::Other
        }
    }
}

fn compare_siblings(a: &Member, b: &Member) -> Ordering {
    TitleRank::of(&a.title)
        .cmp(&TitleRank::of(&b.title))
        .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
}

/// Sorts every child list below `nodes` by rank, then case-insensitive name.
///
/// The sort is stable, so equal keys keep store order.
pub fn sort_siblings(nodes: &mut [HierarchyNode<'_>]) {
    for node in nodes.iter_mut() {
        node.children
            .sort_by(|a, b| compare_siblings(a.member, b.member));
        sort_siblings(&mut node.children);
    }
}

/// Orders roots by `pairedWith` (or own id), grouping partners with their primary.
pub fn sort_roots(roots: &mut [HierarchyNode<'_>]) {
    fn key<'m>(member: &'m Member) -> &'m str {
        member.paired_with.as_deref().unwrap_or(&member.id)
    }
    roots.sort_by(|a, b| key(a.member).cmp(key(b.member)));
}

/// Forest with roots and all sibling lists ordered for rendering.
pub fn build_sorted_forest(members: &[Member]) -> Vec<HierarchyNode<'_>> {
    let mut forest = build_forest(members);
    sort_roots(&mut forest);
    sort_siblings(&mut forest);
    forest
}
