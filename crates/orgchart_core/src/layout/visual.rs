//! Visual tree: the sorted forest grouped into renderable items.
//!
//! # Invariants
//! - Every forest node appears in exactly one item.
//! - Pair and trio grouping only happens on levels 0 and 1; deeper levels
//!   render every member as a single item.
//! - Level 0 and level 1 members start their own team; deeper members
//!   inherit their ancestor's team.

use super::card::Card;
use crate::hierarchy::forest::HierarchyNode;
use crate::model::member::{MemberId, PairPosition};
use std::collections::{HashMap, HashSet};

/// Deepest level (0-based) where partners are grouped with their primary.
const MAX_GROUPED_DEPTH: usize = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisualNode {
    pub card: Card,
    /// Id of the level 0 or level 1 member heading this node's team.
    pub team_id: MemberId,
    pub children: Option<VisualLevel>,
}

impl VisualNode {
    pub fn id(&self) -> &str {
        &self.card.member_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisualItem {
    Single(VisualNode),
    Pair {
        partner: VisualNode,
        primary: VisualNode,
    },
    Trio {
        left: VisualNode,
        primary: VisualNode,
        right: VisualNode,
    },
}

impl VisualItem {
    /// Nodes in left-to-right visual order.
    pub fn nodes(&self) -> Vec<&VisualNode> {
        match self {
            Self::Single(node) => vec![node],
            Self::Pair { partner, primary } => vec![partner, primary],
            Self::Trio {
                left,
                primary,
                right,
            } => vec![left, primary, right],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisualLevel {
    pub depth: usize,
    pub items: Vec<VisualItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VisualTree {
    pub top: Option<VisualLevel>,
}

impl VisualTree {
    pub fn is_empty(&self) -> bool {
        self.top.as_ref().map_or(true, |level| level.items.is_empty())
    }

    /// All nodes in pre-order, visual order within each level.
    pub fn nodes(&self) -> Vec<&VisualNode> {
        fn collect<'t>(level: &'t VisualLevel, out: &mut Vec<&'t VisualNode>) {
            for item in &level.items {
                for node in item.nodes() {
                    out.push(node);
                    if let Some(children) = &node.children {
                        collect(children, out);
                    }
                }
            }
        }
        let mut out = Vec::new();
        if let Some(top) = &self.top {
            collect(top, &mut out);
        }
        out
    }

    pub fn node_count(&self) -> usize {
        self.nodes().len()
    }

    pub fn find(&self, id: &str) -> Option<&VisualNode> {
        self.nodes().into_iter().find(|node| node.id() == id)
    }
}

/// Renders a sorted forest into visual items.
pub fn render_forest(forest: &[HierarchyNode<'_>]) -> VisualTree {
    if forest.is_empty() {
        return VisualTree::default();
    }
    VisualTree {
        top: Some(render_level(forest, 0, None)),
    }
}

fn render_level(nodes: &[HierarchyNode<'_>], depth: usize, team: Option<&str>) -> VisualLevel {
    if depth > MAX_GROUPED_DEPTH {
        let team = team.unwrap_or_default();
        return VisualLevel {
            depth,
            items: nodes
                .iter()
                .map(|node| VisualItem::Single(render_node(node, depth, team)))
                .collect(),
        };
    }

    let partners = grouped_partners(nodes);
    let mut items = Vec::with_capacity(nodes.len());
    for node in nodes {
        if partners.is_partner(node) {
            continue;
        }
        let team = node.id();
        let primary = render_node(node, depth, team);

        let mut left = None;
        let mut right = None;
        let mut extra = Vec::new();
        for &partner in partners.of(node.id()) {
            let rendered = render_node(partner, depth, team);
            match partner.member.position {
                Some(PairPosition::Right) if right.is_none() => right = Some(rendered),
                Some(PairPosition::Right) => extra.push(rendered),
                _ if left.is_none() => left = Some(rendered),
                _ => extra.push(rendered),
            }
        }

        let item = match (left, right) {
            (Some(left), Some(right)) => VisualItem::Trio {
                left,
                primary,
                right,
            },
            (Some(partner), None) | (None, Some(partner)) => VisualItem::Pair { partner, primary },
            (None, None) => VisualItem::Single(primary),
        };
        items.push(item);
        items.extend(extra.into_iter().map(VisualItem::Single));
    }
    VisualLevel { depth, items }
}

fn render_node(node: &HierarchyNode<'_>, depth: usize, team: &str) -> VisualNode {
    VisualNode {
        card: Card::compact(node.member),
        team_id: team.to_string(),
        children: (!node.children.is_empty())
            .then(|| render_level(&node.children, depth + 1, Some(team))),
    }
}

/// Partners on one level keyed by the sibling they attach to.
struct GroupedPartners<'n, 'a> {
    by_primary: HashMap<&'a str, Vec<&'n HierarchyNode<'a>>>,
    partner_ids: HashSet<&'a str>,
}

impl<'n, 'a> GroupedPartners<'n, 'a> {
    fn is_partner(&self, node: &HierarchyNode<'a>) -> bool {
        self.partner_ids.contains(node.id())
    }

    fn of(&self, primary: &str) -> &[&'n HierarchyNode<'a>] {
        self.by_primary
            .get(primary)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// A node attaches to a sibling primary when its `pairedWith` names that
/// sibling and the sibling does not itself pair with another sibling.
fn grouped_partners<'n, 'a>(nodes: &'n [HierarchyNode<'a>]) -> GroupedPartners<'n, 'a> {
    let sibling_ids = nodes.iter().map(|node| node.id()).collect::<HashSet<_>>();
    let pairs_with_sibling = |node: &HierarchyNode<'a>| {
        node.member
            .paired_with
            .as_deref()
            .filter(|target| *target != node.id() && sibling_ids.contains(target))
    };
    let anchors = nodes
        .iter()
        .filter(|&node| pairs_with_sibling(node).is_none())
        .map(|node| node.id())
        .collect::<HashSet<_>>();

    let mut grouped = GroupedPartners {
        by_primary: HashMap::new(),
        partner_ids: HashSet::new(),
    };
    for node in nodes {
        let Some(target) = pairs_with_sibling(node) else {
            continue;
        };
        if anchors.contains(target) {
            grouped.partner_ids.insert(node.id());
            grouped.by_primary.entry(target).or_default().push(node);
        }
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::{render_forest, VisualItem};
    use crate::hierarchy::build_sorted_forest;
    use crate::model::member::{Member, PairPosition};

    fn chart(members: &[Member]) -> super::VisualTree {
        render_forest(&build_sorted_forest(members))
    }

    #[test]
    fn empty_forest_renders_empty_tree() {
        assert!(chart(&[]).is_empty());
    }

    #[test]
    fn single_root_with_report() {
        let tree = chart(&[
            Member::new("1", "Ann", "Editor"),
            Member::new("2", "Bo", "Senior Editor").reporting_to("1"),
        ]);
        let top = tree.top.as_ref().unwrap();
        assert_eq!(top.items.len(), 1);
        let VisualItem::Single(root) = &top.items[0] else {
            panic!("expected single root");
        };
        assert_eq!(root.id(), "1");
        let level1 = root.children.as_ref().unwrap();
        assert_eq!(level1.depth, 1);
        assert_eq!(level1.items.len(), 1);
        assert_eq!(level1.items[0].nodes()[0].team_id, "2");
    }

    #[test]
    fn root_partner_renders_as_pair() {
        let tree = chart(&[
            Member::new("1", "Ann", ""),
            Member::new("ep", "Eve", "EP").paired("1", None),
        ]);
        let top = tree.top.as_ref().unwrap();
        assert_eq!(top.items.len(), 1);
        let VisualItem::Pair { partner, primary } = &top.items[0] else {
            panic!("expected pair");
        };
        assert_eq!(partner.id(), "ep");
        assert_eq!(primary.id(), "1");
        assert_eq!(partner.team_id, "1");
    }

    #[test]
    fn level_one_left_and_right_partners_form_trio() {
        let tree = chart(&[
            Member::new("root", "Root", ""),
            Member::new("m", "Mid", "Senior Editor").reporting_to("root"),
            Member::new("l", "Lefty", "EP")
                .reporting_to("root")
                .paired("m", Some(PairPosition::Left)),
            Member::new("r", "Righty", "EP")
                .reporting_to("root")
                .paired("m", Some(PairPosition::Right)),
            Member::new("x", "Report", "").reporting_to("m"),
        ]);
        let root = tree.find("root").unwrap();
        let level1 = root.children.as_ref().unwrap();
        assert_eq!(level1.items.len(), 1);
        let VisualItem::Trio {
            left,
            primary,
            right,
        } = &level1.items[0]
        else {
            panic!("expected trio");
        };
        assert_eq!((left.id(), primary.id(), right.id()), ("l", "m", "r"));
        assert_eq!(tree.find("x").unwrap().team_id, "m");
        assert_eq!(tree.node_count(), 5);
    }

    #[test]
    fn deep_partners_render_as_singles() {
        let tree = chart(&[
            Member::new("0", "Root", ""),
            Member::new("1", "One", "").reporting_to("0"),
            Member::new("2", "Two", "").reporting_to("1"),
            Member::new("3", "Three", "").reporting_to("1").paired("2", None),
        ]);
        let level2 = tree.find("1").unwrap().children.as_ref().unwrap();
        assert_eq!(level2.items.len(), 2);
        assert!(level2
            .items
            .iter()
            .all(|item| matches!(item, VisualItem::Single(node) if node.team_id == "1")));
    }

    #[test]
    fn chained_and_extra_partners_are_not_dropped() {
        let tree = chart(&[
            Member::new("a", "A", "").paired("b", None),
            Member::new("b", "B", "").paired("c", None),
            Member::new("c", "C", ""),
            Member::new("d", "D", "").paired("c", Some(PairPosition::Left)),
        ]);
        assert_eq!(tree.node_count(), 4);
        for id in ["a", "b", "c", "d"] {
            assert!(tree.find(id).is_some(), "missing {id}");
        }
    }
}
