//! Id index and forest construction.

use crate::model::member::Member;
use log::warn;
use std::collections::HashMap;

/// One member plus its direct reports.
#[derive(Debug, Clone, PartialEq)]
pub struct HierarchyNode<'a> {
    pub member: &'a Member,
    pub children: Vec<HierarchyNode<'a>>,
}

impl<'a> HierarchyNode<'a> {
    pub fn id(&self) -> &'a str {
        &self.member.id
    }

    /// Members in this subtree, including this one.
    pub fn subtree_len(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(HierarchyNode::subtree_len)
            .sum::<usize>()
    }

    pub fn find(&self, id: &str) -> Option<&HierarchyNode<'a>> {
        if self.member.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    /// Pre-order walk calling `visit(parent_id, node)`.
    pub fn walk<F>(&self, parent: Option<&'a str>, visit: &mut F)
    where
        F: FnMut(Option<&'a str>, &HierarchyNode<'a>),
    {
        visit(parent, self);
        for child in &self.children {
            child.walk(Some(self.id()), visit);
        }
    }
}

/// Parent/child adjacency over a member slice, addressed by slice index.
#[derive(Debug)]
pub struct ForestIndex<'a> {
    members: &'a [Member],
    by_id: HashMap<&'a str, usize>,
    parents: Vec<Option<usize>>,
    children: Vec<Vec<usize>>,
    roots: Vec<usize>,
}

impl<'a> ForestIndex<'a> {
    /// Builds the index. The first record wins when ids repeat.
    pub fn build(members: &'a [Member]) -> Self {
        let mut by_id = HashMap::with_capacity(members.len());
        for (index, member) in members.iter().enumerate() {
            by_id.entry(member.id.as_str()).or_insert(index);
        }

        let mut parents = vec![None; members.len()];
        let mut children = vec![Vec::new(); members.len()];
        let mut roots = Vec::new();
        for (index, member) in members.iter().enumerate() {
            let parent = member
                .reports_to
                .as_deref()
                .and_then(|manager| by_id.get(manager).copied())
                .filter(|&parent| parent != index);
            match parent {
                Some(parent) => {
                    parents[index] = Some(parent);
                    children[parent].push(index);
                }
                None => roots.push(index),
            }
        }

        let mut index = Self {
            members,
            by_id,
            parents,
            children,
            roots,
        };
        index.promote_unreachable();
        index
    }

    pub fn members(&self) -> &'a [Member] {
        self.members
    }

    pub fn get(&self, id: &str) -> Option<&'a Member> {
        self.by_id.get(id).map(|&index| &self.members[index])
    }

    /// Manager as placed in the forest; `None` for roots.
    pub fn parent_of(&self, id: &str) -> Option<&'a Member> {
        let index = *self.by_id.get(id)?;
        self.parents[index].map(|parent| &self.members[parent])
    }

    pub fn root_count(&self) -> usize {
        self.roots.len()
    }

    /// Materializes the forest with roots and siblings in store order.
    pub fn to_forest(&self) -> Vec<HierarchyNode<'a>> {
        self.roots.iter().map(|&root| self.node(root)).collect()
    }

    fn node(&self, index: usize) -> HierarchyNode<'a> {
        HierarchyNode {
            member: &self.members[index],
            children: self.children[index]
                .iter()
                .map(|&child| self.node(child))
                .collect(),
        }
    }

    /// Members caught in a reporting cycle are unreachable from any root.
    /// The first such member in store order becomes a root, repeatedly.
    fn promote_unreachable(&mut self) {
        let mut reached = vec![false; self.members.len()];
        let roots = self.roots.clone();
        for root in roots {
            self.mark_subtree(root, &mut reached);
        }

        for index in 0..self.members.len() {
            if reached[index] {
                continue;
            }
            if let Some(parent) = self.parents[index].take() {
                self.children[parent].retain(|&child| child != index);
            }
            warn!(
                "event=hierarchy_build module=hierarchy status=cycle_promoted member_id={}",
                self.members[index].id
            );
            self.roots.push(index);
            self.mark_subtree(index, &mut reached);
        }
    }

    fn mark_subtree(&self, start: usize, reached: &mut [bool]) {
        let mut stack = vec![start];
        while let Some(index) = stack.pop() {
            if reached[index] {
                continue;
            }
            reached[index] = true;
            stack.extend(self.children[index].iter().copied());
        }
    }
}

/// Builds the reporting forest in store order.
pub fn build_forest(members: &[Member]) -> Vec<HierarchyNode<'_>> {
    ForestIndex::build(members).to_forest()
}

#[cfg(test)]
mod tests {
    use super::{build_forest, ForestIndex};
    use crate::model::member::Member;

    fn total(members: &[Member]) -> usize {
        build_forest(members)
            .iter()
            .map(|root| root.subtree_len())
            .sum()
    }

    #[test]
    fn unknown_and_self_managers_become_roots() {
        let members = vec![
            Member::new("1", "Ann", "Editor"),
            Member::new("2", "Bo", "Editor").reporting_to("1"),
            Member::new("3", "Cy", "").reporting_to("404"),
            Member::new("4", "Di", "").reporting_to("4"),
        ];
        let forest = build_forest(&members);
        let root_ids = forest.iter().map(|node| node.id()).collect::<Vec<_>>();
        assert_eq!(root_ids, vec!["1", "3", "4"]);
        assert_eq!(forest[0].children[0].id(), "2");
        assert_eq!(total(&members), members.len());
    }

    #[test]
    fn cycle_members_are_promoted_not_dropped() {
        let members = vec![
            Member::new("r", "Root", ""),
            Member::new("a", "A", "").reporting_to("b"),
            Member::new("b", "B", "").reporting_to("c"),
            Member::new("c", "C", "").reporting_to("a"),
            Member::new("d", "D", "").reporting_to("c"),
        ];
        let index = ForestIndex::build(&members);
        assert_eq!(index.root_count(), 2);
        assert!(index.parent_of("a").is_none());
        assert_eq!(index.parent_of("b").map(|m| m.id.as_str()), Some("c"));
        assert_eq!(total(&members), 5);
    }

    #[test]
    fn parents_in_forest_match_reports_to_when_resolvable() {
        let members = vec![
            Member::new("1", "Ann", ""),
            Member::new("2", "Bo", "").reporting_to("1"),
            Member::new("3", "Cy", "").reporting_to("2"),
            Member::new("4", "Di", "").reporting_to("1"),
        ];
        let forest = build_forest(&members);
        for root in &forest {
            root.walk(None, &mut |parent, node| {
                assert_eq!(parent, node.member.reports_to.as_deref());
            });
        }
    }

    #[test]
    fn duplicate_ids_resolve_to_first_record() {
        let members = vec![
            Member::new("1", "First", ""),
            Member::new("1", "Second", ""),
            Member::new("2", "Bo", "").reporting_to("1"),
        ];
        let forest = build_forest(&members);
        assert_eq!(forest.len(), 2);
        assert_eq!(forest[0].member.name, "First");
        assert_eq!(forest[0].children[0].id(), "2");
        assert!(forest[1].children.is_empty());
    }

    #[test]
    fn empty_input_builds_empty_forest() {
        assert!(build_forest(&[]).is_empty());
    }
}
