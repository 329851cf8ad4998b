use orgchart_core::hierarchy::{build_sorted_forest, sort_roots, sort_siblings, ForestIndex};
use orgchart_core::layout::{render_forest, VisualItem};
use orgchart_core::store::migrate::migrate;
use orgchart_core::store::seed::{default_members, Seed};
use orgchart_core::{build_forest, Member};

fn forest_size(members: &[Member]) -> usize {
    build_forest(members)
        .iter()
        .map(|root| root.subtree_len())
        .sum()
}

#[test]
fn manager_with_one_report() {
    let members: Vec<Member> = serde_json::from_str(
        r#"[{"id":"1","name":"Ann","reportsTo":null},{"id":"2","name":"Bo","reportsTo":"1"}]"#,
    )
    .unwrap();
    let forest = build_forest(&members);
    assert_eq!(forest.len(), 1);
    assert_eq!(forest[0].member.name, "Ann");
    assert_eq!(forest[0].children.len(), 1);
    assert_eq!(forest[0].children[0].member.name, "Bo");
}

#[test]
fn seeded_chart_keeps_every_member() {
    let members = default_members();
    assert_eq!(forest_size(&members), members.len());

    let index = ForestIndex::build(&members);
    for member in &members {
        let expected = member
            .reports_to
            .as_deref()
            .filter(|manager| index.get(manager).is_some());
        assert_eq!(
            index.parent_of(&member.id).map(|parent| parent.id.as_str()),
            expected,
            "member {}",
            member.id
        );
    }

    let tree = render_forest(&build_sorted_forest(&members));
    assert_eq!(tree.node_count(), members.len());
}

#[test]
fn seeded_root_level_groups_partners() {
    let members = default_members();
    let tree = render_forest(&build_sorted_forest(&members));
    let root = tree.find("1").unwrap();
    let level1 = root.children.as_ref().unwrap();
    let grouped = level1
        .items
        .iter()
        .filter(|item| !matches!(item, VisualItem::Single(_)))
        .count();
    assert!(grouped > 0);

    let trio = level1.items.iter().find_map(|item| match item {
        VisualItem::Trio {
            left,
            primary,
            right,
        } => Some((left.id(), primary.id(), right.id())),
        _ => None,
    });
    assert_eq!(trio, Some(("52", "3", "58")));
}

#[test]
fn sorting_is_idempotent_on_seed() {
    let members = default_members();
    let mut forest = build_sorted_forest(&members);
    let once = forest.clone();
    sort_roots(&mut forest);
    sort_siblings(&mut forest);
    assert_eq!(forest, once);
}

#[test]
fn cyclic_data_builds_and_is_broken_by_migration() {
    let mut members = vec![
        Member::new("a", "A", "").reporting_to("c"),
        Member::new("b", "B", "").reporting_to("a"),
        Member::new("c", "C", "").reporting_to("b"),
        Member::new("d", "D", "").reporting_to("d"),
    ];
    assert_eq!(forest_size(&members), 4);

    let report = migrate(&mut members, Seed::empty().fixes);
    assert!(report.changed);
    let roots = build_forest(&members)
        .iter()
        .map(|node| node.member.id.clone())
        .collect::<Vec<_>>();
    assert_eq!(roots, vec!["a", "d"]);
    assert!(!migrate(&mut members, Seed::empty().fixes).changed);
}
