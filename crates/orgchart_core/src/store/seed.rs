//! Seed dataset and its record-level data fixes.
//!
//! The seed is sample organization data: the chart shown on first launch and
//! the one-time corrections that earlier saved copies of it need. None of the
//! ids or names here are product behavior; callers can swap in another `Seed`.

use super::migrate::{DataFix, VersionedFix};
use crate::model::member::{Member, MemberId, PairPosition};

/// Id that every saved copy of the seed chart must still contain.
pub const SEED_SENTINEL_ID: &str = "58";

/// Default dataset plus the fixes that bring old saved copies up to date.
#[derive(Debug, Clone, Copy)]
pub struct Seed {
    /// Produces the canonical default dataset.
    pub members: fn() -> Vec<Member>,
    /// A stored blob without this id is discarded in favor of `members`.
    pub sentinel_id: Option<&'static str>,
    /// Ordered data fixes applied on every load.
    pub fixes: &'static [VersionedFix],
}

impl Seed {
    /// Seed used by shipped builds.
    pub fn default_org() -> Self {
        Self {
            members: default_members,
            sentinel_id: Some(SEED_SENTINEL_ID),
            fixes: SEED_FIXES,
        }
    }

    /// No default data, no sentinel and no fixes.
    pub fn empty() -> Self {
        Self {
            members: Vec::new,
            sentinel_id: None,
            fixes: &[],
        }
    }
}

impl Default for Seed {
    fn default() -> Self {
        Self::default_org()
    }
}

const SEED_FIXES: &[VersionedFix] = &[
    VersionedFix {
        version: 1,
        name: "drop_misfiled_ep_placeholder",
        fix: DataFix::RemoveRecord {
            id: "51",
            name: "EP - Bryan Cook",
        },
    },
    VersionedFix {
        version: 2,
        name: "ensure_ep_aaron_porzel",
        fix: DataFix::EnsurePaired {
            id: "52",
            name: "EP - Aaron Porzel",
            title: "EP",
            reports_to: "1",
            paired_with: "3",
            position: Some(PairPosition::Left),
        },
    },
    VersionedFix {
        version: 3,
        name: "ensure_ep_lauren_shawe",
        fix: DataFix::EnsurePaired {
            id: "58",
            name: "Lauren Shawe",
            title: "EP",
            reports_to: "1",
            paired_with: "3",
            position: Some(PairPosition::Right),
        },
    },
    VersionedFix {
        version: 4,
        name: "ensure_ep_art_castle",
        fix: DataFix::EnsurePaired {
            id: "53",
            name: "EP - Art Castle",
            title: "EP",
            reports_to: "1",
            paired_with: "4",
            position: None,
        },
    },
    VersionedFix {
        version: 5,
        name: "ensure_ep_jesse_thompson",
        fix: DataFix::EnsurePaired {
            id: "54",
            name: "EP - Jesse Thompson",
            title: "EP",
            reports_to: "1",
            paired_with: "5",
            position: None,
        },
    },
    VersionedFix {
        version: 6,
        name: "ensure_ep_jefferson_chaney",
        fix: DataFix::EnsurePaired {
            id: "55",
            name: "EP - Jefferson Chaney",
            title: "EP",
            reports_to: "1",
            paired_with: "6",
            position: None,
        },
    },
    VersionedFix {
        version: 7,
        name: "ensure_ep_greg_zimny",
        fix: DataFix::EnsurePaired {
            id: "60",
            name: "Greg Zimny",
            title: "EP",
            reports_to: "1",
            paired_with: "7",
            position: Some(PairPosition::Left),
        },
    },
    VersionedFix {
        version: 8,
        name: "ensure_ep_nate_cali",
        fix: DataFix::EnsurePaired {
            id: "57",
            name: "EP - Nate Cali",
            title: "EP",
            reports_to: "1",
            paired_with: "8",
            position: None,
        },
    },
    VersionedFix {
        version: 9,
        name: "move_team_to_jefferson_chaney",
        fix: DataFix::Reassign {
            ids: &["18", "28", "39", "47", "50"],
            reports_to: "6",
        },
    },
    VersionedFix {
        version: 10,
        name: "move_craig_holzer_to_justin_sirizzotti",
        fix: DataFix::Reassign {
            ids: &["19"],
            reports_to: "7",
        },
    },
    VersionedFix {
        version: 11,
        name: "move_joe_duva_to_craig_holzer",
        fix: DataFix::Reassign {
            ids: &["29"],
            reports_to: "19",
        },
    },
    VersionedFix {
        version: 12,
        name: "move_chris_fontes_to_julia_marshall",
        fix: DataFix::Reassign {
            ids: &["31"],
            reports_to: "30",
        },
    },
    VersionedFix {
        version: 13,
        name: "rehome_matt_matsil",
        fix: DataFix::Rehome {
            from_id: "51",
            to_id: "59",
            name: "Matt Matsil",
            title: "AE",
            reports_to: "4",
        },
    },
];

fn member(id: &str, name: &str, title: &str, reports_to: Option<&str>) -> Member {
    let mut member = Member::new(id, name, title);
    member.reports_to = reports_to.map(MemberId::from);
    member
}

/// Canonical default dataset, in display order.
pub fn default_members() -> Vec<Member> {
    vec![
        member("1", "Bryan Cook", "ECD", None),
        member("52", "EP - Aaron Porzel", "EP", Some("1"))
            .paired("3", Some(PairPosition::Left)),
        member("3", "Aaron Porzel", "CD", Some("1")),
        member("58", "Lauren Shawe", "EP", Some("1"))
            .paired("3", Some(PairPosition::Right)),
        member("53", "EP - Art Castle", "EP", Some("1"))
            .paired("4", None),
        member("4", "Art Castle", "CD", Some("1")),
        member("54", "EP - Jesse Thompson", "EP", Some("1"))
            .paired("5", None),
        member("5", "Jesse Thompson", "CD", Some("1")),
        member("55", "EP - Jefferson Chaney", "EP", Some("1"))
            .paired("6", None),
        member("6", "Jefferson Chaney", "CD", Some("1")),
        member("60", "Greg Zimny", "EP", Some("1"))
            .paired("7", Some(PairPosition::Left)),
        member("7", "Justin Sirizzotti", "ACD", Some("1")),
        member("57", "EP - Nate Cali", "EP", Some("1"))
            .paired("8", None),
        member("8", "Nate Cali", "CD", Some("1")),
        member("9", "Ben Reesing", "Senior Editor", Some("1")),
        member("10", "Paul Oh", "Editor", Some("1")),
        member("11", "Vicente Lopez", "Editor", Some("1")),
        member("12", "Lissette Schuster", "Editor", Some("1")),
        member("13", "Arianna Nasi", "Editor", Some("1")),
        member("14", "Greg Somerlot", "Senior Editor", Some("3")),
        member("15", "Luke Sloma", "Senior Editor", Some("3")),
        member("16", "Ryan Linich", "Editor", Some("4")),
        member("17", "Bert Cambridge", "Senior Editor", Some("5")),
        member("18", "Dave Bauer", "Senior Editor", Some("6")),
        member("19", "Craig Holzer", "Senior Editor", Some("7")),
        member("20", "Dana Apuzzo", "Senior Editor", Some("7")),
        member("21", "Josh Moise", "Senior Editor", Some("7")),
        member("22", "Vic Barczyk", "Senior Editor", Some("7")),
        member("23", "Quenton Jones", "Senior Editor", Some("8")),
        member("24", "Cassandra Tyler", "Senior Editor", Some("14")),
        member("25", "Kate Hershey", "AE", Some("15")),
        member("26", "Karla Llompart", "Editor", Some("16")),
        member("27", "Stephen Noll", "Editor", Some("17")),
        member("28", "John Gerbec", "Senior Editor", Some("6")),
        member("29", "Joe Duva", "AE", Some("19")),
        member("30", "Julia Marshall", "Editor", Some("20")),
        member("31", "Chris Fontes", "AE", Some("30")),
        member("32", "Vanessa Aoki", "Editor", Some("21")),
        member("33", "Thomas Irreno Pinilla", "PGD Editor", Some("22")),
        member("34", "Luke Nelson", "AE", Some("23")),
        member("35", "Rob Sheppard", "Editor", Some("24")),
        member("36", "Annie Kalfas", "Associate Editor", Some("25")),
        member("37", "Jacob Fagliano", "Editor", Some("26")),
        member("38", "Louie LaFleur", "Editor", Some("27")),
        member("39", "Shane Scherholz", "Junior Editor", Some("6")),
        member("40", "Kevin Curran", "Editor", Some("32")),
        member("41", "Manuel Pimentel", "PGD Editor", Some("33")),
        member("42", "Victoria Villa", "AE", Some("34")),
        member("43", "Cara Ross", "Editor", Some("35")),
        member("44", "Jack Cronin", "Associate Editor", Some("36")),
        member("45", "Steve Stanton", "Editor", Some("37")),
        member("46", "Ryan Quinlan", "AE", Some("38")),
        member("47", "Nancy Zhong", "Editor", Some("6")),
        member("48", "Santiago Vilabano", "PGD Editor", Some("41")),
        member("49", "Christian Cornejo", "AE", Some("45")),
        member("50", "Steven Barber", "AE", Some("6")),
        member("59", "Matt Matsil", "AE", Some("4")),
    ]
}

#[cfg(test)]
mod tests {
    use super::{default_members, Seed, SEED_SENTINEL_ID};
    use std::collections::HashSet;

    #[test]
    fn default_members_have_unique_ids_and_contain_sentinel() {
        let members = default_members();
        let ids = members.iter().map(|m| m.id.as_str()).collect::<HashSet<_>>();
        assert_eq!(ids.len(), members.len());
        assert!(ids.contains(SEED_SENTINEL_ID));
    }

    #[test]
    fn every_manager_and_pair_target_exists() {
        let members = default_members();
        let ids = members.iter().map(|m| m.id.as_str()).collect::<HashSet<_>>();
        for member in &members {
            if let Some(manager) = member.reports_to.as_deref() {
                assert!(ids.contains(manager), "{} reports to unknown {manager}", member.id);
            }
            if let Some(primary) = member.paired_with.as_deref() {
                assert!(ids.contains(primary), "{} paired to unknown {primary}", member.id);
            }
        }
    }

    #[test]
    fn fix_versions_are_strictly_increasing() {
        for pair in Seed::default_org().fixes.windows(2) {
            assert!(pair[0].version < pair[1].version);
        }
    }
}
