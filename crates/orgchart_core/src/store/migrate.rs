//! Record-level migration: versioned data fixes plus structural repair.
//!
//! # Responsibility
//! - Apply an ordered list of one-time data fixes to a loaded collection.
//! - Repair structural damage: blank ids, duplicate ids, `reports_to` cycles.
//! - Report whether anything changed so the caller can decide to re-persist.
//!
//! # Invariants
//! - Pure over the member slice; no I/O.
//! - Running `migrate` on its own output reports `changed == false`.
//! - Data fixes never introduce a `reports_to` cycle; such a fix is skipped
//!   until a repair removes the cycle that blocked it.

use crate::model::member::{Member, MemberId, PairPosition};
use log::{info, warn};
use std::collections::{HashMap, HashSet};

/// One record-level correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFix {
    /// Removes the record with this id, only when its name matches.
    RemoveRecord {
        id: &'static str,
        name: &'static str,
    },
    /// Inserts a paired record when missing and its pairing target exists;
    /// otherwise corrects pairing target and declared position.
    EnsurePaired {
        id: &'static str,
        name: &'static str,
        title: &'static str,
        reports_to: &'static str,
        paired_with: &'static str,
        position: Option<PairPosition>,
    },
    /// Points every listed record that exists at `reports_to`.
    Reassign {
        ids: &'static [&'static str],
        reports_to: &'static str,
    },
    /// Moves a misfiled record (matched by name) to `to_id` and resets its
    /// title, manager and pairing.
    Rehome {
        from_id: &'static str,
        to_id: &'static str,
        name: &'static str,
        title: &'static str,
        reports_to: &'static str,
    },
}

/// A data fix with its position in the fix history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionedFix {
    pub version: u32,
    pub name: &'static str,
    pub fix: DataFix,
}

/// Outcome of one `migrate` run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// Whether any record was inserted, removed or modified.
    pub changed: bool,
    /// Names of the fixes and repairs that changed something, in run order.
    pub applied: Vec<&'static str>,
}

impl MigrationReport {
    fn record(&mut self, name: &'static str, changed: bool) {
        if changed {
            self.changed = true;
            if !self.applied.contains(&name) {
                self.applied.push(name);
            }
        }
    }

    fn merge(&mut self, other: MigrationReport) {
        for name in other.applied {
            self.record(name, true);
        }
    }
}

/// Upper bound on fix-and-repair passes; every pass but the last changed something.
const MAX_PASSES: usize = 8;

/// Repairs structure, then runs `fixes` in order followed by the repairs
/// again until a pass changes nothing.
///
/// A fix skipped because it would close a cycle may become applicable once
/// the repairs break that cycle, so one pass is not enough.
pub fn migrate(members: &mut Vec<Member>, fixes: &[VersionedFix]) -> MigrationReport {
    let mut report = MigrationReport::default();
    repair(members, &mut report);

    let mut settled = false;
    for _ in 0..MAX_PASSES {
        let mut pass = MigrationReport::default();
        for versioned in fixes {
            let changed = apply_fix(members, &versioned.fix);
            pass.record(versioned.name, changed);
        }
        repair(members, &mut pass);
        if !pass.changed {
            settled = true;
            break;
        }
        report.merge(pass);
    }
    if !settled {
        warn!(
            "event=members_migrate module=store status=unsettled passes={MAX_PASSES}"
        );
    }

    if report.changed {
        info!(
            "event=members_migrate module=store status=changed applied={}",
            report.applied.join(",")
        );
    }
    report
}

fn repair(members: &mut Vec<Member>, report: &mut MigrationReport) {
    report.record("drop_blank_ids", drop_blank_ids(members));
    report.record("drop_duplicate_ids", drop_duplicate_ids(members));
    report.record("break_reporting_cycles", break_cycles(members) > 0);
}

fn apply_fix(members: &mut Vec<Member>, fix: &DataFix) -> bool {
    match *fix {
        DataFix::RemoveRecord { id, name } => {
            let before = members.len();
            members.retain(|member| !(member.id == id && member.name == name));
            members.len() != before
        }
        DataFix::EnsurePaired {
            id,
            name,
            title,
            reports_to,
            paired_with,
            position,
        } => {
            if let Some(existing) = members.iter_mut().find(|member| member.id == id) {
                let mut changed = false;
                if existing.paired_with.as_deref() != Some(paired_with) {
                    existing.paired_with = Some(paired_with.to_string());
                    changed = true;
                }
                if position.is_some() && existing.position != position {
                    existing.position = position;
                    changed = true;
                }
                return changed;
            }
            if !members.iter().any(|member| member.id == paired_with) {
                return false;
            }
            let mut member = Member::new(id, name, title).paired(
                paired_with,
                Some(position.unwrap_or(PairPosition::Left)),
            );
            member.reports_to = Some(reports_to.to_string());
            members.push(member);
            true
        }
        DataFix::Reassign { ids, reports_to } => {
            let mut changed = false;
            for id in ids {
                changed |= set_manager(members, id, reports_to);
            }
            changed
        }
        DataFix::Rehome {
            from_id,
            to_id,
            name,
            title,
            reports_to,
        } => {
            let mut changed = false;
            if let Some(index) = members
                .iter()
                .position(|member| member.id == from_id && member.name == name)
            {
                if members.iter().any(|member| member.id == to_id) {
                    members.remove(index);
                } else {
                    members[index].id = to_id.to_string();
                }
                changed = true;
            }
            if let Some(member) = members
                .iter_mut()
                .find(|member| member.id == to_id && member.name == name)
            {
                if member.title != title || member.paired_with.is_some() || member.position.is_some()
                {
                    member.title = title.to_string();
                    member.paired_with = None;
                    member.position = None;
                    changed = true;
                }
            }
            changed | set_manager(members, to_id, reports_to)
        }
    }
}

/// Sets `id`'s manager unless already set or unless it would close a cycle.
fn set_manager(members: &mut [Member], id: &str, manager: &str) -> bool {
    let Some(index) = members.iter().position(|member| member.id == id) else {
        return false;
    };
    if members[index].reports_to.as_deref() == Some(manager) {
        return false;
    }
    if manager_chain_reaches(members, manager, id) {
        warn!("event=members_migrate module=store status=skipped reason=would_cycle member={id}");
        return false;
    }
    members[index].reports_to = Some(manager.to_string());
    true
}

/// Whether walking `reports_to` upward from `start` reaches `target`.
pub(crate) fn manager_chain_reaches(members: &[Member], start: &str, target: &str) -> bool {
    let by_id = members
        .iter()
        .map(|member| (member.id.as_str(), member))
        .collect::<HashMap<_, _>>();
    let mut visited = HashSet::new();
    let mut cursor = Some(start);
    while let Some(current) = cursor {
        if current == target {
            return true;
        }
        if !visited.insert(current) {
            return false;
        }
        cursor = by_id
            .get(current)
            .and_then(|member| member.reports_to.as_deref());
    }
    false
}

fn manager_index(
    members: &[Member],
    index: &HashMap<MemberId, usize>,
    position: usize,
) -> Option<usize> {
    members[position]
        .reports_to
        .as_ref()
        .and_then(|manager| index.get(manager).copied())
}

fn drop_blank_ids(members: &mut Vec<Member>) -> bool {
    let before = members.len();
    members.retain(|member| !member.id.trim().is_empty());
    members.len() != before
}

fn drop_duplicate_ids(members: &mut Vec<Member>) -> bool {
    let before = members.len();
    let mut seen: HashSet<MemberId> = HashSet::new();
    members.retain(|member| seen.insert(member.id.clone()));
    members.len() != before
}

/// Clears the manager of the first record (in store order) found closing each cycle.
///
/// Expects unique ids. Returns the number of cycles broken.
fn break_cycles(members: &mut [Member]) -> usize {
    let index = members
        .iter()
        .enumerate()
        .map(|(position, member)| (member.id.clone(), position))
        .collect::<HashMap<_, _>>();
    let mut settled = vec![false; members.len()];
    let mut broken = 0;

    for start in 0..members.len() {
        if settled[start] {
            continue;
        }
        let mut path = vec![start];
        let mut cursor = manager_index(members, &index, start);

        loop {
            match cursor {
                Some(current) if current == start => {
                    warn!(
                        "event=members_migrate module=store status=repaired reason=reporting_cycle member={}",
                        members[start].id
                    );
                    members[start].reports_to = None;
                    broken += 1;
                }
                // Ran into a cycle that `start` is not part of; that cycle's
                // first member repairs it on its own turn.
                Some(current) if path.contains(&current) => break,
                Some(current) if !settled[current] => {
                    path.push(current);
                    cursor = manager_index(members, &index, current);
                    continue;
                }
                _ => {}
            }
            for position in &path {
                settled[*position] = true;
            }
            break;
        }
    }
    broken
}
