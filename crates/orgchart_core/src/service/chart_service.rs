//! Member use cases over the record store.
//!
//! # Responsibility
//! - Validate user input before any write.
//! - Enforce reporting-line rules: known manager, no self-management, no cycles.
//! - Persist every accepted change as one whole-collection write.
//!
//! # Invariants
//! - A failed operation leaves both memory and storage untouched.
//! - Ids of existing members never change.

use crate::config::ChartConfig;
use crate::model::member::{Member, MemberDraft, MemberId, MemberValidationError};
use crate::store::blob_store::BlobStore;
use crate::store::member_store::MemberStore;
use crate::store::migrate::manager_chain_reaches;
use crate::store::photos::{encode_data_url, merge_photos, read_photo_file, PhotoSource, PhotoSourceError};
use crate::store::seed::Seed;
use crate::store::StoreError;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug)]
pub enum ServiceError {
    Validation(MemberValidationError),
    MemberNotFound(MemberId),
    ManagerNotFound(MemberId),
    /// Making `manager` the manager of `member` would close a reporting loop.
    CycleDetected {
        member: MemberId,
        manager: MemberId,
    },
    Store(StoreError),
    Photo(PhotoSourceError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::MemberNotFound(id) => write!(f, "member not found: {id}"),
            Self::ManagerNotFound(id) => write!(f, "manager not found: {id}"),
            Self::CycleDetected { member, manager } => write!(
                f,
                "{manager} cannot manage {member}: reporting line would loop"
            ),
            Self::Store(err) => write!(f, "{err}"),
            Self::Photo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::Photo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<MemberValidationError> for ServiceError {
    fn from(value: MemberValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<PhotoSourceError> for ServiceError {
    fn from(value: PhotoSourceError) -> Self {
        Self::Photo(value)
    }
}

/// In-memory member list backed by a [`MemberStore`].
pub struct ChartService<B: BlobStore> {
    store: MemberStore<B>,
    members: Vec<Member>,
}

impl<B: BlobStore> ChartService<B> {
    /// Loads members from `store`, falling back to its seed when needed.
    pub fn open(store: MemberStore<B>) -> ServiceResult<Self> {
        let members = store.load()?;
        Ok(Self { store, members })
    }

    /// Opens over `blobs` with the storage key and sentinel policy from `config`.
    pub fn open_configured(blobs: B, config: &ChartConfig) -> ServiceResult<Self> {
        let mut seed = Seed::default_org();
        if !config.require_seed_sentinel {
            seed.sentinel_id = None;
        }
        Self::open(MemberStore::with_seed(
            blobs,
            config.storage_key.clone(),
            seed,
        ))
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn member(&self, id: &str) -> Option<&Member> {
        self.members.iter().find(|member| member.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.member(id).is_some()
    }

    /// Adds a member with a fresh id under `reports_to`.
    ///
    /// # Errors
    /// - `Validation` for a blank name.
    /// - `ManagerNotFound` for an unknown manager.
    pub fn add_member(
        &mut self,
        draft: MemberDraft,
        reports_to: Option<&str>,
    ) -> ServiceResult<MemberId> {
        let draft = draft.normalized()?;
        if let Some(manager) = reports_to {
            self.require_manager(manager)?;
        }
        let member = Member::from_draft(draft, reports_to.map(str::to_string));
        let id = member.id.clone();

        let mut next = self.members.clone();
        next.push(member);
        self.commit(next)?;
        info!("event=member_add module=service status=ok member_id={id}");
        Ok(id)
    }

    /// Replaces the editable fields of `id`; id and manager are kept.
    pub fn edit_member(&mut self, id: &str, draft: MemberDraft) -> ServiceResult<()> {
        let draft = draft.normalized()?;
        let index = self.index_of(id)?;

        let mut next = self.members.clone();
        next[index].apply_draft(draft);
        self.commit(next)?;
        info!("event=member_edit module=service status=ok member_id={id}");
        Ok(())
    }

    /// Moves `id` under `manager`, or makes it a root for `None`.
    ///
    /// # Errors
    /// - `MemberNotFound`, `ManagerNotFound`.
    /// - `CycleDetected` when `manager` is `id` or one of its reports.
    pub fn reassign_manager(&mut self, id: &str, manager: Option<&str>) -> ServiceResult<()> {
        let index = self.index_of(id)?;
        if let Some(manager) = manager {
            self.require_manager(manager)?;
            if manager_chain_reaches(&self.members, manager, id) {
                return Err(ServiceError::CycleDetected {
                    member: id.to_string(),
                    manager: manager.to_string(),
                });
            }
        }
        if self.members[index].reports_to.as_deref() == manager {
            return Ok(());
        }

        let mut next = self.members.clone();
        next[index].reports_to = manager.map(str::to_string);
        self.commit(next)?;
        info!(
            "event=member_reassign module=service status=ok member_id={id} manager_id={}",
            manager.unwrap_or("none")
        );
        Ok(())
    }

    /// Deletes `id` once `confirm` approves. Reports are kept and become roots.
    ///
    /// Returns `Ok(false)` when confirmation is declined.
    pub fn delete_member<F>(&mut self, id: &str, confirm: F) -> ServiceResult<bool>
    where
        F: FnOnce(&Member) -> bool,
    {
        let index = self.index_of(id)?;
        if !confirm(&self.members[index]) {
            return Ok(false);
        }

        let mut next = self.members.clone();
        next.remove(index);
        self.commit(next)?;
        info!("event=member_delete module=service status=ok member_id={id}");
        Ok(true)
    }

    /// Members eligible as managers: creative directors and their associates.
    pub fn manager_candidates(&self) -> Vec<&Member> {
        let mut candidates = self
            .members
            .iter()
            .filter(|member| is_manager_title(&member.title))
            .collect::<Vec<_>>();
        candidates.sort_by_key(|member| member.name.to_lowercase());
        candidates
    }

    /// Merges photos from `source`. A failing source is logged and skipped.
    ///
    /// Returns whether any photo changed.
    pub fn merge_photos_from<P: PhotoSource + ?Sized>(&mut self, source: &P) -> ServiceResult<bool> {
        let records = match source.fetch() {
            Ok(records) => records,
            Err(err) => {
                warn!("event=photo_merge module=service status=skipped error={err}");
                return Ok(false);
            }
        };

        let mut next = self.members.clone();
        if !merge_photos(&mut next, &records) {
            return Ok(false);
        }
        self.commit(next)?;
        info!(
            "event=photo_merge module=service status=ok records={}",
            records.len()
        );
        Ok(true)
    }

    /// Encodes uploaded image bytes for a member's `photo` field.
    pub fn photo_data_url(&self, bytes: &[u8], mime: &str) -> String {
        encode_data_url(bytes, mime)
    }

    /// Reads an image file into a `photo` data URL.
    pub fn photo_from_file(&self, path: impl AsRef<Path>) -> ServiceResult<String> {
        Ok(read_photo_file(path)?)
    }

    fn index_of(&self, id: &str) -> ServiceResult<usize> {
        self.members
            .iter()
            .position(|member| member.id == id)
            .ok_or_else(|| ServiceError::MemberNotFound(id.to_string()))
    }

    fn require_manager(&self, manager: &str) -> ServiceResult<()> {
        if self.contains(manager) {
            Ok(())
        } else {
            Err(ServiceError::ManagerNotFound(manager.to_string()))
        }
    }

    fn commit(&mut self, next: Vec<Member>) -> ServiceResult<()> {
        self.store.save(&next)?;
        self.members = next;
        Ok(())
    }
}

fn is_manager_title(title: &str) -> bool {
    let title = title.trim().to_lowercase();
    title == "cd" || title == "acd" || title.contains("creative director")
}
