//! Member domain model.
//!
//! # Responsibility
//! - Define the canonical person record shown on the chart.
//! - Own the wire shape of the persisted JSON blob.
//! - Normalize and validate user-entered drafts.
//!
//! # Invariants
//! - `id` is stable and never reused for another member.
//! - `reports_to` is the only ownership edge; `paired_with` is decorative.
//! - Blank optional references are normalized to `None` on read.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for one member record.
///
/// Kept as a string because persisted blobs carry short numeric ids
/// next to generated UUIDs.
pub type MemberId = String;

/// Side on which a paired member is drawn next to its primary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PairPosition {
    Left,
    Right,
}

/// Canonical member record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: MemberId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub title: String,
    /// Image reference (URL or `data:` URL). Serialized as `""` when absent.
    #[serde(
        default,
        deserialize_with = "blank_as_none",
        serialize_with = "none_as_blank"
    )]
    pub photo: Option<String>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub links: Vec<String>,
    /// Manager id. Always written (as `null` when absent); its presence marks the
    /// current storage schema.
    #[serde(default, deserialize_with = "blank_as_none")]
    pub reports_to: Option<MemberId>,
    #[serde(
        default,
        deserialize_with = "blank_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub paired_with: Option<MemberId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<PairPosition>,
}

impl Member {
    /// Creates a bare member with the given identity and no relationships.
    pub fn new(id: impl Into<MemberId>, name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            title: title.into(),
            photo: None,
            notes: String::new(),
            links: Vec::new(),
            reports_to: None,
            paired_with: None,
            position: None,
        }
    }

    /// Creates a member from a validated draft with a freshly generated id.
    pub fn from_draft(draft: MemberDraft, reports_to: Option<MemberId>) -> Self {
        let mut member = Self::new(Uuid::new_v4().to_string(), String::new(), String::new());
        member.apply_draft(draft);
        member.reports_to = reports_to;
        member
    }

    /// Builder-style helper for the manager edge.
    pub fn reporting_to(mut self, manager: impl Into<MemberId>) -> Self {
        self.reports_to = Some(manager.into());
        self
    }

    /// Builder-style helper for the decorative pairing edge.
    pub fn paired(mut self, primary: impl Into<MemberId>, position: Option<PairPosition>) -> Self {
        self.paired_with = Some(primary.into());
        self.position = position;
        self
    }

    /// Replaces the editable fields. `id` and relationships are preserved.
    pub fn apply_draft(&mut self, draft: MemberDraft) {
        self.name = draft.name;
        self.title = draft.title;
        self.photo = draft.photo;
        self.notes = draft.notes;
        self.links = draft.links;
    }

    /// Fallback avatar text: first letter of the name, uppercased.
    pub fn initials(&self) -> String {
        match self.name.trim().chars().next() {
            Some(first) => first.to_uppercase().collect(),
            None => "?".to_string(),
        }
    }

    pub fn is_paired(&self) -> bool {
        self.paired_with.is_some()
    }
}

/// Validation failure for user-entered member data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberValidationError {
    /// Name is blank after trim.
    EmptyName,
}

impl Display for MemberValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "please enter a name"),
        }
    }
}

impl Error for MemberValidationError {}

/// Editable member fields as entered in the member form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberDraft {
    pub name: String,
    pub title: String,
    pub photo: Option<String>,
    pub notes: String,
    pub links: Vec<String>,
}

impl MemberDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Trims every field, drops blank links and rejects a blank name.
    pub fn normalized(self) -> Result<Self, MemberValidationError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(MemberValidationError::EmptyName);
        }
        Ok(Self {
            name,
            title: self.title.trim().to_string(),
            photo: self
                .photo
                .map(|photo| photo.trim().to_string())
                .filter(|photo| !photo.is_empty()),
            notes: self.notes.trim().to_string(),
            links: self
                .links
                .into_iter()
                .map(|link| link.trim().to_string())
                .filter(|link| !link.is_empty())
                .collect(),
        })
    }
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|text| !text.trim().is_empty()))
}

fn none_as_blank<S>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(value.as_deref().unwrap_or(""))
}

#[cfg(test)]
mod tests {
    use super::{Member, MemberDraft, MemberValidationError, PairPosition};

    #[test]
    fn wire_shape_uses_camel_case_and_keeps_null_manager() {
        let member = Member::new("1", "Ann", "ECD");
        let json = serde_json::to_value(&member).unwrap();
        assert!(json.get("reportsTo").unwrap().is_null());
        assert_eq!(json.get("photo").unwrap(), "");
        assert!(json.get("pairedWith").is_none());
    }

    #[test]
    fn blank_references_read_as_none() {
        let member: Member = serde_json::from_str(
            r#"{"id":"7","name":"Bo","reportsTo":"","pairedWith":"  ","photo":""}"#,
        )
        .unwrap();
        assert_eq!(member.reports_to, None);
        assert_eq!(member.paired_with, None);
        assert_eq!(member.photo, None);
        assert!(member.links.is_empty());
    }

    #[test]
    fn position_reads_lowercase() {
        let member: Member = serde_json::from_str(
            r#"{"id":"58","name":"Lauren","reportsTo":"1","pairedWith":"3","position":"right"}"#,
        )
        .unwrap();
        assert_eq!(member.position, Some(PairPosition::Right));
        assert!(member.is_paired());
    }

    #[test]
    fn draft_normalization_trims_and_drops_blank_links() {
        let draft = MemberDraft {
            name: "  Cara Ross ".to_string(),
            title: " Editor ".to_string(),
            photo: Some("   ".to_string()),
            notes: String::new(),
            links: vec![" https://a.example ".to_string(), "  ".to_string()],
        }
        .normalized()
        .unwrap();
        assert_eq!(draft.name, "Cara Ross");
        assert_eq!(draft.title, "Editor");
        assert_eq!(draft.photo, None);
        assert_eq!(draft.links, vec!["https://a.example".to_string()]);
    }

    #[test]
    fn draft_with_blank_name_is_rejected() {
        let err = MemberDraft::new("   ").normalized().unwrap_err();
        assert_eq!(err, MemberValidationError::EmptyName);
    }

    #[test]
    fn initials_fall_back_for_blank_names() {
        assert_eq!(Member::new("1", "ann", "").initials(), "A");
        assert_eq!(Member::new("2", " ", "").initials(), "?");
    }

    #[test]
    fn from_draft_generates_distinct_ids() {
        let a = Member::from_draft(MemberDraft::new("A"), None);
        let b = Member::from_draft(MemberDraft::new("B"), Some("1".to_string()));
        assert_ne!(a.id, b.id);
        assert_eq!(b.reports_to.as_deref(), Some("1"));
    }
}
