use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Store-assigned identifier of a resident record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResidentId(pub String);

/// Store-assigned identifier of a complaint record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComplaintId(pub String);

impl fmt::Display for ResidentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for ComplaintId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Category of a reported issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComplaintType {
    #[serde(rename = "vazamento_agua")]
    WaterLeak,
    #[serde(rename = "vazamento_esgoto")]
    SewageLeak,
    #[serde(rename = "falta_iluminacao")]
    LightingOutage,
    #[serde(rename = "buraco_rua")]
    RoadPothole,
    #[serde(rename = "lixo_inadequado")]
    ImproperWaste,
    #[serde(rename = "outros")]
    Other,
}

impl ComplaintType {
    pub const ALL: [ComplaintType; 6] = [
        ComplaintType::WaterLeak,
        ComplaintType::SewageLeak,
        ComplaintType::LightingOutage,
        ComplaintType::RoadPothole,
        ComplaintType::ImproperWaste,
        ComplaintType::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ComplaintType::WaterLeak => "vazamento_agua",
            ComplaintType::SewageLeak => "vazamento_esgoto",
            ComplaintType::LightingOutage => "falta_iluminacao",
            ComplaintType::RoadPothole => "buraco_rua",
            ComplaintType::ImproperWaste => "lixo_inadequado",
            ComplaintType::Other => "outros",
        }
    }
}

impl FromStr for ComplaintType {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value)
            .ok_or_else(|| UnknownVariant {
                field: "type",
                value: value.to_string(),
            })
    }
}

/// Lifecycle marker of a complaint. Transitions are not guarded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComplaintStatus {
    #[default]
    #[serde(rename = "pendente")]
    Pending,
    #[serde(rename = "em_andamento")]
    InProgress,
    #[serde(rename = "resolvido")]
    Resolved,
}

impl ComplaintStatus {
    pub const ALL: [ComplaintStatus; 3] = [
        ComplaintStatus::Pending,
        ComplaintStatus::InProgress,
        ComplaintStatus::Resolved,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ComplaintStatus::Pending => "pendente",
            ComplaintStatus::InProgress => "em_andamento",
            ComplaintStatus::Resolved => "resolvido",
        }
    }
}

impl FromStr for ComplaintStatus {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == value)
            .ok_or_else(|| UnknownVariant {
                field: "status",
                value: value.to_string(),
            })
    }
}

/// Raised when an enumerated field carries a value outside its allowed set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("`{value}` não é um valor válido para `{field}`")]
pub struct UnknownVariant {
    pub field: &'static str,
    pub value: String,
}

/// Resident record as persisted, with complaint references unresolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resident {
    #[serde(rename = "_id")]
    pub id: ResidentId,
    pub name: String,
    pub neighborhood: String,
    pub complaints: Vec<ComplaintId>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Complaint record as persisted, with the owning resident unresolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Complaint {
    #[serde(rename = "_id")]
    pub id: ComplaintId,
    pub resident: ResidentId,
    #[serde(rename = "type")]
    pub kind: ComplaintType,
    pub description: String,
    pub location: String,
    pub status: ComplaintStatus,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Fields handed to the store when a resident is inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewResident {
    pub name: String,
    pub neighborhood: String,
    pub created_at: DateTime<Utc>,
}

/// Fields handed to the store when a complaint is inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComplaint {
    pub resident: ResidentId,
    pub kind: ComplaintType,
    pub description: String,
    pub location: String,
    pub status: ComplaintStatus,
    pub created_at: DateTime<Utc>,
}

/// Validated partial update. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComplaintChanges {
    pub kind: Option<ComplaintType>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub status: Option<ComplaintStatus>,
}

impl ComplaintChanges {
    pub fn is_empty(&self) -> bool {
        self.kind.is_none()
            && self.description.is_none()
            && self.location.is_none()
            && self.status.is_none()
    }

    pub fn apply(&self, complaint: &mut Complaint) {
        if let Some(kind) = self.kind {
            complaint.kind = kind;
        }
        if let Some(description) = &self.description {
            complaint.description = description.clone();
        }
        if let Some(location) = &self.location {
            complaint.location = location.clone();
        }
        if let Some(status) = self.status {
            complaint.status = status;
        }
    }
}

/// Raw complaint fields as they arrive from a client, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplaintDraft {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl ComplaintDraft {
    pub fn new(kind: &str, description: &str, location: &str) -> Self {
        Self {
            kind: Some(kind.to_string()),
            description: Some(description.to_string()),
            location: Some(location.to_string()),
            status: None,
        }
    }
}

/// Complaint joined with its owning resident at read time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComplaintWithResident {
    #[serde(rename = "_id")]
    pub id: ComplaintId,
    pub resident: Option<Resident>,
    #[serde(rename = "type")]
    pub kind: ComplaintType,
    pub description: String,
    pub location: String,
    pub status: ComplaintStatus,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl ComplaintWithResident {
    pub fn join(complaint: Complaint, resident: Option<Resident>) -> Self {
        Self {
            id: complaint.id,
            resident,
            kind: complaint.kind,
            description: complaint.description,
            location: complaint.location,
            status: complaint.status,
            created_at: complaint.created_at,
        }
    }
}

/// Resident with its reference list resolved to full complaint records.
///
/// References that no longer resolve are dropped from the view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResidentWithComplaints {
    #[serde(rename = "_id")]
    pub id: ResidentId,
    pub name: String,
    pub neighborhood: String,
    pub complaints: Vec<Complaint>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl ResidentWithComplaints {
    pub fn join(resident: Resident, complaints: Vec<Complaint>) -> Self {
        Self {
            id: resident.id,
            name: resident.name,
            neighborhood: resident.neighborhood,
            complaints,
            created_at: resident.created_at,
        }
    }
}
