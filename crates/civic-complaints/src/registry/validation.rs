use chrono::{DateTime, Utc};

use super::domain::{
    ComplaintChanges, ComplaintDraft, ComplaintStatus, ComplaintType, NewComplaint, ResidentId,
};
use super::error::RegistryError;

/// Trim a required text field, rejecting missing or blank values.
pub(crate) fn required_text(field: &str, value: Option<String>) -> Result<String, RegistryError> {
    match value.as_deref().map(str::trim) {
        Some(trimmed) if !trimmed.is_empty() => Ok(trimmed.to_string()),
        _ => Err(RegistryError::Validation(format!("O campo `{field}` é obrigatório"))),
    }
}

/// Trim an optional text field, rejecting values that are present but blank.
fn optional_text(field: &str, value: Option<String>) -> Result<Option<String>, RegistryError> {
    value.map(|raw| required_text(field, Some(raw))).transpose()
}

/// Turn a client draft into a storable complaint owned by `resident`.
///
/// A supplied status is honored; otherwise the complaint starts as pending.
pub(crate) fn new_complaint(
    resident: &ResidentId,
    draft: ComplaintDraft,
    created_at: DateTime<Utc>,
) -> Result<NewComplaint, RegistryError> {
    let kind = required_text("type", draft.kind)?.parse::<ComplaintType>()?;
    let description = required_text("description", draft.description)?;
    let location = required_text("location", draft.location)?;
    let status = match draft.status {
        Some(raw) => raw.trim().parse::<ComplaintStatus>()?,
        None => ComplaintStatus::Pending,
    };

    Ok(NewComplaint {
        resident: resident.clone(),
        kind,
        description,
        location,
        status,
        created_at,
    })
}

/// Turn a partial client draft into the set of fields to overwrite.
pub(crate) fn complaint_changes(draft: ComplaintDraft) -> Result<ComplaintChanges, RegistryError> {
    let kind = optional_text("type", draft.kind)?
        .map(|raw| raw.parse::<ComplaintType>())
        .transpose()?;
    let status = optional_text("status", draft.status)?
        .map(|raw| raw.parse::<ComplaintStatus>())
        .transpose()?;

    Ok(ComplaintChanges {
        kind,
        description: optional_text("description", draft.description)?,
        location: optional_text("location", draft.location)?,
        status,
    })
}
