use super::common::*;
use crate::registry::domain::{ComplaintDraft, ComplaintId, ComplaintStatus, ResidentId};
use crate::registry::store::{ComplaintScope, RegistryStore};
use crate::registry::{RegistryError, ResidentDirectory};
use std::collections::HashSet;
use std::sync::Arc;

#[tokio::test]
async fn create_without_complaints_has_empty_list() {
    let (_, directory, _) = build_services();

    let resident = directory
        .create(Some(" Ana ".to_string()), Some("Centro".to_string()), Vec::new())
        .await
        .expect("resident registers");

    assert_eq!(resident.name, "Ana");
    assert_eq!(resident.neighborhood, "Centro");
    assert!(resident.complaints.is_empty());
}

#[tokio::test]
async fn create_requires_name_and_neighborhood() {
    let (_, directory, store) = build_services();

    assert!(matches!(
        directory
            .create(None, Some("Centro".to_string()), Vec::new())
            .await,
        Err(RegistryError::Validation(_))
    ));
    assert!(matches!(
        directory
            .create(Some("Ana".to_string()), Some("   ".to_string()), Vec::new())
            .await,
        Err(RegistryError::Validation(_))
    ));
    assert_eq!(store.resident_count(), 0);
}

#[tokio::test]
async fn create_with_inline_complaints_reads_back_owned_set() {
    let (_, directory, store) = build_services();

    let resident = directory
        .create(
            Some("Ana".to_string()),
            Some("Centro".to_string()),
            vec![pothole(), water_leak()],
        )
        .await
        .expect("resident registers");

    let owned: HashSet<ComplaintId> = store
        .complaints_of(&resident.id)
        .await
        .expect("store readable")
        .into_iter()
        .map(|complaint| complaint.id)
        .collect();
    let listed: HashSet<ComplaintId> = resident
        .complaints
        .iter()
        .map(|complaint| complaint.id.clone())
        .collect();

    assert_eq!(owned.len(), 2);
    assert_eq!(listed, owned);
    assert!(resident
        .complaints
        .iter()
        .all(|complaint| complaint.resident == resident.id));
}

#[tokio::test]
async fn create_keeps_resident_when_inline_complaint_is_invalid() {
    let (_, directory, store) = build_services();

    let result = directory
        .create(
            Some("Ana".to_string()),
            Some("Centro".to_string()),
            vec![pothole(), ComplaintDraft::new("granizo", "x", "y")],
        )
        .await;

    assert!(matches!(result, Err(RegistryError::Validation(_))));
    assert_eq!(store.resident_count(), 1);
    assert_eq!(store.complaint_count(), 0);
}

#[tokio::test]
async fn find_or_create_reuses_resident_for_same_key() {
    let (_, directory, store) = build_services();

    let first = directory
        .find_or_create_and_add_complaint(
            Some("Ana".to_string()),
            Some("Centro".to_string()),
            pothole(),
        )
        .await
        .expect("first filing");
    let second = directory
        .find_or_create_and_add_complaint(
            Some("Ana".to_string()),
            Some("Centro".to_string()),
            water_leak(),
        )
        .await
        .expect("second filing");

    assert_eq!(first.message, "Reclamação adicionada");
    assert_eq!(first.resident.id, second.resident.id);
    assert_eq!(second.resident.complaints.len(), 2);
    assert_eq!(store.resident_count(), 1);
    assert_eq!(store.complaint_count(), 2);
}

#[tokio::test]
async fn find_or_create_distinguishes_neighborhoods() {
    let (_, directory, store) = build_services();

    for neighborhood in ["Centro", "Vila Nova"] {
        directory
            .find_or_create_and_add_complaint(
                Some("Ana".to_string()),
                Some(neighborhood.to_string()),
                pothole(),
            )
            .await
            .expect("filing");
    }

    assert_eq!(store.resident_count(), 2);
}

#[tokio::test]
async fn add_complaint_appends_reference() {
    let (_, directory, _) = build_services();
    let resident = register(&directory, "Ana", "Centro").await;

    let complaint = directory
        .add_complaint(&resident, pothole())
        .await
        .expect("complaint added");

    let residents = directory.list().await.expect("list");
    assert_eq!(residents[0].complaints, vec![complaint]);
}

#[tokio::test]
async fn add_complaint_to_missing_resident_is_not_found() {
    let (_, directory, store) = build_services();

    match directory
        .add_complaint(&ResidentId("res-missing".to_string()), pothole())
        .await
    {
        Err(RegistryError::NotFound(message)) => assert_eq!(message, "Morador não encontrado"),
        other => panic!("expected not found, got {other:?}"),
    }
    assert_eq!(store.complaint_count(), 0);
}

#[tokio::test]
async fn update_complaint_is_scoped_to_owner() {
    let (_, directory, _) = build_services();
    let ana = register(&directory, "Ana", "Centro").await;
    let bruno = register(&directory, "Bruno", "Centro").await;
    let complaint = directory
        .add_complaint(&ana, pothole())
        .await
        .expect("added");

    let draft = ComplaintDraft {
        status: Some("resolvido".to_string()),
        ..ComplaintDraft::default()
    };
    assert!(matches!(
        directory
            .update_complaint(&bruno, &complaint.id, draft.clone())
            .await,
        Err(RegistryError::NotFound(_))
    ));

    let updated = directory
        .update_complaint(&ana, &complaint.id, draft)
        .await
        .expect("owner update");
    assert_eq!(updated.status, ComplaintStatus::Resolved);
    assert_eq!(updated.description, complaint.description);
}

#[tokio::test]
async fn remove_complaint_short_circuits_on_foreign_owner() {
    let (_, directory, store) = build_services();
    let ana = register(&directory, "Ana", "Centro").await;
    let bruno = register(&directory, "Bruno", "Centro").await;
    let complaint = directory
        .add_complaint(&ana, pothole())
        .await
        .expect("added");

    assert!(matches!(
        directory.remove_complaint(&bruno, &complaint.id).await,
        Err(RegistryError::NotFound(_))
    ));
    assert_eq!(store.complaint_count(), 1);

    directory
        .remove_complaint(&ana, &complaint.id)
        .await
        .expect("owner removal");
    let ana_record = store
        .find_resident(&ana)
        .await
        .expect("store readable")
        .expect("resident present");
    assert!(ana_record.complaints.is_empty());
    assert_eq!(store.complaint_count(), 0);
}

#[tokio::test]
async fn delete_cascades_to_complaints() {
    let (ledger, directory, store) = build_services();
    let ana = register(&directory, "Ana", "Centro").await;
    let bruno = register(&directory, "Bruno", "Centro").await;
    let first = directory.add_complaint(&ana, pothole()).await.expect("added");
    let second = directory.add_complaint(&ana, water_leak()).await.expect("added");
    let other = directory.add_complaint(&bruno, pothole()).await.expect("added");

    directory.delete(&ana).await.expect("deleted");

    for id in [&first.id, &second.id] {
        assert!(matches!(ledger.get(id).await, Err(RegistryError::NotFound(_))));
    }
    assert!(ledger.get(&other.id).await.is_ok());
    assert_eq!(store.resident_count(), 1);
}

#[tokio::test]
async fn delete_missing_resident_still_clears_orphans() {
    let (_, directory, store) = build_services();
    let ghost = ResidentId("res-ghost".to_string());
    store
        .insert_complaint(crate::registry::domain::NewComplaint {
            resident: ghost.clone(),
            kind: crate::registry::ComplaintType::Other,
            description: "órfã".to_string(),
            location: "Praça".to_string(),
            status: ComplaintStatus::Pending,
            created_at: chrono::Utc::now(),
        })
        .await
        .expect("orphan inserted");

    assert!(matches!(
        directory.delete(&ghost).await,
        Err(RegistryError::NotFound(_))
    ));
    assert_eq!(store.complaint_count(), 0);
    assert!(store
        .find_complaint(&ComplaintScope::by_id(&ComplaintId("cmp-000001".to_string())))
        .await
        .expect("store readable")
        .is_none());
}

#[tokio::test]
async fn list_resolves_references_in_stored_order() {
    let (_, directory, _) = build_services();
    let ana = register(&directory, "Ana", "Centro").await;
    let first = directory.add_complaint(&ana, water_leak()).await.expect("added");
    let second = directory.add_complaint(&ana, pothole()).await.expect("added");

    let residents = directory.list().await.expect("list");

    assert_eq!(residents.len(), 1);
    assert_eq!(residents[0].complaints, vec![first, second]);
}

#[tokio::test]
async fn store_failures_abort_find_or_create() {
    let directory = ResidentDirectory::new(Arc::new(UnavailableStore));

    assert!(matches!(
        directory
            .find_or_create_and_add_complaint(
                Some("Ana".to_string()),
                Some("Centro".to_string()),
                pothole(),
            )
            .await,
        Err(RegistryError::Store(_))
    ));
}
