//! End-to-end scenarios for the resident directory and complaint ledger.
//!
//! Everything here goes through the public service facades and the HTTP router backed by the
//! in-memory store, so referential rules are checked the way a client would observe them.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use civic_complaints::registry::{
    registry_router, ComplaintDraft, ComplaintLedger, ComplaintStatus, InMemoryStore,
    RegistryError, RegistryState, ResidentDirectory, ResidentId,
};

async fn send(
    router: &axum::Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("valid request");

    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("route executes");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    let payload = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, payload)
}

#[tokio::test]
async fn resident_complaint_and_cascade_scenario() {
    let router = registry_router(RegistryState::new(Arc::new(InMemoryStore::default())));

    let (status, resident) = send(
        &router,
        Method::POST,
        "/residents",
        Some(json!({ "name": "Ana", "neighborhood": "Centro" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(resident["complaints"], json!([]));
    let r1 = resident["_id"].as_str().expect("resident id").to_string();

    let (status, complaint) = send(
        &router,
        Method::POST,
        &format!("/residents/{r1}/complaints"),
        Some(json!({ "type": "buraco_rua", "description": "x", "location": "y" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(complaint["resident"], json!(r1));
    let c1 = complaint["_id"].as_str().expect("complaint id").to_string();

    let (status, residents) = send(&router, Method::GET, "/residents", None).await;
    assert_eq!(status, StatusCode::OK);
    let listed = residents
        .as_array()
        .expect("resident array")
        .iter()
        .find(|resident| resident["_id"] == json!(r1))
        .expect("R1 listed");
    let complaint_ids: Vec<&str> = listed["complaints"]
        .as_array()
        .expect("complaint array")
        .iter()
        .filter_map(|complaint| complaint["_id"].as_str())
        .collect();
    assert_eq!(complaint_ids, vec![c1.as_str()]);

    let (status, payload) = send(&router, Method::DELETE, &format!("/residents/{r1}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        payload["message"],
        json!("Morador e suas reclamações foram removidos com sucesso")
    );

    let (status, _) = send(&router, Method::GET, &format!("/complaints/{c1}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn inline_complaints_are_listed_on_the_new_resident() {
    let router = registry_router(RegistryState::new(Arc::new(InMemoryStore::default())));

    let (status, resident) = send(
        &router,
        Method::POST,
        "/residents",
        Some(json!({
            "name": "Bruno",
            "neighborhood": "Vila Nova",
            "complaints": [
                {
                    "type": "vazamento_esgoto",
                    "description": "Esgoto a céu aberto",
                    "location": "Rua C",
                },
                {
                    "type": "lixo_inadequado",
                    "description": "Entulho",
                    "location": "Rua D",
                    "status": "em_andamento",
                },
            ],
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    let complaints = resident["complaints"].as_array().expect("complaint array");
    assert_eq!(complaints.len(), 2);
    assert!(complaints
        .iter()
        .all(|complaint| complaint["resident"] == resident["_id"]));

    let (status, all) = send(&router, Method::GET, "/complaints", None).await;
    assert_eq!(status, StatusCode::OK);
    let all = all.as_array().expect("complaint array");
    assert_eq!(all.len(), 2);
    assert!(all
        .iter()
        .all(|complaint| complaint["resident"]["name"] == json!("Bruno")));
}

#[tokio::test]
async fn services_share_one_store() {
    let store = Arc::new(InMemoryStore::default());
    let ledger = ComplaintLedger::new(store.clone());
    let directory = ResidentDirectory::new(store);

    let filed = directory
        .find_or_create_and_add_complaint(
            Some("Carla".to_string()),
            Some("Jardim".to_string()),
            ComplaintDraft::new("outros", "Calçada quebrada", "Rua E"),
        )
        .await
        .expect("complaint filed");
    let complaint_id = filed.resident.complaints[0].clone();

    let updated = ledger
        .update(
            &complaint_id,
            ComplaintDraft {
                status: Some("resolvido".to_string()),
                ..ComplaintDraft::default()
            },
        )
        .await
        .expect("updated");
    assert_eq!(updated.status, ComplaintStatus::Resolved);
    assert_eq!(updated.description, "Calçada quebrada");

    match ledger
        .create(
            &ResidentId("unknown".to_string()),
            ComplaintDraft::new("outros", "x", "y"),
        )
        .await
    {
        Err(RegistryError::NotFound(_)) => {}
        other => panic!("expected not found, got {other:?}"),
    }
}
