use chrono::SecondsFormat;
use civic_complaints::error::AppError;
use civic_complaints::registry::{
    ComplaintDraft, ComplaintLedger, ComplaintType, InMemoryStore, RegistryError,
    ResidentDirectory,
};
use clap::Args;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Resident name used for the walkthrough
    #[arg(long, default_value = "Ana")]
    pub(crate) name: String,
    /// Neighborhood the resident lives in
    #[arg(long, default_value = "Centro")]
    pub(crate) neighborhood: String,
    /// Complaint category to file (one of the registry's type codes)
    #[arg(long = "type", default_value = "buraco_rua")]
    pub(crate) kind: String,
    /// Free-text description of the problem
    #[arg(long, default_value = "Buraco grande na pista")]
    pub(crate) description: String,
    /// Where the problem is
    #[arg(long, default_value = "Rua das Flores, 120")]
    pub(crate) location: String,
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        name,
        neighborhood,
        kind,
        description,
        location,
    } = args;

    let store = Arc::new(InMemoryStore::default());
    let directory = ResidentDirectory::new(store.clone());
    let ledger = ComplaintLedger::new(store.clone());

    println!("Complaint registry demo (in-memory store)");
    println!(
        "Known complaint types: {}",
        ComplaintType::ALL
            .iter()
            .map(|kind| kind.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    let resident = directory
        .create(Some(name), Some(neighborhood), Vec::new())
        .await?;
    println!(
        "\nRegistered {} ({}) as {} at {}",
        resident.name,
        resident.neighborhood,
        resident.id,
        resident
            .created_at
            .to_rfc3339_opts(SecondsFormat::Secs, true)
    );

    let complaint = directory
        .add_complaint(
            &resident.id,
            ComplaintDraft::new(&kind, &description, &location),
        )
        .await?;
    println!(
        "Filed complaint {} [{}] status={} at {}",
        complaint.id,
        complaint.kind.as_str(),
        complaint.status.as_str(),
        complaint.location
    );

    println!("\nResidents");
    for entry in directory.list().await? {
        println!(
            "- {} / {}: {} complaint(s)",
            entry.name,
            entry.neighborhood,
            entry.complaints.len()
        );
        for filed in &entry.complaints {
            println!("    {} {} {}", filed.id, filed.kind.as_str(), filed.description);
        }
    }

    directory.delete(&resident.id).await?;
    println!("\nDeleted resident {} and their complaints", resident.id);

    match ledger.get(&complaint.id).await {
        Err(RegistryError::NotFound(message)) => {
            println!("Lookup of {} after cascade: {}", complaint.id, message)
        }
        Ok(_) => println!("Complaint {} unexpectedly survived the cascade", complaint.id),
        Err(err) => return Err(err.into()),
    }

    println!(
        "Store now holds {} resident(s) and {} complaint(s)",
        store.resident_count(),
        store.complaint_count()
    );
    Ok(())
}
