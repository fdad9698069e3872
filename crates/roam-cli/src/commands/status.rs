use roam_core::location::LocationOutcome;
use roam_core::Capability;
use serde::Serialize;

use crate::commands::common::Workspace;
use crate::error::CliError;

#[derive(Debug, Serialize)]
struct StatusReport {
    data_dir: String,
    capabilities: Vec<CapabilityItem>,
    location: Option<String>,
    location_issue: Option<String>,
    gallery_photos: usize,
    entries: usize,
}

#[derive(Debug, Serialize)]
struct CapabilityItem {
    capability: &'static str,
    state: &'static str,
}

pub async fn run_status(workspace: &Workspace, as_json: bool) -> Result<(), CliError> {
    let services = workspace.services()?;
    let mounted = services.mount().await;
    let entries = services.store().load().await?;

    let (location, location_issue) = match &mounted.location {
        LocationOutcome::Resolved { label } => (Some(label.clone()), None),
        LocationOutcome::Unresolved(reason) => (None, Some(reason.to_string())),
    };
    let report = StatusReport {
        data_dir: workspace.data_dir.display().to_string(),
        capabilities: Capability::ALL
            .into_iter()
            .map(|capability| CapabilityItem {
                capability: capability.as_str(),
                state: mounted.capabilities.get(capability).as_str(),
            })
            .collect(),
        location,
        location_issue,
        gallery_photos: mounted.gallery.len(),
        entries: entries.len(),
    };

    if as_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Data directory: {}", report.data_dir);
    for item in &report.capabilities {
        println!("{:<14} {}", item.capability, item.state);
    }
    match (&report.location, &report.location_issue) {
        (Some(label), _) => println!("Location:      {label}"),
        (None, Some(issue)) => println!("Location:      unknown ({issue})"),
        (None, None) => println!("Location:      unknown"),
    }
    println!("Gallery:       {} photos", report.gallery_photos);
    println!("Entries:       {}", report.entries);
    Ok(())
}
