use std::path::PathBuf;
use std::time::Duration;

use roam_core::camera::ImportCamera;
use roam_core::location::LocationOutcome;
use roam_core::CapturePipeline;

use crate::commands::common::Workspace;
use crate::error::CliError;

/// How long to wait for the saved notification before exiting.
const NOTIFY_GRACE: Duration = Duration::from_secs(2);

pub async fn run_add(
    workspace: &Workspace,
    text: &str,
    photo: Option<PathBuf>,
    pick: Option<usize>,
    skip_location: bool,
) -> Result<(), CliError> {
    let services = workspace.services()?;
    let (mut pipeline, mounted) = services.open_capture().await;

    match (photo, pick) {
        (Some(path), _) => {
            let camera = ImportCamera::new(workspace.media_dir(), Some(path));
            if !pipeline.capture_photo(&camera).await? {
                return Err(CliError::CameraDenied);
            }
        }
        (None, Some(pick)) => {
            let image_ref = pick
                .checked_sub(1)
                .and_then(|index| mounted.gallery.get(index))
                .cloned()
                .ok_or(CliError::NoSuchPhoto {
                    pick,
                    available: mounted.gallery.len(),
                })?;
            pipeline.set_image(image_ref);
        }
        (None, None) => return Err(CliError::NoPhoto),
    }

    pipeline.set_text(text);
    ensure_location(&mut pipeline, &mounted.location, skip_location)?;

    let entry = pipeline.commit().await?;
    if let Some(handle) = pipeline.take_pending_notification() {
        if tokio::time::timeout(NOTIFY_GRACE, handle).await.is_err() {
            tracing::debug!("Saved notification still pending at exit");
        }
    }

    println!(
        "Saved entry from {} ({})",
        entry.location_label(),
        entry.created_at_iso()
    );
    Ok(())
}

fn ensure_location(
    pipeline: &mut CapturePipeline,
    outcome: &LocationOutcome,
    skip_location: bool,
) -> Result<(), CliError> {
    if pipeline.draft().has_location() {
        return Ok(());
    }
    if skip_location && pipeline.accept_missing_location() {
        return Ok(());
    }

    let reason = match outcome {
        LocationOutcome::Unresolved(reason) => reason.to_string(),
        LocationOutcome::Resolved { .. } => "no label".to_string(),
    };
    Err(CliError::LocationUnresolved(reason))
}
