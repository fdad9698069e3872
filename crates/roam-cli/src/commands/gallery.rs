use roam_core::gallery::PREVIEW_COUNT;
use roam_core::Capability;
use serde::Serialize;

use crate::commands::common::Workspace;
use crate::error::CliError;

#[derive(Debug, Serialize)]
struct GalleryItem {
    pick: usize,
    image: String,
    preview: bool,
}

pub async fn run_gallery(workspace: &Workspace, as_json: bool) -> Result<(), CliError> {
    let services = workspace.services()?;
    let mounted = services.mount().await;

    let items = mounted
        .gallery
        .into_iter()
        .enumerate()
        .map(|(index, image_ref)| GalleryItem {
            pick: index + 1,
            image: image_ref.to_string(),
            preview: index < PREVIEW_COUNT,
        })
        .collect::<Vec<_>>();

    if as_json {
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    if items.is_empty() {
        println!(
            "No gallery photos available (gallery access: {})",
            mounted.capabilities.get(Capability::Gallery)
        );
        return Ok(());
    }

    for item in &items {
        let marker = if item.preview { "*" } else { " " };
        println!("{:>3}{marker} {}", item.pick, item.image);
    }
    Ok(())
}
