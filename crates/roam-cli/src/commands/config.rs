use roam_core::config::{save_config_to_path, DiaryConfig, PermissionAnswer};
use roam_core::location::Coordinates;
use roam_core::{Capability, LocationPolicy};

use crate::cli::{ConfigCommands, ConfigInitArgs, PermissionChoice};
use crate::commands::common::Workspace;
use crate::error::CliError;

pub fn run_config(workspace: &Workspace, command: ConfigCommands) -> Result<(), CliError> {
    match command {
        ConfigCommands::Show => {
            println!("{}", serde_json::to_string_pretty(&workspace.config)?);
        }
        ConfigCommands::Path => println!("{}", workspace.config_path().display()),
        ConfigCommands::Init(args) => {
            let config = apply_init_args(workspace.config.clone(), args)?;
            let path = workspace.config_path();
            save_config_to_path(&config, &path)?;
            println!("Saved configuration to {}", path.display());
        }
    }
    Ok(())
}

/// Merge `config init` flags over the current config.
pub fn apply_init_args(
    mut config: DiaryConfig,
    args: ConfigInitArgs,
) -> Result<DiaryConfig, CliError> {
    if let Some(gallery_dir) = args.gallery_dir {
        config.gallery_dir = Some(gallery_dir);
    }
    if let (Some(latitude), Some(longitude)) = (args.latitude, args.longitude) {
        config.position = Some(Coordinates::new(latitude, longitude)?);
    }
    if let Some(geocoder_url) = args.geocoder_url {
        config.geocoder_url = geocoder_url.trim().to_string();
    }
    if let Some(sample_limit) = args.sample_limit {
        config.sample_limit = sample_limit;
    }
    if let Some(location_timeout) = args.location_timeout {
        config.location_timeout_secs = location_timeout;
    }
    if let Some(label) = args.fallback_label {
        config.location_policy = LocationPolicy::Fallback {
            label: label.trim().to_string(),
        };
    }
    if args.require_location {
        config.location_policy = LocationPolicy::Required;
    }
    if let Some(choice) = args.permissions {
        let answer = match choice {
            PermissionChoice::Granted => PermissionAnswer::Granted,
            PermissionChoice::Denied => PermissionAnswer::Denied,
            PermissionChoice::Prompt => PermissionAnswer::Prompt,
        };
        for capability in Capability::ALL {
            config.permissions.set(capability, answer);
        }
    }

    config.validate()?;
    Ok(config)
}
