use chrono::Utc;

use crate::commands::common::{entry_to_list_item, format_entry_list, EntryListItem, Workspace};
use crate::error::CliError;

pub async fn run_list(workspace: &Workspace, as_json: bool) -> Result<(), CliError> {
    let entries = workspace.entry_store().load().await?;
    let now = Utc::now();

    if as_json {
        let json_items = entries
            .iter()
            .enumerate()
            .map(|(index, entry)| entry_to_list_item(index, entry, now))
            .collect::<Vec<EntryListItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
    } else {
        for line in format_entry_list(&entries, now) {
            println!("{line}");
        }
    }

    Ok(())
}
