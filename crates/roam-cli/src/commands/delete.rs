use roam_core::Error;

use crate::commands::common::{entry_preview, Workspace};
use crate::error::CliError;
use crate::permissions::TerminalPrompt;

pub async fn run_delete(
    workspace: &Workspace,
    index: i64,
    yes: bool,
    prompt: &TerminalPrompt,
) -> Result<(), CliError> {
    let index = usize::try_from(index).map_err(|_| CliError::InvalidIndex(index))?;
    let store = workspace.entry_store();

    if !yes {
        let entries = store.load().await?;
        let entry = entries.get(index).ok_or(Error::OutOfRange {
            index,
            len: entries.len(),
        })?;
        let question = format!(
            "Delete entry {index} from {} ({})?",
            entry.location_label(),
            entry_preview(entry.text(), 40)
        );
        match prompt.ask(&question).await? {
            Some(true) => {}
            Some(false) => {
                println!("Cancelled");
                return Ok(());
            }
            None => return Err(CliError::ConfirmationRequired),
        }
    }

    let remaining = store.remove_at(index).await?;
    println!("Deleted entry {index} ({} left)", remaining.len());
    Ok(())
}
