//! Terminal prompts: permission requests and confirmations.

use std::io::IsTerminal;

use async_trait::async_trait;
use roam_core::capability::{PermissionProvider, PermissionStatus};
use roam_core::config::{ConfiguredPermissions, PermissionAnswers};
use roam_core::Capability;
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader, Stdin};
use tokio::sync::Mutex;

/// Yes/no questions on stderr, answered on stdin.
///
/// Questions are asked one at a time. A detached prompt has no terminal
/// and never asks.
pub struct TerminalPrompt {
    stdin: Option<Mutex<BufReader<Stdin>>>,
}

impl TerminalPrompt {
    /// Attach to stdin when it is a terminal.
    pub fn new() -> Self {
        if std::io::stdin().is_terminal() {
            Self {
                stdin: Some(Mutex::new(BufReader::new(io::stdin()))),
            }
        } else {
            Self::detached()
        }
    }

    pub const fn detached() -> Self {
        Self { stdin: None }
    }

    /// Ask `question` with a `[y/N]` suffix. `None` when there is no terminal.
    pub async fn ask(&self, question: &str) -> std::io::Result<Option<bool>> {
        let Some(stdin) = &self.stdin else {
            return Ok(None);
        };

        let mut stdin = stdin.lock().await;
        let mut stderr = io::stderr();
        stderr
            .write_all(format!("{question} [y/N] ").as_bytes())
            .await?;
        stderr.flush().await?;

        let mut line = String::new();
        stdin.read_line(&mut line).await?;
        Ok(Some(parse_answer(&line) == PermissionStatus::Granted))
    }
}

/// Answers from config; asks on the terminal for capabilities set to prompt.
///
/// Without a terminal the configured answers decide alone, and undecided
/// capabilities end up denied.
pub struct TerminalPermissions {
    preset: ConfiguredPermissions,
    prompt: TerminalPrompt,
}

impl TerminalPermissions {
    pub fn new(answers: PermissionAnswers) -> Self {
        Self::with_prompt(answers, TerminalPrompt::new())
    }

    pub const fn with_prompt(answers: PermissionAnswers, prompt: TerminalPrompt) -> Self {
        Self {
            preset: ConfiguredPermissions::new(answers),
            prompt,
        }
    }
}

#[async_trait]
impl PermissionProvider for TerminalPermissions {
    async fn status(&self, capability: Capability) -> roam_core::Result<PermissionStatus> {
        self.preset.status(capability).await
    }

    async fn request(&self, capability: Capability) -> roam_core::Result<PermissionStatus> {
        let question = format!("Allow roam to use your {capability}?");
        match self.prompt.ask(&question).await? {
            Some(true) => Ok(PermissionStatus::Granted),
            Some(false) => Ok(PermissionStatus::Denied),
            None => self.preset.request(capability).await,
        }
    }
}

pub fn parse_answer(line: &str) -> PermissionStatus {
    match line.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => PermissionStatus::Granted,
        _ => PermissionStatus::Denied,
    }
}
