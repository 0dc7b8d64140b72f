//! Interactive prompts with CI/non-interactive fallback

use super::context::UiContext;
use super::output;
use crate::cleanup::{Confirmation, Confirmer, OrphanCandidate};
use crate::conan::InventoryEntry;
use crate::error::{CleanupError, CleanupResult};
use async_trait::async_trait;
use std::io::{self, Write};
use tracing::warn;

const ANSWERS: [(Confirmation, &str, &str); 3] = [
    (Confirmation::No, "No", "keep it"),
    (Confirmation::Yes, "Yes", "remove it"),
    (Confirmation::Abort, "Abort", "keep this and everything after it"),
];

/// Prompt for selection from a list of options
/// Returns the selected value or the first option if non-interactive
pub async fn select<T: Clone + Send + Eq + 'static>(
    ctx: &UiContext,
    message: &str,
    options: &[(T, &str, &str)], // (value, label, hint)
) -> CleanupResult<T> {
    if !ctx.is_interactive() {
        return Ok(options[0].0.clone());
    }

    let message = message.to_string();
    let items: Vec<(T, String, String)> = options
        .iter()
        .map(|(v, l, h)| (v.clone(), l.to_string(), h.to_string()))
        .collect();

    let result: Result<Result<T, std::io::Error>, _> = tokio::task::spawn_blocking(move || {
        let mut select = cliclack::select(&message);
        for (value, label, hint) in items {
            select = select.item(value, label, hint);
        }
        select.interact()
    })
    .await;

    match result {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(CleanupError::Prompt(e.to_string())),
        Err(e) => Err(CleanupError::Prompt(format!("prompt task: {}", e))),
    }
}

/// Line-based three-way prompt for terminals cliclack cannot drive
///
/// Reads one line from stdin; end of input aborts.
pub fn confirm_inline(prompt: &str) -> Confirmation {
    eprint!("  {} [y/N/a] ", prompt);
    if io::stderr().flush().is_err() {
        return Confirmation::Abort;
    }

    let mut input = String::new();
    match io::stdin().read_line(&mut input) {
        Ok(0) | Err(_) => Confirmation::Abort,
        Ok(_) => parse_answer(&input),
    }
}

fn parse_answer(input: &str) -> Confirmation {
    match input.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Confirmation::Yes,
        "a" | "abort" | "q" | "quit" => Confirmation::Abort,
        _ => Confirmation::No,
    }
}

/// Asks the user on the terminal
pub struct PromptConfirmer {
    ctx: UiContext,
}

impl PromptConfirmer {
    pub fn new(ctx: UiContext) -> Self {
        Self { ctx }
    }

    /// A failed or interrupted prompt counts as abort-all
    async fn ask(&self, message: String) -> Confirmation {
        if self.ctx.is_interactive() {
            match select(&self.ctx, &message, &ANSWERS).await {
                Ok(answer) => answer,
                Err(e) => {
                    warn!("{}", e);
                    Confirmation::Abort
                }
            }
        } else {
            tokio::task::spawn_blocking(move || confirm_inline(&message))
                .await
                .unwrap_or(Confirmation::Abort)
        }
    }
}

#[async_trait]
impl Confirmer for PromptConfirmer {
    async fn confirm(&self, candidate: &OrphanCandidate) -> Confirmation {
        let message = match candidate.entry().size {
            Some(size) => format!("Remove {} ({})?", candidate, output::format_size(size)),
            None => format!("Remove {}?", candidate),
        };
        self.ask(message).await
    }

    async fn confirm_prune(&self, recipes: &[InventoryEntry]) -> Confirmation {
        output::section(&self.ctx, "Recipes left without binaries");
        for recipe in recipes {
            output::remark(&self.ctx, &recipe.to_string());
        }
        self.ask(format!("Remove these {} recipe(s)?", recipes.len()))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answers() {
        assert_eq!(parse_answer("y\n"), Confirmation::Yes);
        assert_eq!(parse_answer("YES"), Confirmation::Yes);
        assert_eq!(parse_answer("a"), Confirmation::Abort);
        assert_eq!(parse_answer(" q "), Confirmation::Abort);
        assert_eq!(parse_answer("\n"), Confirmation::No);
        assert_eq!(parse_answer("n"), Confirmation::No);
        assert_eq!(parse_answer("maybe"), Confirmation::No);
    }

    #[tokio::test]
    async fn select_non_interactive_first() {
        let ctx = UiContext::non_interactive();
        let result = select(&ctx, "Remove?", &ANSWERS).await.unwrap();
        assert_eq!(result, Confirmation::No);
    }
}
