use async_trait::async_trait;

/// Blocking yes/no decision required before a rerun discards existing
/// recommendations.
#[async_trait]
pub trait ConfirmRerun: Send + Sync {
    async fn confirm(&self, prompt: &str) -> bool;
}

/// Grants every confirmation. Useful for scripted flows and tests.
pub struct AlwaysConfirm;

#[async_trait]
impl ConfirmRerun for AlwaysConfirm {
    async fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

/// Interactive y/N prompt on the terminal.
pub struct StdinConfirm;

#[async_trait]
impl ConfirmRerun for StdinConfirm {
    async fn confirm(&self, prompt: &str) -> bool {
        let prompt = prompt.to_string();
        tokio::task::spawn_blocking(move || {
            use std::io::Write;

            print!("{} [y/N] ", prompt);
            let _ = std::io::stdout().flush();

            let mut line = String::new();
            if std::io::stdin().read_line(&mut line).is_err() {
                return false;
            }
            matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes")
        })
        .await
        .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_always_confirm() {
        assert!(AlwaysConfirm.confirm("sure?").await);
    }
}
