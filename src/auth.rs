use crate::error::{AppError, Result};

const TOKEN_ENV_VARS: [&str; 2] = ["GH_TOKEN", "GITHUB_TOKEN"];
const GH_TOKEN_COMMAND: &str = "gh auth token";

/// Try to run a CLI command and capture stdout as a token
fn try_cli_token(command: &str) -> Option<String> {
    let output = std::process::Command::new("sh")
        .args(["-c", command])
        .output()
        .ok()?;

    if output.status.success() {
        let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if !token.is_empty() {
            return Some(token);
        }
    }
    None
}

fn token_from_env(lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    TOKEN_ENV_VARS
        .iter()
        .filter_map(|&var| lookup(var))
        .map(|token| token.trim().to_string())
        .find(|token| !token.is_empty())
}

/// Looks for a GitHub token in `GH_TOKEN`, `GITHUB_TOKEN`, then the `gh` CLI.
pub fn load_token() -> Result<String> {
    if let Some(token) = token_from_env(|var| std::env::var(var).ok()) {
        return Ok(token);
    }
    if let Some(token) = try_cli_token(GH_TOKEN_COMMAND) {
        tracing::debug!("using token from gh auth token");
        return Ok(token);
    }
    Err(AppError::Auth(
        "no GitHub token found: set GH_TOKEN or GITHUB_TOKEN, or run gh auth login".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gh_token_wins_over_github_token() {
        let token = token_from_env(|var| match var {
            "GH_TOKEN" => Some("gh".to_string()),
            "GITHUB_TOKEN" => Some("github".to_string()),
            _ => None,
        });
        assert_eq!(token.as_deref(), Some("gh"));
    }

    #[test]
    fn blank_values_are_skipped() {
        let token = token_from_env(|var| match var {
            "GH_TOKEN" => Some("  ".to_string()),
            "GITHUB_TOKEN" => Some("github\n".to_string()),
            _ => None,
        });
        assert_eq!(token.as_deref(), Some("github"));
        assert_eq!(token_from_env(|_| None), None);
    }

    #[test]
    fn cli_token_captures_stdout() {
        assert_eq!(try_cli_token("echo ' abc '").as_deref(), Some("abc"));
        assert_eq!(try_cli_token("exit 1"), None);
        assert_eq!(try_cli_token("true"), None);
    }
}
