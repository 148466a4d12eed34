/// Thin async wrappers over the `git` CLI
use crate::errors::{PipelineError, PipelineResult};
use crate::logger::{self, LogTag};
use std::path::Path;
use tokio::process::Command;

/// Result of [`commit_and_push`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Pushed,
    /// Working tree was clean, nothing committed
    NothingToCommit,
}

/// Run `git <args>` inside `repo`, returning combined stdout/stderr
async fn run_git(repo: &Path, args: &[&str]) -> PipelineResult<String> {
    let command = format!("git {}", args.join(" "));

    let output = Command::new("git")
        .args(args)
        .current_dir(repo)
        .output()
        .await
        .map_err(|e| {
            PipelineError::Publish(format!(
                "{} in {}: failed to start: {}",
                command,
                repo.display(),
                e
            ))
        })?;

    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(&output.stderr));

    if !output.status.success() {
        return Err(PipelineError::Publish(format!(
            "{} in {}: {}\n{}",
            command,
            repo.display(),
            output.status,
            combined.trim_end()
        )));
    }

    logger::debug(LogTag::Publish, &format!("{} ok", command));
    Ok(combined)
}

/// Reset the current branch to its remote, discarding local changes
pub async fn force_pull(repo: &Path) -> PipelineResult<String> {
    run_git(repo, &["fetch", "--all"]).await?;

    let branch = run_git(repo, &["rev-parse", "--abbrev-ref", "HEAD"]).await?;
    let branch = branch.trim().to_string();
    if branch.is_empty() || branch == "HEAD" {
        return Err(PipelineError::Publish(format!(
            "{} is not on a branch",
            repo.display()
        )));
    }

    run_git(repo, &["reset", "--hard", &format!("origin/{}", branch)]).await?;

    logger::info(
        LogTag::Publish,
        &format!("Reset {} to origin/{}", repo.display(), branch),
    );
    Ok(branch)
}

/// Stage everything, commit with `message` and push
pub async fn commit_and_push(repo: &Path, message: &str) -> PipelineResult<CommitOutcome> {
    run_git(repo, &["add", "."]).await?;

    let status = run_git(repo, &["status", "--porcelain"]).await?;
    if status.trim().is_empty() {
        logger::info(LogTag::Publish, "No changes to commit");
        return Ok(CommitOutcome::NothingToCommit);
    }

    run_git(repo, &["commit", "-m", message]).await?;
    run_git(repo, &["push"]).await?;

    Ok(CommitOutcome::Pushed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_repository_is_publish_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("no-such-repo");

        let err = force_pull(&missing).await.unwrap_err();
        match err {
            PipelineError::Publish(message) => assert!(message.contains("git fetch --all")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_commit_outside_repository_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = commit_and_push(&dir.path().join("missing"), "data upload").await;
        assert!(matches!(result, Err(PipelineError::Publish(_))));
    }
}
