//! Git publishing.
//!
//! Shells out to the `git` binary rather than linking a libgit2 binding:
//! the pipeline runs where the repository already lives and the operations
//! are four well-trodden commands (config, add, commit, push).

use crate::config::GitConfig;
use crate::error::GitError;
use crate::models::Anniversary;
use std::path::PathBuf;
use tokio::process::Command;
use tracing::{info, instrument, warn};

pub struct GitPublisher<'a> {
    repo_root: PathBuf,
    config: &'a GitConfig,
}

impl<'a> GitPublisher<'a> {
    pub fn new(repo_root: impl Into<PathBuf>, config: &'a GitConfig) -> Self {
        Self {
            repo_root: repo_root.into(),
            config,
        }
    }

    /// Stage `docs/`, commit if anything changed, push when enabled.
    ///
    /// "Nothing to commit" is success; a failed push is an error the
    /// caller reports without retrying.
    #[instrument(level = "info", skip_all)]
    pub async fn commit_and_push(&self, anniversary: &Anniversary) -> Result<(), GitError> {
        self.git(&["config", "user.name", &self.config.user_name])
            .await?;
        self.git(&["config", "user.email", &self.config.user_email])
            .await?;

        self.git(&["add", "docs/"]).await?;
        info!("Staged changes in docs/");

        if !self.has_staged_changes().await? {
            info!("No changes to commit");
            return Ok(());
        }

        let message = commit_message(anniversary);
        self.git(&["commit", "-m", &message]).await?;
        info!("Created commit");

        if self.config.push {
            self.git(&["push", &self.config.remote, &self.config.branch])
                .await?;
            info!(remote = %self.config.remote, branch = %self.config.branch, "Pushed");
        } else {
            info!("Git push disabled in configuration");
        }

        Ok(())
    }

    /// `git diff --cached --quiet` exits 1 when the index differs from HEAD.
    async fn has_staged_changes(&self) -> Result<bool, GitError> {
        let output = Command::new("git")
            .args(["diff", "--cached", "--quiet"])
            .current_dir(&self.repo_root)
            .output()
            .await?;
        Ok(!output.status.success())
    }

    async fn git(&self, args: &[&str]) -> Result<String, GitError> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.repo_root)
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!(command = %args.join(" "), %stderr, "git command failed");
            return Err(GitError::Command {
                command: args.join(" "),
                stderr,
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

fn commit_message(anniversary: &Anniversary) -> String {
    format!(
        "Add web app for {date}\n\n\
         Anniversary: {title}\n\
         Year: {year}\n\
         Category: {category}\n\n\
         Generated automatically by the anniversary pipeline.\n",
        date = anniversary.date.format("%B %-d, %Y"),
        title = anniversary.title,
        year = anniversary.year,
        category = anniversary.category,
    )
}
