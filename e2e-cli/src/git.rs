use std::process::Command;

use anyhow::{bail, Context};
use e2e_rules::{ChangedFile, ChangedFiles};

/// Lists files changed between `base` and the working tree.
pub fn changed_files(base: &str) -> anyhow::Result<ChangedFiles> {
    let output = Command::new("git")
        .args(["diff", "--name-status", base])
        .output()
        .context("failed to run git diff")?;

    if !output.status.success() {
        bail!(
            "git diff against {base} failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    Ok(parse_name_status(&String::from_utf8_lossy(&output.stdout)))
}

/// Parses `git diff --name-status` output, keeping the new name of renames.
pub fn parse_name_status(raw: &str) -> ChangedFiles {
    raw.lines()
        .filter_map(|line| {
            let mut fields = line.split('\t');
            let status = fields.next()?.trim();
            let name = fields.last()?.trim();
            if status.is_empty() || name.is_empty() {
                return None;
            }
            Some(ChangedFile::new(status, name))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_statuses_and_renames() {
        let files = parse_name_status(
            "M\tpkg/clients/tekton/pipelines.go\nR100\ttests/old.go\ttests/new.go\n\nA\tmagefiles/rules.go\n",
        );
        assert_eq!(
            files.to_string(),
            "pkg/clients/tekton/pipelines.go, tests/new.go, magefiles/rules.go"
        );
        assert_eq!(files.filter_by_status("r").len(), 1);
    }
}
