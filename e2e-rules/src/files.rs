use std::fmt;

use glob::{MatchOptions, Pattern};
use serde::{Deserialize, Serialize};

/// A file touched by the change under test, as reported by the diff.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChangedFile {
    /// Diff status letter(s) such as `A`, `M`, `D` or `R100`.
    pub status: String,
    pub name: String,
}

impl ChangedFile {
    pub fn new(status: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            name: name.into(),
        }
    }
}

/// Ordered list of changed files. Order follows the diff.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct ChangedFiles(Vec<ChangedFile>);

impl ChangedFiles {
    pub fn new(files: Vec<ChangedFile>) -> Self {
        Self(files)
    }

    pub fn push(&mut self, file: ChangedFile) {
        self.0.push(file);
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChangedFile> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Files whose path contains `filter`.
    pub fn filter_by_dir_string(&self, filter: &str) -> ChangedFiles {
        self.filter(|file| file.name.contains(filter))
    }

    /// Files whose path matches the glob `filter`.
    ///
    /// `**` spans directories while `*` stays within one path segment. An
    /// invalid pattern matches nothing.
    pub fn filter_by_dir_glob(&self, filter: &str) -> ChangedFiles {
        let Ok(pattern) = Pattern::new(filter) else {
            return ChangedFiles::default();
        };
        let options = MatchOptions {
            case_sensitive: true,
            require_literal_separator: true,
            require_literal_leading_dot: false,
        };
        self.filter(|file| pattern.matches_with(&file.name, options))
    }

    /// Files whose status contains `filter`, compared upper-cased.
    pub fn filter_by_status(&self, filter: &str) -> ChangedFiles {
        let filter = filter.to_uppercase();
        self.filter(|file| file.status.contains(&filter))
    }

    fn filter(&self, keep: impl Fn(&ChangedFile) -> bool) -> ChangedFiles {
        ChangedFiles(self.0.iter().filter(|file| keep(file)).cloned().collect())
    }
}

impl From<Vec<ChangedFile>> for ChangedFiles {
    fn from(files: Vec<ChangedFile>) -> Self {
        Self(files)
    }
}

impl FromIterator<ChangedFile> for ChangedFiles {
    fn from_iter<T: IntoIterator<Item = ChangedFile>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a ChangedFiles {
    type Item = &'a ChangedFile;
    type IntoIter = std::slice::Iter<'a, ChangedFile>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for ChangedFiles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.0.iter().map(|file| file.name.as_str()).collect();
        f.write_str(&names.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ChangedFiles {
        ChangedFiles::new(vec![
            ChangedFile::new("M", "tests/build/build.go"),
            ChangedFile::new("A", "tests/release/pipelines/tenant.go"),
            ChangedFile::new("D", "pkg/clients/github/repos.go"),
            ChangedFile::new("M", "magefiles/magefile.go"),
        ])
    }

    #[test]
    fn filters_by_substring() {
        let files = sample().filter_by_dir_string("tests/");
        assert_eq!(
            files.to_string(),
            "tests/build/build.go, tests/release/pipelines/tenant.go"
        );
    }

    #[test]
    fn double_star_crosses_directories() {
        let files = sample().filter_by_dir_glob("tests/**/*.go");
        assert_eq!(files.len(), 2);

        let shallow = sample().filter_by_dir_glob("tests/*.go");
        assert!(shallow.is_empty());
    }

    #[test]
    fn invalid_glob_matches_nothing() {
        assert!(sample().filter_by_dir_glob("tests/[").is_empty());
    }

    #[test]
    fn status_filter_is_upper_cased() {
        let files = sample().filter_by_status("m");
        assert_eq!(files.to_string(), "tests/build/build.go, magefiles/magefile.go");
    }
}
