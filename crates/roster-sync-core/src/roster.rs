//! The authoritative membership roster for a run.

use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::Path;

use crate::error::{Result, SyncError};

/// Set of currently-valid member ids. Ordered so runs are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    members: BTreeSet<String>,
}

/// Starter roster file: an empty list.
pub const TEMPLATE: &str = "# One member id per entry\n[]\n";

/// Accepted on-disk shapes: a bare list, or a mapping with `members:`.
#[derive(Deserialize)]
#[serde(untagged)]
enum RosterFile {
    List(Vec<String>),
    Mapping { members: Vec<String> },
}

impl Roster {
    /// Build a roster from raw ids. Ids are trimmed; blank ids are rejected.
    pub fn from_ids<I, S>(ids: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut members = BTreeSet::new();
        for (i, id) in ids.into_iter().enumerate() {
            let id = id.as_ref().trim();
            if id.is_empty() {
                return Err(SyncError::BlankMemberId(i));
            }
            members.insert(id.to_string());
        }
        Ok(Self { members })
    }

    /// Parse a YAML (or JSON) roster document.
    pub fn parse(data: &str) -> Result<Self> {
        if data.trim().is_empty() {
            return Ok(Self::default());
        }
        let ids = match serde_yaml::from_str::<Option<RosterFile>>(data)? {
            Some(RosterFile::List(ids)) | Some(RosterFile::Mapping { members: ids }) => ids,
            None => Vec::new(),
        };
        Self::from_ids(ids)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Self::parse(&data)
    }

    /// Create `path` holding [`TEMPLATE`] unless a file is already there.
    /// Returns whether the file was created; an existing roster is never touched.
    pub fn write_template(path: &Path) -> Result<bool> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        match OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(mut file) => {
                file.write_all(TEMPLATE.as_bytes())?;
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Refuse an empty roster unless explicitly allowed.
    pub fn ensure_non_empty(&self, allow_empty: bool) -> Result<()> {
        if self.is_empty() && !allow_empty {
            return Err(SyncError::EmptyRoster);
        }
        Ok(())
    }

    pub fn contains(&self, member: &str) -> bool {
        self.members.contains(member)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn template_is_an_empty_roster() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rosters/roster.yaml");

        assert!(Roster::write_template(&path).unwrap());
        assert!(Roster::load(&path).unwrap().is_empty());
    }

    #[test]
    fn template_never_overwrites_a_roster() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("roster.yaml");
        std::fs::write(&path, "- u1\n").unwrap();

        assert!(!Roster::write_template(&path).unwrap());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "- u1\n");
    }

    #[test]
    fn parses_bare_list() {
        let roster = Roster::parse("- u1\n- u2\n").unwrap();
        assert_eq!(roster.len(), 2);
        assert!(roster.contains("u1"));
        assert!(roster.contains("u2"));
        assert!(!roster.contains("u3"));
    }

    #[test]
    fn parses_members_mapping_and_json() {
        let yaml = Roster::parse("members:\n  - a\n  - b\n").unwrap();
        let json = Roster::parse(r#"{"members": ["a", "b"]}"#).unwrap();
        assert_eq!(yaml, json);
    }

    #[test]
    fn trims_and_dedupes() {
        let roster = Roster::from_ids([" u1 ", "u1", "u2"]).unwrap();
        assert_eq!(roster.iter().collect::<Vec<_>>(), vec!["u1", "u2"]);
    }

    #[test]
    fn rejects_blank_ids() {
        let err = Roster::from_ids(["u1", "  "]).unwrap_err();
        assert!(matches!(err, SyncError::BlankMemberId(1)));
    }

    #[test]
    fn empty_document_is_empty_roster() {
        let roster = Roster::parse("").unwrap();
        assert!(roster.is_empty());
        assert!(matches!(
            roster.ensure_non_empty(false),
            Err(SyncError::EmptyRoster)
        ));
        assert!(roster.ensure_non_empty(true).is_ok());
    }

    #[test]
    fn load_reads_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("roster.yaml");
        std::fs::write(&path, "- x\n").unwrap();
        let roster = Roster::load(&path).unwrap();
        assert!(roster.contains("x"));
    }
}
