//! Project-relative source locations
//!
//! A location is written like `"/assets/css/"` in config. Either a single
//! location or a list of them may be given for `css`/`js`; both shapes are
//! normalized here into `Vec<Location>` so consumers never branch on shape.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A directory relative to a project folder.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Location(String);

impl Location {
    pub fn new(raw: impl AsRef<str>) -> Self {
        let trimmed = raw
            .as_ref()
            .trim()
            .trim_matches(|c| c == '/' || c == '\\')
            .replace('\\', "/");
        Self(trimmed)
    }

    /// The normalized relative path (no leading/trailing slashes).
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Resolve against a project directory. An empty location is the
    /// project directory itself.
    pub fn resolve(&self, project_dir: &Path) -> PathBuf {
        if self.0.is_empty() {
            project_dir.to_path_buf()
        } else {
            project_dir.join(&self.0)
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("/")
        } else {
            write!(f, "/{}/", self.0)
        }
    }
}

impl From<&str> for Location {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl Serialize for Location {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Location {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::new(raw))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LocationsDe {
    One(String),
    Many(Vec<String>),
}

/// `deserialize_with` helper accepting `"css"` or `["css", "admin/css"]`.
pub(crate) fn deserialize_locations<'de, D>(deserializer: D) -> Result<Vec<Location>, D::Error>
where
    D: Deserializer<'de>,
{
    let locations = match LocationsDe::deserialize(deserializer)? {
        LocationsDe::One(raw) => vec![Location::new(raw)],
        LocationsDe::Many(raws) => raws.into_iter().map(Location::new).collect(),
    };
    Ok(locations)
}
