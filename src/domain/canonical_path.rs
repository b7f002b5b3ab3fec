// Canonical path - structured address of an artifact in the remote file store
use crate::error::DataError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

pub const SEPARATOR: char = '/';

/// Address of a stored artifact, composed as `origin/event/source/name`.
///
/// * `origin` identifies the code that produced the data, usually a pipeline version.
/// * `event` names the event the data belongs to.
/// * `source` is the stage that produced the data.
/// * `name` is the leaf identifier.
///
/// Components are not escaped: a component containing `/` composes to a path
/// that no longer decomposes back into the same four parts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CanonicalPath {
    origin: String,
    event: String,
    source: String,
    name: String,
}

impl CanonicalPath {
    pub fn new(
        origin: impl Into<String>,
        event: impl Into<String>,
        source: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            origin: origin.into(),
            event: event.into(),
            source: source.into(),
            name: name.into(),
        }
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn event(&self) -> &str {
        &self.event
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Join the four components with `/`.
    pub fn compose(origin: &str, event: &str, source: &str, name: &str) -> String {
        [origin, event, source, name].join("/")
    }

    /// Split a composed path on `/`.
    ///
    /// The result only has four elements when `path` has exactly three
    /// separators; checking that is left to the caller.
    pub fn decompose(path: &str) -> Vec<String> {
        path.split(SEPARATOR).map(str::to_string).collect()
    }

    /// The components in composition order.
    pub fn unwrap(&self) -> Vec<String> {
        vec![
            self.origin.clone(),
            self.event.clone(),
            self.source.clone(),
            self.name.clone(),
        ]
    }

    pub fn to_path(&self) -> PathBuf {
        [&self.origin, &self.event, &self.source, &self.name]
            .iter()
            .collect()
    }
}

impl fmt::Display for CanonicalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&Self::compose(
            &self.origin,
            &self.event,
            &self.source,
            &self.name,
        ))
    }
}

impl FromStr for CanonicalPath {
    type Err = DataError;

    fn from_str(path: &str) -> Result<Self, Self::Err> {
        match Self::decompose(path).as_slice() {
            [origin, event, source, name] => Ok(Self::new(
                origin.as_str(),
                event.as_str(),
                source.as_str(),
                name.as_str(),
            )),
            _ => Err(DataError::MalformedCanonicalPath(path.to_string())),
        }
    }
}

impl TryFrom<String> for CanonicalPath {
    type Error = DataError;

    fn try_from(path: String) -> Result<Self, Self::Error> {
        path.parse()
    }
}

impl From<CanonicalPath> for String {
    fn from(path: CanonicalPath) -> Self {
        path.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_path() {
        let path = CanonicalPath::new("origin", "event", "source", "name");

        assert_eq!(path.to_string(), "origin/event/source/name");
        assert_eq!(
            path.to_path(),
            PathBuf::from("origin").join("event").join("source").join("name")
        );

        assert_eq!(path.origin(), "origin");
        assert_eq!(path.event(), "event");
        assert_eq!(path.source(), "source");
        assert_eq!(path.name(), "name");

        assert_eq!(path.unwrap(), vec!["origin", "event", "source", "name"]);
        assert_eq!(CanonicalPath::decompose(&path.to_string()), path.unwrap());
    }

    #[test]
    fn test_compose_decompose_round_trip() {
        let cases = [
            ("pipeline_2024_11_01", "FSGP_2024_Day_1", "ingest", "TotalPackVoltage"),
            ("v1", "", "stage", "leaf"),
            ("a b", "c.d", "e-f", "g_h"),
        ];
        for (origin, event, source, name) in cases {
            let composed = CanonicalPath::compose(origin, event, source, name);
            assert_eq!(
                CanonicalPath::decompose(&composed),
                vec![origin, event, source, name]
            );
        }
    }

    #[test]
    fn test_embedded_separator_breaks_arity() {
        let composed = CanonicalPath::compose("origin", "event", "raw/ingest", "name");
        assert_eq!(CanonicalPath::decompose(&composed).len(), 5);
        assert_eq!(
            composed.parse::<CanonicalPath>(),
            Err(DataError::MalformedCanonicalPath(composed.clone()))
        );
    }

    #[test]
    fn test_checked_parse() {
        let path: CanonicalPath = "origin/event/source/name".parse().unwrap();
        assert_eq!(path, CanonicalPath::new("origin", "event", "source", "name"));
        assert!("origin/source/name".parse::<CanonicalPath>().is_err());
    }

    #[test]
    fn test_serde_as_string() {
        let path = CanonicalPath::new("origin", "event", "source", "name");
        let json = serde_json::to_string(&path).unwrap();
        assert_eq!(json, r#""origin/event/source/name""#);
        assert_eq!(serde_json::from_str::<CanonicalPath>(&json).unwrap(), path);
        assert!(serde_json::from_str::<CanonicalPath>(r#""too/short""#).is_err());
    }
}
