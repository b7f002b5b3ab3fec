// File domain model - an atomic unit of stored data addressed by a canonical path
use super::canonical_path::CanonicalPath;
use super::series::UniformSeries;
use crate::error::DataError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The kinds of data a `File` may contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileType {
    TimeSeries,
    Scalar,
    Any,
}

impl FileType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::TimeSeries => "TimeSeries",
            FileType::Scalar => "Scalar",
            FileType::Any => "Any",
        }
    }

    fn admits(&self, data: &FileData) -> bool {
        matches!(
            (self, data),
            (FileType::Any, _)
                | (FileType::TimeSeries, FileData::TimeSeries(_))
                | (FileType::Scalar, FileData::Scalar(_))
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FileData {
    TimeSeries(UniformSeries),
    Scalar(f64),
    Other(serde_json::Value),
}

impl FileData {
    fn kind(&self) -> &'static str {
        match self {
            FileData::TimeSeries(_) => "TimeSeries",
            FileData::Scalar(_) => "Scalar",
            FileData::Other(_) => "untyped",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FileRecord", into = "FileRecord")]
pub struct File {
    data: FileData,
    file_type: FileType,
    canonical_path: CanonicalPath,
    metadata: BTreeMap<String, serde_json::Value>,
    description: String,
}

impl File {
    pub fn new(
        data: FileData,
        file_type: FileType,
        canonical_path: CanonicalPath,
        metadata: BTreeMap<String, serde_json::Value>,
        description: impl Into<String>,
    ) -> Result<Self, DataError> {
        if !file_type.admits(&data) {
            return Err(DataError::FileTypeMismatch {
                declared: file_type.as_str(),
                actual: data.kind(),
            });
        }
        Ok(Self {
            data,
            file_type,
            canonical_path,
            metadata,
            description: description.into(),
        })
    }

    pub fn data(&self) -> &FileData {
        &self.data
    }

    pub fn into_data(self) -> FileData {
        self.data
    }

    pub fn file_type(&self) -> FileType {
        self.file_type
    }

    pub fn canonical_path(&self) -> &CanonicalPath {
        &self.canonical_path
    }

    pub fn metadata(&self) -> &BTreeMap<String, serde_json::Value> {
        &self.metadata
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FileRecord {
    data: FileData,
    file_type: FileType,
    canonical_path: CanonicalPath,
    #[serde(default)]
    metadata: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    description: String,
}

impl TryFrom<FileRecord> for File {
    type Error = DataError;

    fn try_from(record: FileRecord) -> Result<Self, Self::Error> {
        File::new(
            record.data,
            record.file_type,
            record.canonical_path,
            record.metadata,
            record.description,
        )
    }
}

impl From<File> for FileRecord {
    fn from(file: File) -> Self {
        FileRecord {
            data: file.data,
            file_type: file.file_type,
            canonical_path: file.canonical_path,
            metadata: file.metadata,
            description: file.description,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path() -> CanonicalPath {
        CanonicalPath::new("origin", "event", "source", "name")
    }

    fn metadata() -> BTreeMap<String, serde_json::Value> {
        BTreeMap::from([("test".to_string(), json!(true))])
    }

    #[test]
    fn test_file() {
        let data = FileData::Other(json!({"some_data": 10, "another_field": 11}));
        let description = "This is a fake File, if you didn't already know. Oops.";

        let file = File::new(data.clone(), FileType::Any, path(), metadata(), description).unwrap();

        assert_eq!(file.data(), &data);
        assert_eq!(file.file_type(), FileType::Any);
        assert_eq!(file.canonical_path(), &path());
        assert_eq!(file.metadata(), &metadata());
        assert_eq!(file.description(), description);
    }

    #[test]
    fn test_file_type_must_match_data() {
        let err = File::new(FileData::Scalar(1.0), FileType::TimeSeries, path(), metadata(), "")
            .unwrap_err();
        assert_eq!(
            err,
            DataError::FileTypeMismatch {
                declared: "TimeSeries",
                actual: "Scalar"
            }
        );
        assert!(File::new(FileData::Scalar(1.0), FileType::Scalar, path(), metadata(), "").is_ok());
    }

    #[test]
    fn test_file_deserialization_validates() {
        let valid = json!({
            "data": 3.5,
            "file_type": "Scalar",
            "canonical_path": "origin/event/source/name",
        });
        let file: File = serde_json::from_value(valid).unwrap();
        assert_eq!(file.data(), &FileData::Scalar(3.5));
        assert!(file.metadata().is_empty());

        let bad_type = json!({
            "data": 3.5,
            "file_type": "NotAValidFileType",
            "canonical_path": "origin/event/source/name",
        });
        assert!(serde_json::from_value::<File>(bad_type).is_err());

        let bad_path = json!({
            "data": 3.5,
            "file_type": "Scalar",
            "canonical_path": "NotAValidPath",
        });
        assert!(serde_json::from_value::<File>(bad_path).is_err());
    }
}
