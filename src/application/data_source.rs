// Data source trait for remote file stores, plus a deferred loader
use crate::domain::canonical_path::CanonicalPath;
use crate::domain::file::File;
use crate::domain::result::FetchResult;
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait DataSource: Send + Sync {
    /// Fetch the file stored at `path`. Failures are returned, never raised.
    async fn get(&self, path: &CanonicalPath) -> FetchResult<File>;
}

/// A file that has been located but not fetched yet.
#[derive(Clone)]
pub struct FileLoader {
    source: Arc<dyn DataSource>,
    canonical_path: CanonicalPath,
}

impl FileLoader {
    pub fn new(source: Arc<dyn DataSource>, canonical_path: CanonicalPath) -> Self {
        Self {
            source,
            canonical_path,
        }
    }

    pub fn canonical_path(&self) -> &CanonicalPath {
        &self.canonical_path
    }

    pub async fn load(&self) -> FetchResult<File> {
        self.source.get(&self.canonical_path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::file::{FileData, FileType};
    use crate::domain::result::FetchError;
    use std::collections::BTreeMap;

    struct SingleFileSource {
        file: File,
    }

    #[async_trait]
    impl DataSource for SingleFileSource {
        async fn get(&self, path: &CanonicalPath) -> FetchResult<File> {
            if path == self.file.canonical_path() {
                FetchResult::Ok(self.file.clone())
            } else {
                FetchResult::Err(FetchError::Status {
                    url: path.to_string(),
                    status: 404,
                    reason: "Not Found".to_string(),
                })
            }
        }
    }

    fn source() -> (Arc<dyn DataSource>, File) {
        let path = CanonicalPath::new("origin", "event", "source", "name");
        let file = File::new(
            FileData::Scalar(11.0),
            FileType::Scalar,
            path,
            BTreeMap::new(),
            "fake",
        )
        .unwrap();
        (Arc::new(SingleFileSource { file: file.clone() }), file)
    }

    #[tokio::test]
    async fn test_file_loader() {
        let (source, file) = source();
        let loader = FileLoader::new(source, file.canonical_path().clone());

        assert_eq!(loader.canonical_path(), file.canonical_path());
        assert_eq!(loader.load().await, FetchResult::Ok(file));
    }

    #[tokio::test]
    async fn test_file_loader_wraps_missing_files() {
        let (source, _) = source();
        let loader = FileLoader::new(source, CanonicalPath::new("origin", "event", "source", "other"));

        let result = loader.load().await;
        assert!(result.is_err());
        assert!(result.unwrap().is_err());
    }
}
