use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::diagnosis::DiagnosticTest;

/// Read-only set of loaded test definitions, shared by every session.
#[derive(Debug, Clone, Default)]
pub struct TestCatalog {
    tests: Vec<Arc<DiagnosticTest>>,
}

impl TestCatalog {
    pub fn new(tests: Vec<DiagnosticTest>) -> Self {
        Self {
            tests: tests.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_reader(BufReader::new(file))?;
        info!(path = %path.display(), tests = catalog.len(), "loaded test catalog");
        Ok(catalog)
    }

    /// Parses a JSON array of test definitions.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let tests: Vec<DiagnosticTest> = serde_json::from_reader(reader)?;
        if tests.is_empty() {
            return Err(CatalogError::Empty);
        }
        Ok(Self::new(tests))
    }

    pub fn len(&self) -> usize {
        self.tests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }

    pub fn tests(&self) -> &[Arc<DiagnosticTest>] {
        &self.tests
    }

    pub fn find_by_name(&self, name: &str) -> Option<Arc<DiagnosticTest>> {
        self.tests.iter().find(|test| test.name() == name).cloned()
    }

    /// Matches the first whitespace-separated token of a message against the
    /// test commands, ignoring case.
    pub fn find_by_command(&self, message: &str) -> Option<Arc<DiagnosticTest>> {
        let token = message.split_whitespace().next()?.to_lowercase();
        self.tests
            .iter()
            .find(|test| test.command() == token)
            .cloned()
    }

    /// Lookup used by stateless callers that may pass either form.
    pub fn resolve(&self, name_or_command: &str) -> Option<Arc<DiagnosticTest>> {
        self.find_by_name(name_or_command)
            .or_else(|| self.find_by_command(name_or_command))
    }

    pub fn summaries(&self) -> Vec<TestSummary> {
        self.tests
            .iter()
            .map(|test| TestSummary {
                name: test.name().to_string(),
                command: test.command(),
                questions: test.questions().len(),
            })
            .collect()
    }
}

/// Listing entry for a loaded test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestSummary {
    pub name: String,
    pub command: String,
    pub questions: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("unable to read test catalog {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("test catalog is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("test catalog contains no tests")]
    Empty,
}
