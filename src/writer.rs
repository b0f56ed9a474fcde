//! Writing stubs to the output directory.
//!
//! Layout per method: `<root>/<path>/<VERB>/method.json`, plus `request.json`
//! and `response.json` when the method declares (and resolves) those schemas.

use std::path::{Component, Path, PathBuf};
use std::time::{Duration, Instant};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::error::WriteError;
use crate::types::Direction;
use crate::walker::MethodStub;

/// File holding the verbatim method definition.
pub const METHOD_FILE: &str = "method.json";

/// One file written by [`StubWriter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFile {
    /// Path relative to the output root.
    pub path: PathBuf,
    /// Size of the written JSON in bytes.
    pub bytes: usize,
    pub elapsed: Duration,
}

/// Writes method stubs below an output root.
#[derive(Debug, Clone)]
pub struct StubWriter {
    root: PathBuf,
}

impl StubWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Write all artifacts of one method. Sides that failed to resolve are
    /// skipped; the caller decides how to report them.
    ///
    /// # Errors
    ///
    /// Returns `WriteError` if the directory is unsafe or a file can't be written.
    pub fn write(&self, stub: &MethodStub<'_>) -> Result<Vec<WrittenFile>, WriteError> {
        let dir = relative_dir(&stub.dir)?;
        let absolute = self.root.join(&dir);
        std::fs::create_dir_all(&absolute).map_err(|source| WriteError::CreateDir {
            path: absolute.clone(),
            source,
        })?;

        let mut written = vec![self.write_json(&dir.join(METHOD_FILE), &stub.method.raw)?];
        for direction in [Direction::Request, Direction::Response] {
            if let Some(Ok(tree)) = stub.resolved(direction) {
                written.push(self.write_json(&dir.join(direction.file_name()), tree)?);
            }
        }
        Ok(written)
    }

    /// Serialize `value` as pretty JSON to `relative` below the root.
    pub fn write_json<T: Serialize + ?Sized>(
        &self,
        relative: &Path,
        value: &T,
    ) -> Result<WrittenFile, WriteError> {
        let start = Instant::now();
        let path = self.root.join(relative);

        let content = to_pretty_json(value).map_err(|source| WriteError::Serialize {
            path: path.clone(),
            source,
        })?;
        std::fs::write(&path, &content).map_err(|source| WriteError::Write {
            path: path.clone(),
            source,
        })?;

        Ok(WrittenFile {
            path: relative.to_path_buf(),
            bytes: content.len(),
            elapsed: start.elapsed(),
        })
    }
}

/// Pretty-print JSON with four-space indentation.
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    let mut content = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut content, formatter);
    value.serialize(&mut serializer)?;
    Ok(content)
}

/// Turn a method directory into a relative path that stays below the root.
fn relative_dir(dir: &str) -> Result<PathBuf, WriteError> {
    let mut path = PathBuf::new();
    for part in dir.split('/').filter(|part| !part.is_empty()) {
        let mut components = Path::new(part).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(name)), None) => path.push(name),
            _ => {
                return Err(WriteError::UnsafePath {
                    path: dir.to_string(),
                })
            }
        }
    }

    if path.as_os_str().is_empty() {
        return Err(WriteError::UnsafePath {
            path: dir.to_string(),
        });
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Method;
    use crate::error::ResolveError;
    use crate::types::ValueTree;
    use serde_json::json;
    use tempfile::TempDir;

    fn method() -> Method {
        serde_json::from_value(json!({
            "id": "storage.buckets.insert",
            "path": "b",
            "httpMethod": "POST",
            "request": { "$ref": "Bucket" },
            "response": { "$ref": "Bucket" }
        }))
        .unwrap()
    }

    #[test]
    fn pretty_json_uses_four_spaces() {
        let content = to_pretty_json(&json!({"a": ["b"]})).unwrap();
        assert_eq!(
            String::from_utf8(content).unwrap(),
            "{\n    \"a\": [\n        \"b\"\n    ]\n}"
        );
    }

    #[test]
    fn relative_dir_rejects_traversal() {
        assert_eq!(
            relative_dir("b/{bucket}/GET").unwrap(),
            PathBuf::from("b").join("{bucket}").join("GET")
        );
        assert!(matches!(relative_dir("../etc/GET"), Err(WriteError::UnsafePath { .. })));
        assert!(matches!(relative_dir("a/./GET"), Err(WriteError::UnsafePath { .. })));
        assert!(matches!(relative_dir(""), Err(WriteError::UnsafePath { .. })));
    }

    #[test]
    fn writes_method_request_and_response() {
        let dir = TempDir::new().unwrap();
        let writer = StubWriter::new(dir.path());
        let method = method();
        let stub = MethodStub {
            dir: "b/POST".into(),
            name: "insert",
            method: &method,
            request: Some(Ok(ValueTree::Object(vec![(
                "id".into(),
                ValueTree::leaf("<string>"),
            )]))),
            response: Some(Ok(ValueTree::leaf("(hidden: blacklisted)"))),
        };

        let written = writer.write(&stub).unwrap();
        let names: Vec<_> = written
            .iter()
            .map(|f| f.path.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, ["method.json", "request.json", "response.json"]);

        let base = dir.path().join("b").join("POST");
        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(base.join("method.json")).unwrap())
                .unwrap();
        assert_eq!(raw, method.raw);

        let request = std::fs::read_to_string(base.join("request.json")).unwrap();
        assert_eq!(request, "{\n    \"id\": \"<string>\"\n}");
        assert_eq!(written[1].bytes, request.len());
    }

    #[test]
    fn skips_missing_and_failed_sides() {
        let dir = TempDir::new().unwrap();
        let writer = StubWriter::new(dir.path());
        let method = method();
        let stub = MethodStub {
            dir: "b/POST".into(),
            name: "insert",
            method: &method,
            request: None,
            response: Some(Err(ResolveError::DanglingRef {
                name: "Bucket".into(),
            })),
        };

        let written = writer.write(&stub).unwrap();
        assert_eq!(written.len(), 1);
        let base = dir.path().join("b").join("POST");
        assert!(base.join("method.json").exists());
        assert!(!base.join("request.json").exists());
        assert!(!base.join("response.json").exists());
    }
}
