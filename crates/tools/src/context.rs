//! Context assembler: turns caller-supplied file paths into prompt text.
//!
//! One unreadable, oversized, or malformed entry degrades to a placeholder
//! block for that entry only. The request itself never fails here except
//! when too many files are supplied, which is rejected before any I/O.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use consult_core::error::ValidationError;
use serde_json::Value;
use tokio::io::AsyncReadExt;
use tracing::{debug, warn};

/// Per-file size cap for inclusion in a prompt.
pub const MAX_CONTEXT_FILE_BYTES: u64 = 5 * 1024 * 1024;

const BYTES_PER_MIB: f64 = 1024.0 * 1024.0;

/// A context file entry and its resolved prompt block.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextFile {
    /// The entry exactly as supplied
    pub path: Value,
    pub block: String,
}

pub struct ContextAssembler {
    base_dir: PathBuf,
    max_files: usize,
    max_file_bytes: u64,
}

impl ContextAssembler {
    pub fn new(base_dir: impl Into<PathBuf>, max_files: usize) -> Self {
        Self {
            base_dir: base_dir.into(),
            max_files,
            max_file_bytes: MAX_CONTEXT_FILE_BYTES,
        }
    }

    /// Reject oversized requests. Touches nothing on disk.
    pub fn check_count(&self, count: usize) -> Result<(), ValidationError> {
        if count > self.max_files {
            return Err(ValidationError::TooManyFiles {
                count,
                max: self.max_files,
            });
        }
        Ok(())
    }

    /// Resolve every entry to a block, in input order.
    pub async fn resolve_all(&self, paths: &[Value]) -> Result<Vec<ContextFile>, ValidationError> {
        self.check_count(paths.len())?;

        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            let block = self.resolve(path).await;
            files.push(ContextFile {
                path: path.clone(),
                block,
            });
        }
        Ok(files)
    }

    /// Assemble the file context block, or `None` when no files were given.
    pub async fn assemble(&self, paths: &[Value]) -> Result<Option<String>, ValidationError> {
        let files = self.resolve_all(paths).await?;
        if files.is_empty() {
            return Ok(None);
        }
        Ok(Some(
            files
                .into_iter()
                .map(|f| f.block)
                .collect::<Vec<_>>()
                .join("\n\n"),
        ))
    }

    async fn resolve(&self, entry: &Value) -> String {
        let Some(raw) = entry.as_str() else {
            warn!(entry = %entry, "Context file entry is not a string");
            return placeholder(&entry.to_string(), "(Invalid path type)");
        };

        let resolved = self.base_dir.join(raw);
        let metadata = match tokio::fs::metadata(&resolved).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(path = %raw, "Context file not found");
                return placeholder(raw, "(Not a regular file)");
            }
            Err(e) => {
                warn!(path = %raw, error = %e, "Failed to stat context file");
                return placeholder(raw, "(Error reading file)");
            }
        };

        if !metadata.is_file() {
            warn!(path = %raw, "Context path is not a regular file");
            return placeholder(raw, "(Not a regular file)");
        }

        if metadata.len() > self.max_file_bytes {
            warn!(path = %raw, bytes = metadata.len(), "Context file too large, skipping");
            return self.too_large(raw, metadata.len());
        }

        // The file may grow after the metadata check, so the read is capped too.
        let bytes = match read_capped(&resolved, self.max_file_bytes).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                warn!(path = %raw, "Context file grew past the size cap while reading");
                return self.too_large(raw, self.max_file_bytes + 1);
            }
            Err(e) => {
                warn!(path = %raw, error = %e, "Failed to read context file");
                return placeholder(raw, "(Error reading file)");
            }
        };

        match String::from_utf8(bytes) {
            Ok(content) => {
                debug!(path = %raw, bytes = content.len(), "Context file included");
                format!("{}\n{content}", header(raw))
            }
            Err(e) => {
                warn!(path = %raw, error = %e, "Context file is not valid UTF-8");
                placeholder(raw, "(Error reading file)")
            }
        }
    }

    fn too_large(&self, path: &str, bytes: u64) -> String {
        placeholder(
            path,
            &format!(
                "(File too large: {:.1}MB, max {}MB)",
                bytes as f64 / BYTES_PER_MIB,
                self.max_file_bytes as f64 / BYTES_PER_MIB
            ),
        )
    }
}

/// Read at most `cap` bytes. `None` means the file holds more than that.
async fn read_capped(path: &Path, cap: u64) -> std::io::Result<Option<Vec<u8>>> {
    let file = tokio::fs::File::open(path).await?;
    let mut bytes = Vec::new();
    file.take(cap + 1).read_to_end(&mut bytes).await?;
    if bytes.len() as u64 > cap {
        return Ok(None);
    }
    Ok(Some(bytes))
}

fn header(path: &str) -> String {
    format!("--- File: {path} ---")
}

fn placeholder(path: &str, reason: &str) -> String {
    format!("{} {reason}", header(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn assembler(dir: &std::path::Path) -> ContextAssembler {
        ContextAssembler::new(dir, 20)
    }

    #[tokio::test]
    async fn small_file_is_included_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let body = "fn main() {\n    println!(\"hi\");\n}\n";
        std::fs::write(dir.path().join("main.rs"), body).unwrap();

        let block = assembler(dir.path())
            .assemble(&[json!("main.rs")])
            .await
            .unwrap()
            .unwrap();

        assert_eq!(block, format!("--- File: main.rs ---\n{body}"));
        let (header, content) = block.split_once('\n').unwrap();
        assert_eq!(header, "--- File: main.rs ---");
        assert_eq!(content.as_bytes(), body.as_bytes());
    }

    #[tokio::test]
    async fn absolute_paths_are_kept_in_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.md");
        std::fs::write(&path, "notes").unwrap();
        let raw = path.to_str().unwrap();

        let block = ContextAssembler::new("/nonexistent-base", 20)
            .assemble(&[json!(raw)])
            .await
            .unwrap()
            .unwrap();
        assert_eq!(block, format!("--- File: {raw} ---\nnotes"));
    }

    #[tokio::test]
    async fn too_many_files_rejected_before_io() {
        let paths: Vec<Value> = (0..21).map(|i| json!(format!("missing-{i}.txt"))).collect();
        let err = ContextAssembler::new("/nonexistent-base", 20)
            .assemble(&paths)
            .await
            .unwrap_err();
        assert_eq!(err, ValidationError::TooManyFiles { count: 21, max: 20 });
    }

    #[tokio::test]
    async fn oversized_file_gets_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.bin");
        let file = std::fs::File::create(&path).unwrap();
        file.set_len(6 * 1024 * 1024).unwrap();

        let block = assembler(dir.path())
            .assemble(&[json!("big.bin")])
            .await
            .unwrap()
            .unwrap();
        assert_eq!(block, "--- File: big.bin --- (File too large: 6.0MB, max 5MB)");
    }

    #[tokio::test]
    async fn directory_and_missing_are_not_regular_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();

        let files = assembler(dir.path())
            .resolve_all(&[json!("sub"), json!("nope.txt")])
            .await
            .unwrap();
        assert_eq!(files[0].block, "--- File: sub --- (Not a regular file)");
        assert_eq!(files[1].block, "--- File: nope.txt --- (Not a regular file)");
    }

    #[tokio::test]
    async fn non_string_entries_get_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let files = assembler(dir.path())
            .resolve_all(&[json!(42), json!({"path": "x"})])
            .await
            .unwrap();
        assert_eq!(files[0].block, "--- File: 42 --- (Invalid path type)");
        assert!(files[1].block.ends_with("(Invalid path type)"));
    }

    #[tokio::test]
    async fn unreadable_content_gets_error_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("binary.dat"), [0xff, 0xfe, 0x00, 0x80]).unwrap();

        let block = assembler(dir.path())
            .assemble(&[json!("binary.dat")])
            .await
            .unwrap()
            .unwrap();
        assert_eq!(block, "--- File: binary.dat --- (Error reading file)");
    }

    #[tokio::test]
    async fn blocks_keep_input_order_and_bad_files_do_not_fail_request() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "A").unwrap();
        std::fs::write(dir.path().join("b.txt"), "B").unwrap();

        let block = assembler(dir.path())
            .assemble(&[json!("b.txt"), json!(null), json!("a.txt")])
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            block,
            "--- File: b.txt ---\nB\n\n--- File: null --- (Invalid path type)\n\n--- File: a.txt ---\nA"
        );
    }

    #[tokio::test]
    async fn capped_read_stops_past_the_limit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("growing.log");
        std::fs::write(&path, vec![b'x'; 4096]).unwrap();

        assert!(read_capped(&path, 1024).await.unwrap().is_none());
        assert_eq!(read_capped(&path, 4096).await.unwrap().unwrap().len(), 4096);
    }

    #[tokio::test]
    async fn no_files_yields_none() {
        let block = ContextAssembler::new(".", 20).assemble(&[]).await.unwrap();
        assert!(block.is_none());
    }
}
