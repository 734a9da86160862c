use crate::config::CorpusConfig;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Discover ingestable documents under `root`: extension allowlist,
/// filename denylist, version-control directories pruned. The result is
/// sorted so runs visit documents in a stable order.
pub fn discover_documents(root: &Path, config: &CorpusConfig) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        anyhow::bail!("Corpus root {:?} is not a directory", root);
    }

    let mut documents = Vec::new();

    let walker = WalkDir::new(root).into_iter().filter_entry(|entry| {
        let name = entry.file_name().to_string_lossy();
        if entry.file_type().is_dir() {
            !config.excluded_dirs.iter().any(|d| d == name.as_ref())
        } else {
            true
        }
    });

    for entry in walker {
        let entry = entry.with_context(|| format!("Failed to walk corpus root {:?}", root))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        if config.excluded_files.iter().any(|f| f == name.as_ref()) {
            continue;
        }

        let has_allowed_extension = entry
            .path()
            .extension()
            .and_then(|e| e.to_str())
            .map(|ext| config.extensions.iter().any(|allowed| allowed == ext))
            .unwrap_or(false);

        if has_allowed_extension {
            documents.push(entry.into_path());
        }
    }

    documents.sort();
    Ok(documents)
}
