//! Bulk upload command

use crate::config::Config;
use crate::credentials::KeyringCredentials;
use crate::error::{Result, VeridocError};
use crate::upload::{UploadEvent, UploadFile, UploadPipeline};

use colored::Colorize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Upload files and directories, printing live per-file progress.
pub async fn run_upload(
    config: Config,
    paths: Vec<PathBuf>,
    content_type: Option<String>,
) -> Result<()> {
    let files = collect_files(&paths, content_type.as_deref())?;
    if files.is_empty() {
        return Err(VeridocError::Api("No uploadable files found".to_string()).into());
    }

    println!("Uploading {} file(s)", files.len());

    let pipeline = UploadPipeline::new(&config, Arc::new(KeyringCredentials::new()))?;

    // Print a progress line whenever a file crosses a 10% boundary, plus
    // its terminal state.
    let milestones: Mutex<HashMap<String, u32>> = Mutex::new(HashMap::new());
    let observer = Arc::new(move |event: UploadEvent| match &event {
        UploadEvent::Started { file_name } => {
            println!("  {} {}", "->".cyan(), file_name);
        }
        UploadEvent::Progress { file_name, percent } => {
            let decile = (*percent / 10.0) as u32;
            let mut seen = match milestones.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            let last = seen.entry(file_name.clone()).or_insert(0);
            if decile > *last {
                *last = decile;
                println!("     {} {:>3.0}%", file_name, percent);
            }
        }
        UploadEvent::Completed { file_name, file_id } => {
            println!(
                "  {} {} ({})",
                "ok".green(),
                file_name,
                file_id
            );
        }
        UploadEvent::Failed { file_name, error } => {
            println!("  {} {}: {}", "fail".red(), file_name, error);
        }
    });

    let result = pipeline.run_batch(&files, observer).await?;

    println!();
    println!(
        "{} uploaded, {} failed",
        result.successful.len().to_string().green(),
        result.failed.len().to_string().red()
    );
    for failure in &result.failed {
        eprintln!("{}", format!("  {}: {}", failure.file_name, failure.error).red());
    }

    Ok(())
}

/// Expand the given paths into upload files.
///
/// Directories are walked with the `ignore` crate, so VCS-ignored files are
/// skipped the same way the platform's folder picker skips them.
fn collect_files(paths: &[PathBuf], content_type: Option<&str>) -> Result<Vec<UploadFile>> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_dir() {
            for entry in ignore::Walk::new(path).flatten() {
                if entry.path().is_file() {
                    files.push(load_file(entry.path(), content_type)?);
                }
            }
        } else if path.is_file() {
            files.push(load_file(path, content_type)?);
        } else {
            return Err(
                VeridocError::Api(format!("No such file or directory: {}", path.display())).into(),
            );
        }
    }

    Ok(files)
}

fn load_file(path: &Path, content_type: Option<&str>) -> Result<UploadFile> {
    let mut file = UploadFile::from_path(path)?;
    if let Some(forced) = content_type {
        file.content_type = forced.to_string();
    }
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_files_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.pdf"), b"%PDF").unwrap();
        std::fs::write(dir.path().join("b.txt"), b"text").unwrap();

        let files = collect_files(&[dir.path().to_path_buf()], None).unwrap();
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn test_collect_files_forced_content_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blob.xyz");
        std::fs::write(&path, b"data").unwrap();

        let files = collect_files(&[path], Some("application/pdf")).unwrap();
        assert_eq!(files[0].content_type, "application/pdf");
    }

    #[test]
    fn test_collect_files_missing_path_errors() {
        let result = collect_files(&[PathBuf::from("/definitely/not/here")], None);
        assert!(result.is_err());
    }
}
