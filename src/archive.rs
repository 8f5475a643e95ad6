// src/archive.rs

use crate::error::Result;
use glob::glob;
use std::{
    fs::{self, File},
    io,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};
use zip::ZipArchive;

/// Unpack every `.csv` entry of every `*.zip` directly under `data_dir`
/// into `data_dir`, flattening any folders inside the archive. CSVs that
/// already exist are left alone. Returns the paths written.
#[tracing::instrument(level = "info", skip(data_dir), fields(dir = %data_dir.display()))]
pub fn extract_csv_archives(data_dir: &Path) -> Result<Vec<PathBuf>> {
    let pattern = format!("{}/*.zip", data_dir.display());
    let archives: Vec<PathBuf> = match glob(&pattern) {
        Ok(paths) => paths.filter_map(|p| p.ok()).collect(),
        Err(e) => {
            warn!(pattern = %pattern, "bad archive pattern: {}", e);
            return Ok(Vec::new());
        }
    };

    let mut written = Vec::new();
    for zip_path in archives {
        let file = File::open(&zip_path)?;
        let mut archive = ZipArchive::new(file)?;

        for i in 0..archive.len() {
            let mut entry = archive.by_index(i)?;
            if !entry.is_file() || !entry.name().to_lowercase().ends_with(".csv") {
                continue;
            }
            // enclosed_name rejects absolute paths and `..`
            let Some(name) = entry
                .enclosed_name()
                .and_then(|p| p.file_name().map(|n| n.to_owned()))
            else {
                warn!(entry = entry.name(), "skipping unsafe archive entry");
                continue;
            };

            let dest = data_dir.join(&name);
            if dest.exists() {
                debug!(dest = %dest.display(), "already extracted");
                continue;
            }
            // write to a sibling, rename once the entry checks out
            let tmp = data_dir.join(format!("{}.tmp", name.to_string_lossy()));
            let copied = File::create(&tmp).and_then(|mut out| io::copy(&mut entry, &mut out));
            if let Err(e) = copied {
                let _ = fs::remove_file(&tmp);
                return Err(e.into());
            }
            fs::rename(&tmp, &dest)?;
            info!(
                archive = %zip_path.display(),
                dest = %dest.display(),
                "extracted"
            );
            written.push(dest);
        }
    }

    if written.is_empty() {
        debug!("no archives to extract");
    }
    Ok(written)
}

/// Remove archives once their CSVs are in place.
pub fn remove_archives(data_dir: &Path) -> Result<usize> {
    let pattern = format!("{}/*.zip", data_dir.display());
    let mut removed = 0;
    if let Ok(paths) = glob(&pattern) {
        for path in paths.filter_map(|p| p.ok()) {
            fs::remove_file(&path)?;
            removed += 1;
        }
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;
    use zip::write::SimpleFileOptions;

    fn write_zip(path: &Path, entries: &[(&str, &str)]) {
        let file = File::create(path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        for (name, body) in entries {
            zip.start_file(*name, SimpleFileOptions::default()).unwrap();
            zip.write_all(body.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn test_extracts_csv_entries_only() {
        let tmp = tempdir().unwrap();
        write_zip(
            &tmp.path().join("rotten-tomatoes.zip"),
            &[
                ("rotten_tomatoes_movies.csv", "a,b\n1,2\n"),
                ("nested/rotten_tomatoes_critic_reviews.csv", "c\n3\n"),
                ("README.txt", "ignore me"),
            ],
        );

        let mut written = extract_csv_archives(tmp.path()).unwrap();
        written.sort();
        assert_eq!(
            written,
            vec![
                tmp.path().join("rotten_tomatoes_critic_reviews.csv"),
                tmp.path().join("rotten_tomatoes_movies.csv"),
            ]
        );
        assert_eq!(
            fs::read_to_string(tmp.path().join("rotten_tomatoes_movies.csv")).unwrap(),
            "a,b\n1,2\n"
        );
        assert!(!tmp.path().join("README.txt").exists());

        // second pass leaves existing files alone
        assert!(extract_csv_archives(tmp.path()).unwrap().is_empty());
        assert_eq!(remove_archives(tmp.path()).unwrap(), 1);
    }

    #[test]
    fn test_corrupt_entry_leaves_nothing_behind() {
        let tmp = tempdir().unwrap();
        let body = "film,winner\nAmerican Beauty,True\n";
        let zip_path = tmp.path().join("oscars.zip");
        {
            let file = File::create(&zip_path).unwrap();
            let mut zip = zip::ZipWriter::new(file);
            let stored = SimpleFileOptions::default()
                .compression_method(zip::CompressionMethod::Stored);
            zip.start_file("the_oscar_award.csv", stored).unwrap();
            zip.write_all(body.as_bytes()).unwrap();
            zip.finish().unwrap();
        }

        // flip one payload byte so the CRC no longer matches
        let mut bytes = fs::read(&zip_path).unwrap();
        let at = bytes
            .windows(body.len())
            .position(|w| w == body.as_bytes())
            .unwrap()
            + "film,winner\n".len();
        bytes[at] = b'X';
        fs::write(&zip_path, bytes).unwrap();

        assert!(extract_csv_archives(tmp.path()).is_err());
        assert!(!tmp.path().join("the_oscar_award.csv").exists());
        assert!(!tmp.path().join("the_oscar_award.csv.tmp").exists());

        // a second run still refuses the archive instead of trusting a stale file
        assert!(extract_csv_archives(tmp.path()).is_err());
    }

    #[test]
    fn test_no_archives() {
        let tmp = tempdir().unwrap();
        assert!(extract_csv_archives(tmp.path()).unwrap().is_empty());
    }
}
