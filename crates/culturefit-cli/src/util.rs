use anyhow::Result;
use std::{fs::File, io::Write, path::Path};

/// Lower-cased extension of `path`, if any.
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase())
}

/// A dataset path must exist and end in `.csv` or `.tsv`.
pub fn validate_tsv_or_csv_file(path: &str) -> Result<()> {
    let pb = Path::new(path);
    match extension_of(pb).as_deref() {
        Some("tsv") | Some("csv") => {}
        _ => anyhow::bail!("File must have a .tsv or .csv extension: {}", path),
    }
    if !pb.exists() {
        anyhow::bail!("File does not exist: {}", path);
    }
    Ok(())
}

pub fn write_bytes_to_file<P: AsRef<Path>>(path: P, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    Ok(())
}
