use anyhow::Result;
use std::{
    fs::File,
    io::Write,
    path::{Path, PathBuf},
};

fn validate_extension(path: &str, allowed: &[&str]) -> Result<()> {
    let pb = PathBuf::from(path);

    let ext = pb
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase());
    match ext.as_deref() {
        Some(e) if allowed.contains(&e) => {}
        _ => anyhow::bail!("File must have a .{} extension: {}", allowed.join(" or ."), path),
    }

    if !pb.exists() {
        anyhow::bail!("File does not exist: {}", path);
    }

    Ok(())
}

pub fn validate_tsv_or_csv_file(path: &str) -> Result<()> {
    validate_extension(path, &["tsv", "csv"])
}

pub fn validate_json_file(path: &str) -> Result<()> {
    validate_extension(path, &["json"])
}

pub fn write_bytes_to_file(path: &str, bytes: &[u8]) -> std::io::Result<()> {
    let path = Path::new(path);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    Ok(())
}
