//! Deterministic output file naming.

use std::path::Path;

use crate::error::{ReciboError, Result};
use crate::models::receipt::ReceiptRecord;

/// Collision suffixes run from -1 to -9999; past that the output directory
/// is considered misconfigured.
const MAX_COLLISION_ATTEMPTS: u32 = 10_000;

/// Target file name without collision resolution: `{Provider}-{YY-MM-DD}{.ext}`.
///
/// Pure: never touches the file system, used for dry runs.
pub fn preview_name(record: &ReceiptRecord) -> String {
    format!(
        "{}-{}{}",
        record.provider,
        record.date.format("%y-%m-%d"),
        normalize_extension(&record.extension)
    )
}

/// Target file name resolved against the real output directory. If the
/// candidate exists, numeric suffixes `-1`, `-2`, ... are tried in order.
pub fn build_name(record: &ReceiptRecord, output_dir: &Path) -> Result<String> {
    let extension = normalize_extension(&record.extension);
    let base_name = format!("{}-{}", record.provider, record.date.format("%y-%m-%d"));

    let candidate = format!("{base_name}{extension}");
    if !output_dir.join(&candidate).exists() {
        return Ok(candidate);
    }

    for i in 1..MAX_COLLISION_ATTEMPTS {
        let candidate = format!("{base_name}-{i}{extension}");
        if !output_dir.join(&candidate).exists() {
            return Ok(candidate);
        }
    }

    Err(ReciboError::NameCollision(base_name))
}

fn normalize_extension(ext: &str) -> String {
    if ext.starts_with('.') {
        ext.to_string()
    } else {
        format!(".{ext}")
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    use super::*;

    fn record(provider: &str, y: i32, m: u32, d: u32, ext: &str) -> ReceiptRecord {
        ReceiptRecord {
            provider: provider.to_string(),
            date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            original_name: "IMG_001.jpg".to_string(),
            extension: ext.to_string(),
        }
    }

    #[test]
    fn test_preview_name_format() {
        let r = record("Mercadona", 2026, 2, 15, ".jpg");
        assert_eq!(preview_name(&r), "Mercadona-26-02-15.jpg");
    }

    #[test]
    fn test_preview_name_extension_without_dot() {
        let r = record("Lidl", 2025, 12, 31, "png");
        assert_eq!(preview_name(&r), "Lidl-25-12-31.png");
    }

    #[test]
    fn test_build_no_collision_returns_base_name() {
        let dir = tempfile::tempdir().unwrap();
        let r = record("Carrefour", 2026, 3, 10, ".jpg");

        assert_eq!(build_name(&r, dir.path()).unwrap(), "Carrefour-26-03-10.jpg");
    }

    #[test]
    fn test_build_with_collision_adds_suffix() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Mercadona-26-02-15.jpg"), "dummy").unwrap();

        let r = record("Mercadona", 2026, 2, 15, ".jpg");
        assert_eq!(build_name(&r, dir.path()).unwrap(), "Mercadona-26-02-15-1.jpg");
    }

    #[test]
    fn test_build_multiple_collisions_increments() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Dia-26-01-01.png"), "dummy").unwrap();
        std::fs::write(dir.path().join("Dia-26-01-01-1.png"), "dummy").unwrap();
        std::fs::write(dir.path().join("Dia-26-01-01-2.png"), "dummy").unwrap();

        let r = record("Dia", 2026, 1, 1, ".png");
        assert_eq!(build_name(&r, dir.path()).unwrap(), "Dia-26-01-01-3.png");
    }

    #[test]
    fn test_preview_is_collision_agnostic() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Dia-26-01-01.png"), "dummy").unwrap();

        let r = record("Dia", 2026, 1, 1, ".png");
        assert_eq!(preview_name(&r), "Dia-26-01-01.png");
    }
}
