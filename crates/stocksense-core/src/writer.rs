use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::engine::RecommendationReport;
use crate::error::StockSenseError;
use crate::guard;

/// Persist a report as pretty-printed JSON under `output_root`.
///
/// The destination goes through the path guard first; nothing is created
/// when it is rejected. Missing parent directories are created. The report
/// is written to a temporary file in the destination directory and renamed
/// into place, so readers never observe a partial file. On Unix the file is
/// readable and writable by the owner only.
///
/// Returns the resolved destination path.
pub fn write_report(
    report: &RecommendationReport,
    destination: &Path,
    output_root: &Path,
) -> Result<PathBuf, StockSenseError> {
    let resolved = guard::resolve(destination, output_root)?;
    let failure = |reason: String| StockSenseError::WriteFailure {
        path: resolved.clone(),
        reason,
    };

    let parent = resolved
        .parent()
        .ok_or_else(|| failure("destination has no parent directory".into()))?;
    std::fs::create_dir_all(parent).map_err(|e| failure(e.to_string()))?;

    let temp = NamedTempFile::new_in(parent).map_err(|e| failure(e.to_string()))?;
    {
        let mut out = BufWriter::new(temp.as_file());
        serde_json::to_writer_pretty(&mut out, report).map_err(|e| failure(e.to_string()))?;
        out.write_all(b"\n").map_err(|e| failure(e.to_string()))?;
        out.flush().map_err(|e| failure(e.to_string()))?;
    }
    restrict_permissions(temp.as_file()).map_err(|e| failure(e.to_string()))?;
    temp.as_file().sync_all().map_err(|e| failure(e.to_string()))?;
    temp.persist(&resolved)
        .map_err(|e| failure(e.error.to_string()))?;

    tracing::info!(
        path = %resolved.display(),
        expiry_alerts = report.expiry_alerts.len(),
        discounts = report.discount_recommendations.len(),
        restock_orders = report.restock_orders.len(),
        "recommendations saved"
    );
    Ok(resolved)
}

#[cfg(unix)]
fn restrict_permissions(file: &std::fs::File) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(std::fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_file: &std::fs::File) -> std::io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{RestockOrder, RecommendationReport};
    use chrono::NaiveDate;

    fn report(supplier: &str) -> RecommendationReport {
        let mut report = RecommendationReport::empty(
            NaiveDate::from_ymd_opt(2023, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        );
        report.restock_orders.push(RestockOrder {
            medicine: "Item1".into(),
            recommended_qty: 100,
            supplier: supplier.into(),
            estimated_cost: 5000,
        });
        report
    }

    #[test]
    fn writes_pretty_json_and_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("output");
        let path = write_report(&report("Default Supplier"), &root.join("daily/rec.json"), &root)
            .unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\n  \"expiry_alerts\": []"));
        let back: RecommendationReport = serde_json::from_str(&text).unwrap();
        assert_eq!(back, report("Default Supplier"));
    }

    #[cfg(unix)]
    #[test]
    fn file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let path = write_report(&report("A"), &dir.path().join("rec.json"), dir.path()).unwrap();
        let mode = std::fs::metadata(path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn overwrites_existing_report() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("rec.json");
        write_report(&report("First"), &dest, dir.path()).unwrap();
        write_report(&report("Second"), &dest, dir.path()).unwrap();
        let back: RecommendationReport =
            serde_json::from_str(&std::fs::read_to_string(&dest).unwrap()).unwrap();
        assert_eq!(back.restock_orders[0].supplier, "Second");
    }

    #[test]
    fn escape_is_rejected_and_nothing_written() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("output");
        std::fs::create_dir(&root).unwrap();
        let err = write_report(&report("A"), &root.join("../escape.json"), &root).unwrap_err();
        assert!(matches!(err, StockSenseError::PathTraversal { .. }));
        assert!(!dir.path().join("escape.json").exists());
        assert_eq!(std::fs::read_dir(&root).unwrap().count(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn symlink_reached_through_missing_dir_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("output");
        let elsewhere = dir.path().join("elsewhere");
        std::fs::create_dir(&root).unwrap();
        std::fs::create_dir(&elsewhere).unwrap();
        std::os::unix::fs::symlink("../elsewhere", root.join("link")).unwrap();

        let err = write_report(&report("A"), &root.join("nope/../link/stolen.json"), &root)
            .unwrap_err();
        assert!(matches!(err, StockSenseError::PathTraversal { .. }));
        assert!(!elsewhere.join("stolen.json").exists());
        assert!(!root.join("nope").exists());
    }
}
