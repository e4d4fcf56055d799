use std::path::Path;
use tracing::info;

use crate::error::Error;
use crate::validate::FileReport;

/// Export per-(file, root) verdicts as CSV for the operator.
/// Files whose local pass errored get a single `error` row.
pub fn write_csv(path: &Path, reports: &[FileReport]) -> Result<(), Error> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record([
        "local_path",
        "file_size",
        "root_id",
        "status",
        "reused",
        "detail",
    ])?;

    for report in reports {
        let local_path = report.record.local_path.to_string_lossy();
        let size = report.record.size.to_string();

        if let Some(err) = &report.error {
            writer.write_record([
                local_path.as_ref(),
                size.as_str(),
                "",
                "error",
                "false",
                err.as_str(),
            ])?;
            continue;
        }

        for verdict in &report.verdicts {
            writer.write_record([
                local_path.as_ref(),
                size.as_str(),
                verdict.root_id.as_str(),
                verdict.status.as_str(),
                if verdict.reused { "true" } else { "false" },
                verdict.candidate_path.to_string_lossy().as_ref(),
            ])?;
        }
    }

    writer.flush()?;
    info!("Verdict report written to {}", path.display());
    Ok(())
}
