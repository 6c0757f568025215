use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::ReportError;
use crate::pdf::write_pdf;
use crate::report::{Report, ReportRow};

/// Delimited text: header `Index,TrialLabel,Outcome`, one record per row.
pub fn write_csv<W: Write>(report: &Report, writer: W) -> Result<(), ReportError> {
    let mut csv = csv::Writer::from_writer(writer);
    for row in report.rows() {
        csv.serialize(row)?;
    }
    csv.flush()?;
    Ok(())
}

/// Reads rows back from [`write_csv`] output.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<ReportRow>, ReportError> {
    let mut csv = csv::Reader::from_reader(reader);
    let mut rows = Vec::new();
    for record in csv.deserialize() {
        rows.push(record?);
    }
    Ok(rows)
}

pub fn write_json<W: Write>(report: &Report, writer: W) -> Result<(), ReportError> {
    serde_json::to_writer_pretty(writer, report)?;
    Ok(())
}

/// Writes `<stem>.csv`, `<stem>.json` and `<stem>.pdf` into `dir`.
pub fn export_all(report: &Report, dir: &Path) -> Result<Vec<PathBuf>, ReportError> {
    fs::create_dir_all(dir)?;
    let stem = report.file_stem();

    let csv_path = dir.join(format!("{stem}.csv"));
    write_csv(report, BufWriter::new(File::create(&csv_path)?))?;

    let json_path = dir.join(format!("{stem}.json"));
    let mut json = BufWriter::new(File::create(&json_path)?);
    write_json(report, &mut json)?;
    json.flush()?;

    let pdf_path = dir.join(format!("{stem}.pdf"));
    write_pdf(report, BufWriter::new(File::create(&pdf_path)?))?;

    let paths = vec![csv_path, json_path, pdf_path];
    for path in &paths {
        info!(path = %path.display(), "results saved");
    }
    Ok(paths)
}
