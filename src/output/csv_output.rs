//! CSV export of harvested records
//!
//! Format: UTF-8, header row `name,role,email`, one row per record, empty
//! fields for a missing role or email. Fields are quoted only when their
//! content requires it.

use crate::config::OutputConfig;
use crate::model::StaffMember;
use crate::Result;
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

const HEADER: [&str; 3] = ["name", "role", "email"];

/// Builds a timestamped file name, e.g. `staff_20240131_142501.csv`
pub fn generate_filename(prefix: &str) -> String {
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    format!("{}_{}.csv", prefix, timestamp)
}

/// Writes `staff` as CSV to any writer
pub fn write_csv<W: Write>(staff: &[StaffMember], writer: W) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    writer.write_record(HEADER)?;
    for member in staff {
        writer.write_record([
            member.name.as_str(),
            member.role.as_deref().unwrap_or(""),
            member.email.as_deref().unwrap_or(""),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes `staff` to a CSV file
///
/// # Arguments
///
/// * `staff` - Records to export
/// * `output_dir` - Directory for the file, created if missing
/// * `filename` - File name; a timestamped `staff_*.csv` name when `None`
///
/// # Returns
///
/// Absolute path of the written file
pub fn to_csv(staff: &[StaffMember], output_dir: &Path, filename: Option<&str>) -> Result<PathBuf> {
    write_into(staff, output_dir, filename, "staff")
}

/// Like `to_csv`, taking the directory and name prefix from configuration
pub fn export_csv(
    staff: &[StaffMember],
    config: &OutputConfig,
    filename: Option<&str>,
) -> Result<PathBuf> {
    write_into(
        staff,
        Path::new(&config.output_dir),
        filename,
        &config.filename_prefix,
    )
}

fn write_into(
    staff: &[StaffMember],
    output_dir: &Path,
    filename: Option<&str>,
    prefix: &str,
) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)?;

    let filename = match filename {
        Some(name) => name.to_string(),
        None => generate_filename(prefix),
    };
    let path = output_dir.join(filename);

    let file = fs::File::create(&path)?;
    write_csv(staff, file)?;
    tracing::info!("Wrote {} record(s) to {}", staff.len(), path.display());

    Ok(fs::canonicalize(&path)?)
}

/// Parses CSV written by `write_csv`; empty fields become `None`
pub fn parse_csv<R: Read>(reader: R) -> Result<Vec<StaffMember>> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut staff = Vec::new();

    for record in reader.records() {
        let record = record?;
        let field = |idx: usize| {
            record
                .get(idx)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };
        staff.push(StaffMember {
            name: record.get(0).unwrap_or_default().to_string(),
            role: field(1),
            email: field(2),
        });
    }

    Ok(staff)
}

/// Reads a CSV file written by `to_csv`
pub fn read_csv(path: &Path) -> Result<Vec<StaffMember>> {
    parse_csv(fs::File::open(path)?)
}
