//! Output module for exporting harvested staff records
//!
//! This module handles:
//! - Writing records as CSV (`name,role,email`)
//! - Generating timestamped output file names
//! - Reading exported files back

mod csv_output;

pub use csv_output::{export_csv, generate_filename, parse_csv, read_csv, to_csv, write_csv};
