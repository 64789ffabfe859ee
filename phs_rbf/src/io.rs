/////////////////////////////////////////////////////////////////////////////////////////////
//
// Reads and writes value arrays, scattered XYZ tables, and interpolation settings files.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # io
//!
//! File helpers for the interpolation workflow.
//!
//! - Array files hold one floating-point value per line.
//! - Scattered tables are three-column CSV files of `X,Y,Value`.
//! - Settings files are versioned JSON envelopes holding an
//!   [`InterpolationSettings`] and its [`Params`].

use crate::{config::Params, error::DataIOError, interpolant_config::InterpolationSettings};

use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    path::Path,
};

type DataIOResult<T> = std::result::Result<T, DataIOError>;

/// Reads an array file with one value per line.
///
/// Surrounding whitespace is ignored and blank lines are skipped, so an empty
/// file gives an empty vector.
///
/// ### Errors
/// - [`DataIOError::Open`] or [`DataIOError::Read`] on I/O failures.
/// - [`DataIOError::ParseValue`] with the 1-based line number of a bad value.
pub fn load_array<P: AsRef<Path>>(path: P) -> DataIOResult<Vec<f64>> {
    let path_ref = path.as_ref();
    let file = File::open(path_ref).map_err(|e| DataIOError::Open {
        path: path_ref.to_path_buf(),
        source: e,
    })?;

    let mut values = Vec::new();
    for (i, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|e| DataIOError::Read {
            path: path_ref.to_path_buf(),
            source: e,
        })?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let value = trimmed
            .parse::<f64>()
            .map_err(|e| DataIOError::ParseValue {
                path: path_ref.to_path_buf(),
                line: i + 1,
                source: e,
            })?;
        values.push(value);
    }
    Ok(values)
}

/// Writes one value per line, right-aligned in a 17 character field with 14 decimals.
///
/// ### Example
/// ```no_run
/// phs_rbf::save_array("fe.dat", &[0.5, -1.25])?;
/// # Ok::<(), phs_rbf::DataIOError>(())
/// ```
pub fn save_array<P: AsRef<Path>>(path: P, values: &[f64]) -> DataIOResult<()> {
    let path_ref = path.as_ref();
    let file = File::create(path_ref).map_err(|e| DataIOError::Create {
        path: path_ref.to_path_buf(),
        source: e,
    })?;
    let mut w = BufWriter::new(file);

    for v in values {
        writeln!(w, "{:17.14}", v).map_err(|e| DataIOError::Write {
            path: path_ref.to_path_buf(),
            source: e,
        })?;
    }

    w.flush().map_err(|e| DataIOError::Flush {
        path: path_ref.to_path_buf(),
        source: e,
    })
}

/// Reads a three-column `X,Y,Value` CSV file into separate columns.
///
/// ### Errors
/// - [`DataIOError::Open`] and [`DataIOError::Csv`] from the reader.
/// - [`DataIOError::InconsistentColumns`] when a record does not have three fields.
/// - [`DataIOError::ParseValue`] when a field is not a number.
pub fn read_scattered_csv<P: AsRef<Path>>(
    path: P,
    has_headers: bool,
) -> DataIOResult<(Vec<f64>, Vec<f64>, Vec<f64>)> {
    let path_ref = path.as_ref();
    let file = File::open(path_ref).map_err(|e| DataIOError::Open {
        path: path_ref.to_path_buf(),
        source: e,
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(has_headers)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(BufReader::new(file));

    let (mut x, mut y, mut f) = (Vec::new(), Vec::new(), Vec::new());

    for (i, record) in reader.records().enumerate() {
        let record = record.map_err(|e| DataIOError::Csv {
            path: path_ref.to_path_buf(),
            source: e,
        })?;

        if record.len() != 3 {
            return Err(DataIOError::InconsistentColumns {
                path: path_ref.to_path_buf(),
                record: i,
                expected: 3,
                found: record.len(),
            });
        }

        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(i + 1);

        let mut fields = [0.0; 3];
        for (slot, field) in fields.iter_mut().zip(record.iter()) {
            *slot = field.parse::<f64>().map_err(|e| DataIOError::ParseValue {
                path: path_ref.to_path_buf(),
                line,
                source: e,
            })?;
        }

        x.push(fields[0]);
        y.push(fields[1]);
        f.push(fields[2]);
    }

    Ok((x, y, f))
}

/// Writes columns as an `X,Y,Value` CSV file with a header row.
pub fn write_scattered_csv<P: AsRef<Path>>(
    path: P,
    x: &[f64],
    y: &[f64],
    f: &[f64],
) -> DataIOResult<()> {
    let path_ref = path.as_ref();
    if x.len() != y.len() || x.len() != f.len() {
        return Err(DataIOError::LengthMismatch {
            path: path_ref.to_path_buf(),
        });
    }

    let csv_err = |e: csv::Error| DataIOError::Csv {
        path: path_ref.to_path_buf(),
        source: e,
    };

    let mut writer = csv::Writer::from_path(path_ref).map_err(csv_err)?;
    writer.write_record(["X", "Y", "Value"]).map_err(csv_err)?;
    for i in 0..x.len() {
        writer
            .write_record(&[x[i].to_string(), y[i].to_string(), f[i].to_string()])
            .map_err(csv_err)?;
    }

    writer.flush().map_err(|e| DataIOError::Flush {
        path: path_ref.to_path_buf(),
        source: e,
    })
}

const JSON_FORMAT_NAME: &str = "phs_rbf.settings.json";
const JSON_VERSION: u32 = 1;

/// Everything needed to repeat an interpolation run, as stored in a settings file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsFile {
    pub settings: InterpolationSettings,
    pub params: Params,
}

/// Borrowing envelope for SAVE.
#[derive(Serialize)]
struct JsonEnvelopeRef<'a, T: ?Sized> {
    format: &'static str,
    version: u32,
    #[serde(flatten)]
    contents: &'a T,
}

/// Owning envelope for LOAD.
#[derive(Deserialize)]
struct JsonEnvelopeOwned<T> {
    format: String,
    version: u32,
    #[serde(flatten)]
    contents: T,
}

/// Saves settings and parameters as a versioned **JSON envelope**.
///
/// Files produced here are intended to be read back with [`load_settings`].
///
/// ### Example
/// ```no_run
/// use phs_rbf::{save_settings, InterpolationSettings, Params};
///
/// save_settings("run.json", &InterpolationSettings::default(), &Params::default())?;
/// # Ok::<(), phs_rbf::DataIOError>(())
/// ```
pub fn save_settings<P: AsRef<Path>>(
    path: P,
    settings: &InterpolationSettings,
    params: &Params,
) -> DataIOResult<()> {
    let path_ref = path.as_ref();
    let file = File::create(path_ref).map_err(|e| DataIOError::Create {
        path: path_ref.to_path_buf(),
        source: e,
    })?;
    let mut w = BufWriter::new(file);

    let contents = SettingsFile {
        settings: *settings,
        params: params.clone(),
    };
    let env = JsonEnvelopeRef {
        format: JSON_FORMAT_NAME,
        version: JSON_VERSION,
        contents: &contents,
    };

    serde_json::to_writer_pretty(&mut w, &env).map_err(|e| DataIOError::Json {
        path: path_ref.to_path_buf(),
        source: e,
    })?;
    w.flush().map_err(|e| DataIOError::Flush {
        path: path_ref.to_path_buf(),
        source: e,
    })
}

/// Loads settings and parameters from a versioned **JSON envelope**.
///
/// ### Validation
/// - Fails if `format` or `version` differ from what [`save_settings`] writes.
pub fn load_settings<P: AsRef<Path>>(path: P) -> DataIOResult<SettingsFile> {
    let path_ref = path.as_ref();
    let file = File::open(path_ref).map_err(|e| DataIOError::Open {
        path: path_ref.to_path_buf(),
        source: e,
    })?;

    let env: JsonEnvelopeOwned<SettingsFile> = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| DataIOError::Json {
            path: path_ref.to_path_buf(),
            source: e,
        })?;

    if env.format != JSON_FORMAT_NAME {
        return Err(DataIOError::FormatMismatch {
            path: path_ref.to_path_buf(),
            found: env.format,
            expected: JSON_FORMAT_NAME,
        });
    }

    if env.version != JSON_VERSION {
        return Err(DataIOError::VersionMismatch {
            path: path_ref.to_path_buf(),
            found: env.version,
            expected: JSON_VERSION,
        });
    }

    Ok(env.contents)
}
