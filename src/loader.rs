use crate::config::SourcesConfig;
use crate::constants;
use crate::db::{quote_ident, Database};
use crate::error::{LoaderError, Result};
use crate::metrics;
use rusqlite::params_from_iter;
use rusqlite::types::Value;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

/// Tokens the loader treats as a missing value.
const NULL_MARKERS: &[&str] = &["", "NA", "N/A", "n/a", "NaN", "nan", "NULL", "null", "#N/A"];

/// One source file and the staging table it lands in.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub table: &'static str,
    pub path: PathBuf,
    pub required: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoadedTable {
    pub table: String,
    pub columns: usize,
    pub rows: usize,
}

/// Source files in load order, resolved against the configured directory.
pub fn source_files(sources: &SourcesConfig) -> Vec<SourceFile> {
    vec![
        SourceFile {
            table: constants::GAME_LOG_STAGING,
            path: sources.path_for(&sources.game_log),
            required: true,
        },
        SourceFile {
            table: constants::PARK_CODES_STAGING,
            path: sources.path_for(&sources.park_codes),
            required: true,
        },
        SourceFile {
            table: constants::PERSON_CODES_STAGING,
            path: sources.path_for(&sources.person_codes),
            required: true,
        },
        SourceFile {
            table: constants::TEAM_CODES_STAGING,
            path: sources.path_for(&sources.team_codes),
            required: true,
        },
        SourceFile {
            table: constants::APPEARANCE_TYPE_STAGING,
            path: sources.path_for(&sources.appearance_types),
            required: false,
        },
    ]
}

/// Load every configured source file into its staging table.
///
/// Required files are checked up front so a missing file fails the run before
/// any staging table is replaced.
#[instrument(skip(db, sources), fields(dir = %sources.dir.display()))]
pub fn load_all(db: &Database, sources: &SourcesConfig) -> Result<Vec<LoadedTable>> {
    let files = source_files(sources);
    for file in files.iter().filter(|f| f.required) {
        if !file.path.exists() {
            return Err(LoaderError::MissingSource {
                table: file.table.to_string(),
                path: file.path.clone(),
            });
        }
    }

    let delimiter = sources.delimiter_byte()?;
    let mut loaded = Vec::new();
    for file in &files {
        if !file.path.exists() {
            warn!(table = file.table, path = %file.path.display(), "Optional source file not found, skipping");
            // A staging table left by an earlier load would otherwise be read as current.
            db.drop_table(file.table)?;
            continue;
        }
        loaded.push(load_file(db, file.table, &file.path, delimiter)?);
    }
    Ok(loaded)
}

/// Replace `table` with the verbatim contents of a delimited file.
pub fn load_file(db: &Database, table: &str, path: &Path, delimiter: u8) -> Result<LoadedTable> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .from_path(path)?;
    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.trim().to_string()).collect();

    let column_list = headers
        .iter()
        .map(|h| quote_ident(h))
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = (1..=headers.len())
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ");

    let tx = db.conn().unchecked_transaction()?;
    tx.execute_batch(&format!(
        "DROP TABLE IF EXISTS {table_q}; CREATE TABLE {table_q} ({column_list});",
        table_q = quote_ident(table),
    ))?;

    let mut rows = 0usize;
    {
        let mut stmt = tx.prepare(&format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_ident(table),
            column_list,
            placeholders
        ))?;
        let mut record = csv::StringRecord::new();
        while reader.read_record(&mut record)? {
            stmt.execute(params_from_iter(record.iter().map(infer_value)))?;
            rows += 1;
        }
    }
    tx.commit()?;

    info!(table, rows, columns = headers.len(), "Loaded staging table");
    metrics::staging_rows_loaded(table, rows);
    Ok(LoadedTable {
        table: table.to_string(),
        columns: headers.len(),
        rows,
    })
}

/// Infer the SQLite storage class for one raw field.
///
/// Integers must be canonical (no sign prefix, no leading zeros) so codes such as
/// line scores keep their exact text.
pub fn infer_value(field: &str) -> Value {
    let trimmed = field.trim();
    if NULL_MARKERS.contains(&trimmed) {
        return Value::Null;
    }
    if is_canonical_integer(trimmed) {
        if let Ok(i) = trimmed.parse::<i64>() {
            return Value::Integer(i);
        }
    }
    if is_decimal_literal(trimmed) {
        if let Ok(f) = trimmed.parse::<f64>() {
            return Value::Real(f);
        }
    }
    Value::Text(field.to_string())
}

fn is_canonical_integer(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    if digits.len() > 1 && digits.starts_with('0') {
        return false;
    }
    // "-0" would not round-trip
    !(s.starts_with('-') && digits == "0")
}

fn is_decimal_literal(s: &str) -> bool {
    let body = s.strip_prefix('-').unwrap_or(s);
    match body.split_once('.') {
        Some((int_part, frac_part)) => {
            !int_part.is_empty()
                && !frac_part.is_empty()
                && int_part.bytes().all(|b| b.is_ascii_digit())
                && frac_part.bytes().all(|b| b.is_ascii_digit())
                && (int_part.len() == 1 || !int_part.starts_with('0'))
        }
        None => false,
    }
}
