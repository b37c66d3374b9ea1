// src/process/write.rs

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::{
    fs,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};
use tracing::{debug, info};

use super::normalize::Record;

static PATH_SEPARATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[/\\]").expect("path separator regex"));

/// `<identifier>_<title>_<date>_results.tsv`, with path separators in any
/// part replaced by `-` ("SC 13G/A" has one).
pub fn result_file_name(identifier: &str, title: &str, filing_date: &str) -> String {
    let stem = format!("{}_{}_{}_results", identifier, title, filing_date);
    format!("{}.tsv", PATH_SEPARATORS.replace_all(&stem, "-"))
}

/// One record per line, fields tab-joined. Line breaks inside a field would
/// split the record, so they become spaces.
pub fn tsv_line(record: &Record) -> String {
    record
        .fields()
        .iter()
        .map(|f| f.replace(['\n', '\r'], " "))
        .collect::<Vec<_>>()
        .join("\t")
}

/// Write `records` to `dir/<file_name>`, creating `dir` if needed and
/// overwriting any existing file. Not atomic.
pub fn write_records<P: AsRef<Path>>(dir: P, file_name: &str, records: &[Record]) -> Result<PathBuf> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).with_context(|| format!("creating results directory {:?}", dir))?;

    let path = dir.join(file_name);
    let file = fs::File::create(&path).with_context(|| format!("creating {:?}", path))?;
    let mut out = BufWriter::new(file);
    for record in records {
        writeln!(out, "{}", tsv_line(record)).with_context(|| format!("writing {:?}", path))?;
    }
    out.flush().with_context(|| format!("flushing {:?}", path))?;

    debug!(records = records.len(), "wrote records");
    info!(path = %path.display(), "saved TSV");
    Ok(path)
}
