use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::parser::Listing;

const CSV_HEADER: [&str; 5] = ["name", "price", "price_raw", "desc", "link"];

/// Serialize the full accumulated record set to `path`, overwriting any
/// previous snapshot so the file is always a consistent prefix of the run.
/// UTF-8 BOM up front; spreadsheet imports mis-sniff Cyrillic without it.
pub fn write_snapshot(path: &Path, records: &[Listing]) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(b"\xef\xbb\xbf")?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    writer.write_record(CSV_HEADER)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()
}

/// Dump a rejected page body for offline inspection, prefixed with a
/// comment recording the HTTP status and the final (post-redirect) URL.
pub fn save_debug_html(
    dir: &Path,
    page: usize,
    status: u16,
    final_url: &str,
    body: &str,
) -> io::Result<PathBuf> {
    let path = dir.join(format!("debug_page_{page}.html"));
    let mut file = File::create(&path)?;
    writeln!(file, "<!-- status_code={status} final_url={final_url} -->")?;
    file.write_all(body.as_bytes())?;
    Ok(path)
}
