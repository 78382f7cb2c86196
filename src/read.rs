use crate::data::{line_of, Columns, Dataset, Error};
use std::{fs::File, path::Path};
use tracing::{debug, warn};

/// Opens `path` and loads it as a `Dataset`. Anything that keeps the file
/// from being opened for reading is reported as "not found".
pub(crate) fn load_dataset(path: &Path) -> Result<Dataset, Error> {
    let not_found = || Error::FileNotFound(path.display().to_string());
    if !path.is_file() {
        return Err(not_found());
    }
    let file = File::open(path).map_err(|e| {
        debug!(path = %path.display(), error = %e, "Cannot open input");
        not_found()
    })?;
    read_dataset(file)
}

/// Simple CSV importer: the header must carry the required columns, every
/// following record is kept verbatim.
pub(crate) fn read_dataset<R: std::io::Read>(reader: R) -> Result<Dataset, Error> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);
    let header = rdr.headers()?.clone();
    let columns = Columns::locate(&header)?;
    let mut rows = Vec::new();
    for result in rdr.records() {
        let row = result?;
        if row.len() != header.len() {
            // Crude, but a short or long row cannot be matched to the header
            warn!(
                line = line_of(&row),
                expected = header.len(),
                found = row.len(),
                "Skipping row with wrong number of fields"
            );
            continue;
        }
        rows.push(row);
    }
    debug!(rows = rows.len(), columns = header.len(), "Dataset loaded");
    Ok(Dataset {
        header,
        columns,
        rows,
    })
}
