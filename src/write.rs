use crate::data::{parse_datetime, Dataset, Error, DATETIME_FORMAT};
use std::io;

/// Basic CSV exporter for a `Dataset`: original header, then each row with
/// its `Datetime` normalized to include seconds. A value that doesn't parse
/// can only get here when no range was asked for, and is written untouched.
pub(crate) fn write_dataset<W: io::Write>(writer: W, dataset: &Dataset) -> Result<(), Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(&dataset.header).map_err(io::Error::from)?;
    let at = dataset.columns.datetime;
    for row in &dataset.rows {
        match row.get(at).and_then(parse_datetime) {
            Some(datetime) => {
                let normalized = datetime.format(DATETIME_FORMAT).to_string();
                let fields = row
                    .iter()
                    .enumerate()
                    .map(|(i, field)| if i == at { normalized.as_str() } else { field });
                wtr.write_record(fields).map_err(io::Error::from)?;
            }
            None => wtr.write_record(row).map_err(io::Error::from)?,
        }
    }
    wtr.flush()?;
    Ok(())
}
