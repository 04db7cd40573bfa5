use crate::error::{AppError, Result};
use crate::persist::{MasterRecord, COLUMNS};

/// Same layout as the master file, so a CSV report can be re-imported as one.
pub fn render(rows: &[MasterRecord]) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(COLUMNS)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.into_inner().map_err(|e| AppError::Io(e.into_error()))
}
