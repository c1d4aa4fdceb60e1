use axum::http::header;
use axum::response::{IntoResponse, Response};

use super::response::ApiError;

/// Row shape for a CSV exporter.
pub trait CsvExport {
    fn headers() -> &'static [&'static str];
    fn row(&self) -> Vec<String>;
}

/// Render rows into an in-memory CSV document with a header line.
pub fn write_csv<T: CsvExport>(rows: &[T]) -> Result<Vec<u8>, ApiError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(T::headers())?;
    for row in rows {
        writer.write_record(row.row())?;
    }
    writer
        .into_inner()
        .map_err(|err| ApiError::Export(csv::Error::from(err.into_error())))
}

/// CSV download response named `{prefix}-{date}.csv`.
pub fn csv_attachment<T: CsvExport>(prefix: &str, rows: &[T]) -> Result<Response, ApiError> {
    let body = write_csv(rows)?;
    let filename = format!(
        "{prefix}-{}.csv",
        chrono::Utc::now().date_naive().format("%Y-%m-%d")
    );

    Ok((
        [
            (header::CONTENT_TYPE, mime::TEXT_CSV_UTF_8.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
        .into_response())
}
