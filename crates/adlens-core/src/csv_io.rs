use std::collections::HashMap;
use std::io::{Read, Write};
use std::path::Path;

use crate::dataset::Dataset;
use crate::error::{Error, Result};
use crate::schema::{Column, DatasetKind, FieldType};
use crate::value::Value;

/// Load one of the dashboard input files, checking it against its contract.
pub fn load_dataset(kind: DatasetKind, path: &Path) -> Result<Dataset> {
    if !path.exists() {
        return Err(Error::DataUnavailable {
            dataset: kind.to_string(),
            path: path.to_path_buf(),
        });
    }

    let file = std::fs::File::open(path)?;
    let dataset = read_dataset(kind.as_str(), &kind.contract(), file)?;
    tracing::debug!(
        event = "dataset_loaded",
        dataset = %kind,
        path = %path.display(),
        rows = dataset.len(),
        columns = dataset.columns().len()
    );
    Ok(dataset)
}

/// Read CSV text with a header row into a dataset.
///
/// Contract columns take their declared type. Any other header is a
/// category, the type derived label columns carry, so an export reloads
/// to an equal dataset.
pub fn read_dataset<R: Read>(name: &str, contract: &[Column], reader: R) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);

    let headers = reader
        .headers()?
        .iter()
        .map(|h| h.to_string())
        .collect::<Vec<_>>();

    let declared = contract
        .iter()
        .map(|col| (col.name.as_str(), col.field_type))
        .collect::<HashMap<_, _>>();

    let missing_columns = contract
        .iter()
        .filter(|col| !headers.iter().any(|header| header == &col.name))
        .map(|col| col.name.clone())
        .collect::<Vec<_>>();
    if !missing_columns.is_empty() {
        return Err(Error::MissingColumns {
            dataset: name.to_string(),
            columns: missing_columns,
        });
    }

    let columns = headers
        .iter()
        .map(|header| {
            let field_type = declared
                .get(header.as_str())
                .copied()
                .unwrap_or(FieldType::Category);
            Column::new(header.clone(), field_type)
        })
        .collect::<Vec<_>>();

    let mut dataset = Dataset::new(name, columns.clone());
    for (row_idx, row) in reader.records().enumerate() {
        let row = row?;
        let mut values = Vec::with_capacity(columns.len());
        for (column, raw) in columns.iter().zip(row.iter()) {
            let value = Value::parse(column.field_type, raw).ok_or_else(|| Error::InvalidValue {
                dataset: name.to_string(),
                row: row_idx as u64 + 1,
                column: column.name.clone(),
                value: raw.to_string(),
                expected: column.field_type.describe(),
            })?;
            values.push(value);
        }
        dataset.push(values);
    }

    Ok(dataset)
}

/// Write a dataset as CSV: header row, comma separated, no index column.
/// Returns the number of bytes written.
pub fn write_csv<W: Write>(dataset: &Dataset, writer: W) -> Result<u64> {
    let counting = CountingWriter::new(writer);
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(counting);

    let header: Vec<&str> = dataset.columns().iter().map(|col| col.name.as_str()).collect();
    writer.write_record(&header)?;

    for record in dataset.records() {
        let row: Vec<String> = record.values().iter().map(Value::to_csv).collect();
        writer.write_record(&row)?;
    }

    writer.flush()?;
    let counting = writer.into_inner().map_err(|err| err.into_error())?;
    Ok(counting.bytes_written())
}

/// Render a dataset as CSV text.
pub fn to_csv_string(dataset: &Dataset) -> Result<String> {
    let mut buffer = Vec::new();
    write_csv(dataset, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

struct CountingWriter<W: Write> {
    inner: W,
    bytes: u64,
}

impl<W: Write> CountingWriter<W> {
    fn new(inner: W) -> Self {
        Self { inner, bytes: 0 }
    }

    fn bytes_written(&self) -> u64 {
        self.bytes
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let size = self.inner.write(buf)?;
        self.bytes = self.bytes.saturating_add(size as u64);
        Ok(size)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REVENUE_CSV: &str = "\
userId,amount,countryName,platform,source,network,adUnitFormat,packageName,adUnitName,note
u1,1.5,Germany,android,ads,admob,banner,com.app,b1,hello
u2,,France,ios,ads,unity,video,com.app,v1,
";

    #[test]
    fn reads_contract_and_extra_columns() {
        let dataset = read_dataset(
            "revenue",
            &DatasetKind::Revenue.contract(),
            REVENUE_CSV.as_bytes(),
        )
        .expect("read revenue");

        assert_eq!(dataset.len(), 2);
        assert_eq!(
            dataset.column("amount").map(|c| c.field_type),
            Some(FieldType::Float)
        );
        assert_eq!(
            dataset.column("note").map(|c| c.field_type),
            Some(FieldType::Category)
        );
        assert_eq!(dataset.records()[0].get(1), &Value::Float(1.5));
        assert!(dataset.records()[1].get(1).is_null());
    }

    #[test]
    fn missing_contract_columns_are_reported() {
        let err = read_dataset(
            "revenue",
            &DatasetKind::Revenue.contract(),
            "userId,amount\nu1,2\n".as_bytes(),
        )
        .unwrap_err();
        match err {
            Error::MissingColumns { columns, .. } => {
                assert!(columns.contains(&"countryName".to_string()));
                assert!(!columns.contains(&"amount".to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn malformed_number_names_row_and_column() {
        let csv = REVENUE_CSV.replace("1.5", "lots");
        let err = read_dataset("revenue", &DatasetKind::Revenue.contract(), csv.as_bytes())
            .unwrap_err();
        match err {
            Error::InvalidValue { row, column, .. } => {
                assert_eq!(row, 1);
                assert_eq!(column, "amount");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_file_is_data_unavailable() {
        let err = load_dataset(
            DatasetKind::Installs,
            Path::new("/nonexistent/adlens/installs.csv"),
        )
        .unwrap_err();
        assert!(matches!(err, Error::DataUnavailable { .. }));
        assert!(err.to_string().starts_with("data unavailable: installs dataset"));
    }

    #[test]
    fn export_has_header_and_no_index() {
        let dataset = read_dataset(
            "revenue",
            &DatasetKind::Revenue.contract(),
            REVENUE_CSV.as_bytes(),
        )
        .expect("read revenue");
        let text = to_csv_string(&dataset).expect("export");
        let mut lines = text.lines();
        assert_eq!(lines.next(), REVENUE_CSV.lines().next());
        assert_eq!(
            lines.next(),
            Some("u1,1.5,Germany,android,ads,admob,banner,com.app,b1,hello")
        );
    }
}
