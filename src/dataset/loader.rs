use std::fs::File;
use std::path::Path;
use tracing::debug;
use crate::error::{AuditError, Result};
use super::table::{Column, ColumnData, TabularDataset};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetFormat {
    Csv,
    Parquet,
}

impl DatasetFormat {
    /// `.parquet` (any case) is columnar; everything else is read as CSV.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("parquet") => DatasetFormat::Parquet,
            _ => DatasetFormat::Csv,
        }
    }
}

pub struct DatasetLoader;

impl DatasetLoader {
    pub fn load(path: impl AsRef<Path>) -> Result<TabularDataset> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(AuditError::not_found("Dataset", path));
        }

        let columns = match DatasetFormat::from_path(path) {
            DatasetFormat::Csv => Self::read_csv(path)?,
            DatasetFormat::Parquet => Self::read_parquet(path)?,
        };

        let dataset = TabularDataset::new(columns)?;
        debug!(
            "Loaded {} rows x {} columns from {}",
            dataset.rows(),
            dataset.columns().len(),
            path.display()
        );
        Ok(dataset)
    }

    pub fn read_csv(path: &Path) -> Result<Vec<Column>> {
        let file = File::open(path)?;
        Self::csv_columns(file)
    }

    pub fn csv_columns(reader: impl std::io::Read) -> Result<Vec<Column>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(reader);

        let names: Vec<String> = reader.headers()?.iter().map(|h| h.trim().to_string()).collect();
        let mut cells: Vec<Vec<String>> = vec![Vec::new(); names.len()];

        for record in reader.records() {
            let record = record?;
            for (i, value) in record.iter().enumerate() {
                cells[i].push(value.to_string());
            }
        }

        Ok(names
            .into_iter()
            .zip(cells)
            .map(|(name, values)| Column { name, data: ColumnData::infer(values) })
            .collect())
    }

    #[cfg(feature = "parquet")]
    pub fn read_parquet(path: &Path) -> Result<Vec<Column>> {
        use parquet::file::reader::{FileReader, SerializedFileReader};
        use parquet::record::Field;

        enum Cell {
            Number(f64),
            Missing,
            Text(String),
        }

        let reader = SerializedFileReader::new(File::open(path)?)?;
        let names: Vec<String> = reader
            .metadata()
            .file_metadata()
            .schema()
            .get_fields()
            .iter()
            .map(|f| f.name().to_string())
            .collect();

        let mut cells: Vec<Vec<Cell>> = names.iter().map(|_| Vec::new()).collect();

        for row in reader.get_row_iter(None)? {
            let row = row?;
            for (i, (_, field)) in row.get_column_iter().enumerate() {
                let cell = match field {
                    Field::Null => Cell::Missing,
                    Field::Bool(b) => Cell::Number(if *b { 1.0 } else { 0.0 }),
                    Field::Byte(v) => Cell::Number(*v as f64),
                    Field::Short(v) => Cell::Number(*v as f64),
                    Field::Int(v) => Cell::Number(*v as f64),
                    Field::Long(v) => Cell::Number(*v as f64),
                    Field::UByte(v) => Cell::Number(*v as f64),
                    Field::UShort(v) => Cell::Number(*v as f64),
                    Field::UInt(v) => Cell::Number(*v as f64),
                    Field::ULong(v) => Cell::Number(*v as f64),
                    Field::Float(v) => Cell::Number(*v as f64),
                    Field::Double(v) => Cell::Number(*v),
                    Field::Str(s) => Cell::Text(s.clone()),
                    other => Cell::Text(other.to_string()),
                };
                cells[i].push(cell);
            }
        }

        Ok(names
            .into_iter()
            .zip(cells)
            // pandas index columns are not features
            .filter(|(name, _)| !name.starts_with("__index_level_"))
            .map(|(name, values)| {
                let numeric = values.iter().all(|c| !matches!(c, Cell::Text(_)));
                let data = if numeric {
                    ColumnData::Numeric(
                        values
                            .into_iter()
                            .map(|c| match c {
                                Cell::Number(v) => v,
                                _ => f64::NAN,
                            })
                            .collect(),
                    )
                } else {
                    ColumnData::Text(
                        values
                            .into_iter()
                            .map(|c| match c {
                                Cell::Number(v) => v.to_string(),
                                Cell::Text(s) => s,
                                Cell::Missing => String::new(),
                            })
                            .collect(),
                    )
                };
                Column { name, data }
            })
            .collect())
    }

    #[cfg(not(feature = "parquet"))]
    pub fn read_parquet(_path: &Path) -> Result<Vec<Column>> {
        Err(AuditError::MissingCapability("Parquet dataset reader".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::TempDir;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(DatasetFormat::from_path(Path::new("data/iris.parquet")), DatasetFormat::Parquet);
        assert_eq!(DatasetFormat::from_path(Path::new("data/IRIS.PARQUET")), DatasetFormat::Parquet);
        assert_eq!(DatasetFormat::from_path(Path::new("data/iris.csv")), DatasetFormat::Csv);
        assert_eq!(DatasetFormat::from_path(Path::new("data/iris")), DatasetFormat::Csv);
    }

    #[test]
    fn test_csv_columns_keep_header_order() {
        let csv = "petal width (cm),species,target\n0.2,setosa,0\n1.3,versicolor,1\n";
        let columns = DatasetLoader::csv_columns(Cursor::new(csv)).unwrap();
        let names: Vec<_> = columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["petal width (cm)", "species", "target"]);
        assert_eq!(columns[0].data.as_numeric().unwrap(), &[0.2, 1.3]);
        assert_eq!(columns[1].data.kind(), "text");
    }

    #[test]
    fn test_load_missing_file() {
        let err = DatasetLoader::load("/no/such/iris.csv").unwrap_err();
        assert!(matches!(err, AuditError::NotFound { .. }));
    }

    #[test]
    fn test_load_csv_without_features() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("labels.csv");
        std::fs::write(&path, "target\n0\n1\n").unwrap();
        let err = DatasetLoader::load(&path).unwrap_err();
        assert!(matches!(err, AuditError::InvalidInput(_)));
    }
}
