mod table;
mod loader;

pub use table::{Label, ColumnData, Column, FeatureMatrix, TabularDataset, LABEL_COLUMN};
pub use loader::{DatasetLoader, DatasetFormat};
