//! Test fixture builders for CLI tests.

use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

use arrow_array::{ArrayRef, FixedSizeListArray, Float32Array, RecordBatch};
use arrow_schema::{DataType, Field, Schema};
use parquet::arrow::arrow_writer::ArrowWriter;
use tempfile::TempDir;

/// Writes two well-separated close pairs as a
/// `points: FixedSizeList<Float32, 3>` column.
///
/// # Errors
/// Returns an error when the file cannot be created or the Parquet writer
/// fails.
pub(super) fn create_parquet_file(
    dir: &TempDir,
    name: &str,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let path = dir.path().join(name);
    let item_field = Arc::new(Field::new("item", DataType::Float32, false));
    let schema = Arc::new(Schema::new(vec![Field::new(
        "points",
        DataType::FixedSizeList(item_field.clone(), 3),
        false,
    )]));
    let values = Float32Array::from(vec![
        0.0_f32, 0.0, 0.0, 0.0, 0.0, 1.0, 10.0, 10.0, 10.0, 10.0, 10.0, 11.0,
    ]);
    let list = FixedSizeListArray::new(item_field, 3, Arc::new(values) as ArrayRef, None);
    let batch = RecordBatch::try_new(schema.clone(), vec![Arc::new(list) as ArrayRef])?;
    let file = File::create(&path)?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(path)
}
