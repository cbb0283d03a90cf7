use std::fs::File;
use std::path::Path;

use polars::prelude::{DataFrame, ParquetCompression, ParquetReader, ParquetWriter, SerReader};

use crate::errors::DatasetError;

pub(crate) fn read_parquet(path: &Path) -> Result<DataFrame, DatasetError> {
    let file = File::open(path).map_err(|err| DatasetError::io(path, err))?;
    ParquetReader::new(file)
        .finish()
        .map_err(|err| DatasetError::polars(path, err))
}

pub(crate) fn write_parquet(df: &DataFrame, path: &Path) -> Result<(), DatasetError> {
    let mut frame = df.clone();
    let file = File::create(path).map_err(|err| DatasetError::io(path, err))?;
    ParquetWriter::new(file)
        .with_compression(ParquetCompression::Zstd(None))
        .finish(&mut frame)
        .map(|_| ())
        .map_err(|err| DatasetError::polars(path, err))
}
