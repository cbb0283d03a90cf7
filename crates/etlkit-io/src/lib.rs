pub mod errors;
pub mod extract;
pub mod formats;
pub mod load;

pub use errors::DatasetError;
pub use extract::{extract, extract_json, extract_tabular};
pub use formats::{flatten_json_value, DataFormat, FlattenError};
pub use load::{load, LoadOptions};
