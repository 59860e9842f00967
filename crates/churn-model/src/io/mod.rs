pub mod dataset;

pub use dataset::{read_dataset, read_dataset_with_config, DatasetReaderConfig};
