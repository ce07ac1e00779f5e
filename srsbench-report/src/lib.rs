pub mod compare;
pub mod dataset;
pub mod export;
pub mod grouping;
pub mod ingest;
pub mod plot;
pub mod summary;
