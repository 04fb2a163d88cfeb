pub mod csv_sink;
pub mod dataset;
pub mod pipeline;

pub use csv_sink::{read_records, CsvSink, ResultSink};
pub use dataset::merge_outputs;
pub use pipeline::{CommandPipeline, ConfiguredPipeline, DownstreamPipeline};
