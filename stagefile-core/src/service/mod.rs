pub mod block_parser;
pub mod encoder;
pub mod pipeline_parser;
