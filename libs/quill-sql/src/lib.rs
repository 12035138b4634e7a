mod splitter;

pub use splitter::{split, split_file};
