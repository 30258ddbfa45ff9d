mod file_finder;

pub use file_finder::{is_source_path, FileFinder, SourceFile, SOURCE_EXTENSION};
