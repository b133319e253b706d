pub mod pretty;
pub mod read_write_file;
