pub mod buffer;
pub mod str_writer;
