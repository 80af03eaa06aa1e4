pub mod reader;

pub use reader::{FitsFile, HduInfo};
