pub mod fs;

pub use fs::{find_files, latest_modification};
