mod classes;
mod client;
mod subjects;
mod utils;

pub use utils::test_utils;
