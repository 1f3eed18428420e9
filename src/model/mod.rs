pub mod catalog;
pub mod common;
pub mod instance;

pub use catalog::*;
pub use common::*;
pub use instance::*;
