//! Core functionality for vidgrab

pub mod catalog;
pub mod downloader;
pub mod executor;
pub mod media_info;
pub mod resolver;

pub use catalog::*;
pub use downloader::*;
pub use executor::*;
pub use media_info::*;
pub use resolver::*;
