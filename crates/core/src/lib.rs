pub mod answer;
pub mod chunk;
pub mod config;
pub mod error;
pub mod text;

pub use answer::*;
pub use chunk::*;
pub use config::Config;
pub use error::*;
