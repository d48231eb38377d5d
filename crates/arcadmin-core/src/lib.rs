pub mod config;
pub mod driver;
pub mod error;
pub mod http;
pub mod narrator;
pub mod publish;
pub mod remote;
pub mod topology;
pub mod urls;

#[cfg(test)]
mod testing;

pub use error::{AdminError, Result};
pub use narrator::{Fault, Narrator};
