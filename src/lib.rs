//! PDF extraction playground: an HTTP API that validates PDF uploads and
//! extracts their content with a selectable model.

pub mod cli;
pub mod extract;
pub mod logs;
pub mod models;
pub mod server;
pub mod utils;

#[cfg(test)]
mod testing;
