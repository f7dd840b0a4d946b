//! CLI argument types and parsing helpers.
mod cli;
mod parsers;
mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use cli::TesterArgs;
pub use types::{HttpMethod, PositiveUsize};

pub(crate) use parsers::{parse_duration, parse_header};
