//! `reqwest` implementation of the stress transport.
mod client;
mod resolver;


pub use client::{ReqwestClient, ReqwestTransport, validate_trust_root};
