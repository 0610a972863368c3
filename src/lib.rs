pub mod backend;
pub mod cli;
pub mod config;
pub mod context;
pub mod datetime;
pub mod dialog;
pub mod fetch;
pub mod fields;
pub mod form;
pub mod nav;
pub mod schema;

#[cfg(test)]
pub(crate) mod testutils;
