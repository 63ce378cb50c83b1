#[macro_use]
extern crate lazy_static;

pub mod artifacts;
pub mod chain;
pub mod config;
pub mod constants;
