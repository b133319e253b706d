#[macro_use]
extern crate prettytable;

pub mod abi;
pub mod bytecode_verification;
pub mod comparison;
pub mod config;
pub mod deployment;
pub mod errors;
pub mod types;
pub mod utils;
pub mod web3;
