pub mod acquisition;
pub mod cli;
pub mod config;
pub mod parser;
pub mod table;
pub mod viz;
