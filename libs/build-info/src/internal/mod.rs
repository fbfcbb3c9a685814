pub mod config;
pub mod errors;
pub mod options;
pub mod path;
pub mod settings;
pub mod solc;
