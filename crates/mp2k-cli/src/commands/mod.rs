//! CLI command implementations

pub mod doctor;
pub mod index;
pub mod inspect;
pub mod json_output;
pub mod mapping;
pub mod preview;
pub mod rewrite;
pub mod settings;

pub use mapping::{build_plan, MapArg};
