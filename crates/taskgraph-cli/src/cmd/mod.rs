pub mod analyze;
pub mod completions;
pub mod dot;
pub mod generate;
