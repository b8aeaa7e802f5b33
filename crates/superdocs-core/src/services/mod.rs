pub mod anthropic;
pub mod diff;
