pub mod help;
pub mod ping;
pub mod say;
pub mod welcome;
