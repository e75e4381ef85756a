/// Generic embed builders shared across commands.
pub mod embed;
/// Pure parser helpers: duration codec and target-id parsing.
pub mod parse;
/// Permission helper utilities.
pub mod permissions;
/// Shared time helpers.
pub mod time;

/// Single source of truth for the message-command prefix.
pub const COMMAND_PREFIX: char = '!';
