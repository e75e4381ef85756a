/// Escalation application and idempotent reversal helpers.
pub mod actions;
pub mod ban;
pub mod bans;
pub mod clearbans;
pub mod clearwarns;
pub mod embeds;
pub mod kick;
pub mod mute;
pub mod unban;
pub mod unmute;
pub mod unwarn;
pub mod warn;
pub mod warnings;
