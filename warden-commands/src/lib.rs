pub mod moderation;
pub mod structure;
pub mod utility;

use twilight_model::gateway::payload::incoming::MessageCreate;

use warden_core::Context;
use warden_utils::COMMAND_PREFIX;

// Global command meta data
pub struct CommandMeta {
    pub name: &'static str,
    pub desc: &'static str,
    pub category: &'static str,
    pub usage: &'static str,
}

pub const COMMANDS: &[CommandMeta] = &[
    utility::ping::META,
    utility::say::META,
    utility::help::META,
    utility::welcome::META,
    moderation::warn::META,
    moderation::unwarn::META,
    moderation::clearwarns::META,
    moderation::warnings::META,
    moderation::mute::META,
    moderation::unmute::META,
    moderation::kick::META,
    moderation::ban::META,
    moderation::unban::META,
    moderation::bans::META,
    moderation::clearbans::META,
    structure::setup::META,
    structure::clean::META,
    structure::category::META,
    structure::protect::PROTECT_CHANNEL_META,
    structure::protect::UNPROTECT_CHANNEL_META,
    structure::protect::PROTECT_CATEGORY_META,
    structure::protect::UNPROTECT_CATEGORY_META,
    // Add new commands here
];

pub async fn handle_message(ctx: Context, msg: Box<MessageCreate>) -> anyhow::Result<()> {
    if msg.author.bot {
        return Ok(());
    }

    let content_owned = msg.content.clone();
    let content = content_owned.trim();

    if !content.starts_with(COMMAND_PREFIX) {
        return Ok(());
    }

    let content = content.trim_start_matches(COMMAND_PREFIX).trim();
    let mut command_and_rest = content.splitn(2, char::is_whitespace);
    let cmd = command_and_rest.next().unwrap_or("").to_ascii_lowercase();
    let rest = command_and_rest
        .next()
        .map(str::trim)
        .filter(|value| !value.is_empty());

    let (arg1, arg_tail): (Option<String>, Option<String>) = match rest {
        Some(value) => {
            let mut args = value.splitn(2, char::is_whitespace);
            let first = args
                .next()
                .filter(|arg| !arg.is_empty())
                .map(ToOwned::to_owned);
            let tail = args
                .next()
                .map(str::trim)
                .filter(|remaining| !remaining.is_empty())
                .map(ToOwned::to_owned);

            (first, tail)
        }
        None => (None, None),
    };

    let arg1 = arg1.as_deref();
    let arg_tail = arg_tail.as_deref();

    match cmd.as_str() {
        "ping" => utility::ping::run(ctx.clone(), msg).await?,
        "say" => utility::say::run(ctx.clone(), msg, rest).await?,
        "help" => utility::help::run(ctx.clone(), msg).await?,
        "testwelcome" => utility::welcome::run_test(ctx.clone(), msg).await?,

        "warn" => moderation::warn::run(ctx.clone(), msg, arg1, arg_tail).await?,
        "unwarn" => moderation::unwarn::run(ctx.clone(), msg, arg1, arg_tail).await?,
        "clearwarns" => moderation::clearwarns::run(ctx.clone(), msg, arg1).await?,
        "warns" => moderation::warnings::run(ctx.clone(), msg, arg1).await?,
        "mute" => moderation::mute::run(ctx.clone(), msg, arg1, arg_tail).await?,
        "unmute" => moderation::unmute::run(ctx.clone(), msg, arg1).await?,
        "kick" => moderation::kick::run(ctx.clone(), msg, arg1, arg_tail).await?,
        "ban" => moderation::ban::run(ctx.clone(), msg, arg1, arg_tail).await?,
        "unban" => moderation::unban::run(ctx.clone(), msg, arg1, arg_tail).await?,
        "bans" => moderation::bans::run(ctx.clone(), msg, arg1).await?,
        "clearbans" => moderation::clearbans::run(ctx.clone(), msg, arg1).await?,

        "setupserver" => structure::setup::run(ctx.clone(), msg).await?,
        "cleanserver" => structure::clean::run(ctx.clone(), msg).await?,
        "deletecategory" => structure::category::run(ctx.clone(), msg, rest).await?,
        "protectchannel" => structure::protect::run_protect_channel(ctx.clone(), msg, arg1).await?,
        "unprotectchannel" => {
            structure::protect::run_unprotect_channel(ctx.clone(), msg, arg1).await?
        }
        "protectcategory" => structure::protect::run_protect_category(ctx.clone(), msg, rest).await?,
        "unprotectcategory" => {
            structure::protect::run_unprotect_category(ctx.clone(), msg, rest).await?
        }
        // Add new commands here
        _ => {}
    }

    Ok(())
}
