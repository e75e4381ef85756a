use std::sync::Arc;

use tracing::{error, info};
use twilight_gateway::{EventTypeFlags, Intents, Shard, ShardId, StreamExt as _};
use twilight_http::Client;
use twilight_model::gateway::event::Event;

use rustls::crypto::ring::default_provider;

use warden_commands::{handle_message, utility::welcome::send_welcome};
use warden_core::{Config, Context, Scheduler};
use warden_store::protected::ProtectedStore;
use warden_store::PunishmentStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("failed to install rustls ring provider"))?;

    // Load the .env file
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    // Create a single shared HTTP Client
    let http = Arc::new(Client::new(config.token.clone()));

    let store = PunishmentStore::load(&config.data_file).await?;
    let protected = ProtectedStore::load(&config.protected_file).await?;
    info!(path = %config.data_file.display(), "punishment store loaded");

    let token = config.token.clone();
    let ctx = Context::new(http, store, protected, Scheduler::new(), config);

    // Declare which intents the bot has
    let intents = Intents::GUILDS
        | Intents::GUILD_MESSAGES
        | Intents::MESSAGE_CONTENT
        | Intents::GUILD_MEMBERS;

    // A shard is one Gateway WebSocket connection to Discord
    let mut shard = Shard::new(ShardId::new(0, 1), token, intents);

    info!("Warden is connecting...");

    // Our ears, listens for stuff to do
    while let Some(item) = shard.next_event(EventTypeFlags::all()).await {
        let event = match item {
            Ok(event) => event,
            Err(source) => {
                error!(?source, "gateway event stream error");
                continue;
            }
        };

        match event {
            Event::Ready(_) => {
                info!("Warden is on duty.");
            }

            Event::MessageCreate(msg) => {
                handle_message(ctx.clone(), msg).await?;
            }
            Event::MemberAdd(member) => {
                info!(user = member.user.id.get(), "member joined");
                send_welcome(&ctx, member.user.id, &member.user.name).await;
            }
            _ => {} // Ignore unused events
        }
    }
    Ok(()) // Return Success, shutdown cleanly
}
