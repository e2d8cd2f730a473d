mod commands;
mod db;
mod error;
mod handlers;
mod models;
mod rating;
mod registry;

use db::Database;
use log::{error, info, warn};
use registry::PollRegistry;
use serenity::async_trait;
use serenity::model::application::command::Command;
use serenity::model::application::interaction::Interaction;
use serenity::model::channel::Reaction;
use serenity::model::gateway::Ready;
use serenity::prelude::*;
use std::env;
use std::sync::Arc;

struct Bot {
    database: Arc<Database>,
    registry: Arc<PollRegistry>,
}

#[async_trait]
impl EventHandler for Bot {
    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let database = Arc::clone(&self.database);
        let registry = Arc::clone(&self.registry);

        // Spawn a task to handle the interaction concurrently
        tokio::spawn(async move {
            handlers::handle_interaction(&database, &registry, &ctx, interaction).await;
        });
    }

    async fn reaction_add(&self, ctx: Context, reaction: Reaction) {
        let database = Arc::clone(&self.database);
        let registry = Arc::clone(&self.registry);

        tokio::spawn(async move {
            handlers::reaction::reaction_added(&database, &registry, &ctx, &reaction).await;
        });
    }

    async fn reaction_remove(&self, ctx: Context, reaction: Reaction) {
        let database = Arc::clone(&self.database);
        let registry = Arc::clone(&self.registry);

        tokio::spawn(async move {
            handlers::reaction::reaction_removed(&database, &registry, &ctx, &reaction).await;
        });
    }

    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("{} is connected!", ready.user.name);

        let command = Command::create_global_application_command(&ctx.http, |command| {
            commands::rate::create_rate_command(command)
        })
        .await;

        match command {
            Ok(command) => info!("Registered global /{} command.", command.name),
            Err(why) => error!("Failed to register slash commands: {:?}", why),
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize logging
    dotenvy::dotenv().ok();
    env_logger::init();

    // Load token from environment variable
    let token = env::var("DISCORD_TOKEN").expect("Expected a token in the environment");

    // Initialize database
    let database = match Database::new().await {
        Ok(db) => Arc::new(db),
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            return;
        }
    };

    // Rebuild the in-memory poll index from persisted state
    let registry = Arc::new(PollRegistry::new());
    match database.load_all().await {
        Ok((rows, skipped)) => {
            let loaded = rows.len();
            registry.load_all(rows).await;
            if skipped > 0 {
                warn!(
                    "Loaded {} rating poll(s) from the database, skipped {} unreadable row(s).",
                    loaded, skipped
                );
            } else {
                info!("Loaded {} rating poll(s) from the database.", loaded);
            }
        }
        Err(e) => {
            error!("Failed to load rating polls from the database: {}", e);
            return;
        }
    }

    // Define intents
    let intents = GatewayIntents::GUILDS | GatewayIntents::GUILD_MESSAGE_REACTIONS;

    // Build client
    let mut client = Client::builder(&token, intents)
        .event_handler(Bot { database, registry })
        .await
        .expect("Err creating client");

    // Shut the shards down cleanly on ctrl-c
    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c()
            .await
            .expect("Could not register ctrl+c handler");
        info!("Shutting down...");
        shard_manager.lock().await.shutdown_all().await;
    });

    // Start client
    if let Err(why) = client.start().await {
        error!("Client error: {:?}", why);
    }
}
