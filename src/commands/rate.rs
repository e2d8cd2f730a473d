use crate::db::Database;
use crate::models::VoteLedger;
use crate::rating::{aggregate, display, scale};
use crate::registry::PollRegistry;
use log::{error, warn};
use serenity::builder::CreateApplicationCommand;
use serenity::model::application::command::CommandOptionType;
use serenity::model::application::interaction::InteractionResponseType;
use serenity::model::application::interaction::application_command::{
    ApplicationCommandInteraction, CommandDataOptionValue,
};
use serenity::model::channel::ReactionType;
use serenity::prelude::*;

pub fn create_rate_command(command: &mut CreateApplicationCommand) -> &mut CreateApplicationCommand {
    command
        .name("rate")
        .description("Start a rating poll for an item.")
        .create_option(|option| {
            option
                .name("item")
                .description("The item you want users to rate.")
                .kind(CommandOptionType::String)
                .required(true)
        })
}

pub async fn handle_rate_command(
    database: &Database,
    registry: &PollRegistry,
    ctx: &Context,
    command: &ApplicationCommandInteraction,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let item_name = command
        .data
        .options
        .iter()
        .find(|option| option.name == "item")
        .and_then(|option| option.resolved.as_ref())
        .and_then(|value| match value {
            CommandDataOptionValue::String(s) => Some(s.trim().to_string()),
            _ => None,
        })
        .unwrap_or_default();

    if item_name.is_empty() {
        send_error_response(ctx, command, "Error: Item name was not provided.").await?;
        return Ok(());
    }

    // The poll message has to exist before reactions can be seeded on
    // it, so defer now and edit the real content in afterwards.
    command
        .create_interaction_response(&ctx.http, |response| {
            response.kind(InteractionResponseType::DeferredChannelMessageWithSource)
        })
        .await?;

    let content = display::poll_message(&item_name, &aggregate::compute_snapshot(&VoteLedger::new()));
    let message = command
        .edit_original_interaction_response(&ctx.http, |response| response.content(content))
        .await?;

    for emoji in scale::RATING_EMOJIS {
        if let Err(e) = message
            .react(&ctx.http, ReactionType::Unicode(emoji.to_string()))
            .await
        {
            warn!("Failed to seed reaction {} on message {}: {}", emoji, message.id, e);
        }
    }

    let poll_id = message.id.to_string();
    if let Err(e) = registry.open(poll_id.clone(), item_name.clone()).await {
        // Message ids are platform-unique, so a collision here means a
        // duplicate poll-open event slipped through.
        error!("Failed to register rating poll {}: {}", poll_id, e);
        return Ok(());
    }

    if let Err(e) = database.create_rating(&poll_id, &item_name).await {
        // The in-memory poll keeps serving votes; it just won't survive
        // a restart.
        error!("Failed to persist new rating poll {}: {}", poll_id, e);
    }

    Ok(())
}

async fn send_error_response(
    ctx: &Context,
    command: &ApplicationCommandInteraction,
    error_message: &str,
) -> Result<(), serenity::Error> {
    command
        .create_interaction_response(&ctx.http, |response| {
            response
                .kind(InteractionResponseType::ChannelMessageWithSource)
                .interaction_response_data(|message| message.content(error_message).ephemeral(true))
        })
        .await
}
