use crate::db::Database;
use crate::error::RegistryError;
use crate::models::RatingPoll;
use crate::rating::{aggregate, display, scale};
use crate::registry::PollRegistry;
use log::{debug, error, warn};
use serenity::model::channel::{Reaction, ReactionType};
use serenity::model::id::UserId;
use serenity::prelude::*;

/// A reaction is only a rating when it carries one of the five scale
/// emojis. Everything else returns None before any poll lookup.
fn rating_of(reaction: &Reaction) -> Option<i32> {
    match &reaction.emoji {
        ReactionType::Unicode(emoji) => scale::rating_for(emoji),
        _ => None,
    }
}

/// The voter behind a reaction event. The bot seeds the rating emojis
/// on every poll message itself; its own reactions are never votes.
fn voter_id(ctx: &Context, reaction: &Reaction) -> Option<UserId> {
    let user_id = reaction.user_id?;
    if user_id == ctx.cache.current_user().id {
        return None;
    }
    Some(user_id)
}

pub async fn reaction_added(
    database: &Database,
    registry: &PollRegistry,
    ctx: &Context,
    reaction: &Reaction,
) {
    let Some(user_id) = voter_id(ctx, reaction) else {
        return;
    };
    let Some(rating) = rating_of(reaction) else {
        return;
    };

    let poll_id = reaction.message_id.to_string();
    let result = registry
        .with_poll(&poll_id, async |poll| {
            poll.votes.cast(user_id.to_string(), rating);

            // A voter keeps at most one visible rating emoji on the
            // poll message: clear the other four, best effort.
            for emoji in scale::RATING_EMOJIS {
                if scale::emoji_for(rating) == Some(emoji) {
                    continue;
                }
                if let Err(e) = reaction
                    .channel_id
                    .delete_reaction(
                        &ctx.http,
                        reaction.message_id,
                        Some(user_id),
                        ReactionType::Unicode(emoji.to_string()),
                    )
                    .await
                {
                    warn!("Could not remove old reaction {} for user {}: {}", emoji, user_id, e);
                }
            }

            refresh_poll(database, ctx, reaction, &poll_id, poll).await;
        })
        .await;

    if let Err(RegistryError::NotFound(_)) = result {
        // Reactions land on plenty of messages that are not polls.
        debug!("Ignoring rating reaction on unknown message {}", poll_id);
    }
}

pub async fn reaction_removed(
    database: &Database,
    registry: &PollRegistry,
    ctx: &Context,
    reaction: &Reaction,
) {
    let Some(user_id) = voter_id(ctx, reaction) else {
        return;
    };
    if rating_of(reaction).is_none() {
        return;
    }

    let poll_id = reaction.message_id.to_string();
    let result = registry
        .with_poll(&poll_id, async |poll| {
            poll.votes.retract(&user_id.to_string());
            refresh_poll(database, ctx, reaction, &poll_id, poll).await;
        })
        .await;

    if let Err(RegistryError::NotFound(_)) = result {
        debug!("Ignoring reaction removal on unknown message {}", poll_id);
    }
}

/// Mirror a just-mutated ledger to the database and re-render the poll
/// message. Both writes are advisory: failures are logged and the
/// in-memory ledger stays authoritative.
async fn refresh_poll(
    database: &Database,
    ctx: &Context,
    reaction: &Reaction,
    poll_id: &str,
    poll: &RatingPoll,
) {
    if let Err(e) = database.replace_votes(poll_id, &poll.votes).await {
        error!("Failed to persist votes for poll {}: {}", poll_id, e);
    }

    let snapshot = aggregate::compute_snapshot(&poll.votes);
    let content = display::poll_message(&poll.item_name, &snapshot);
    if let Err(e) = reaction
        .channel_id
        .edit_message(&ctx.http, reaction.message_id, |message| {
            message.content(content)
        })
        .await
    {
        error!("Failed to refresh poll message {}: {}", poll_id, e);
    }
}
