//! Sending embeds to the per-guild `#invite-logs` channel.
//!
//! The channel is located by its well-known name, but the resolved id is cached per guild and
//! preferred on later sends. A renamed channel therefore keeps receiving logs; only a deleted
//! channel triggers a fresh name lookup.

use {
	crate::{error::Result, GlobalState},
	chrono::{DateTime, Utc},
	serenity::{
		builder::CreateEmbed,
		model::prelude::{ChannelId, ChannelType, GuildId},
		prelude::Context,
	},
	tracing::info,
};

/// Name of the well-known logging channel.
pub const INVITE_LOGS_CHANNEL: &str = "invite-logs";

/// Embed color for invite creations.
pub const GREEN: (u8, u8, u8) = (87, 242, 135);

/// Embed color for invite deletions.
pub const RED: (u8, u8, u8) = (237, 66, 69);

/// Embed color for member joins and invite listings.
pub const BLUE: (u8, u8, u8) = (88, 101, 242);

/// Renders an optional expiry as Discord's relative-timestamp markup.
pub fn fmt_expiry(expires_at: Option<DateTime<Utc>>) -> String {
	match expires_at {
		Some(timestamp) => format!("<t:{}:R>", timestamp.timestamp()),
		None => String::from("Never"),
	}
}

/// The guild's name, or a placeholder if it dropped out of the cache.
pub fn guild_name(ctx: &Context, guild_id: GuildId) -> String {
	guild_id
		.name(&ctx.cache)
		.unwrap_or_else(|| format!("guild {guild_id}"))
}

/// Finds the guild's log channel, preferring the id cached from an earlier lookup.
///
/// The cached id is checked against the guild's current channel list; if the channel is gone, the
/// name lookup runs again and the cache entry is refreshed.
pub async fn find_log_channel(
	ctx: &Context, state: &GlobalState, guild_id: GuildId,
) -> Option<ChannelId> {
	let channels = guild_id.channels(&ctx.http).await.ok()?;

	let mut cached = state.log_channels.lock().await;

	if let Some(channel_id) = cached.get(&guild_id) {
		if channels.contains_key(channel_id) {
			return Some(*channel_id);
		}

		cached.remove(&guild_id);
	}

	let channel_id = channels
		.values()
		.find(|channel| channel.kind == ChannelType::Text && channel.name == INVITE_LOGS_CHANNEL)
		.map(|channel| channel.id)?;

	cached.insert(guild_id, channel_id);

	Some(channel_id)
}

/// Sends one embed to the guild's log channel. A missing channel is noted in the process log and
/// the embed is dropped.
pub async fn send<F>(ctx: &Context, state: &GlobalState, guild_id: GuildId, build: F) -> Result<()>
where
	F: FnOnce(&mut CreateEmbed) -> &mut CreateEmbed,
{
	let channel_id = match find_log_channel(ctx, state, guild_id).await {
		Some(channel_id) => channel_id,
		None => {
			info!(
				"No `{INVITE_LOGS_CHANNEL}` channel found in {}",
				guild_name(ctx, guild_id)
			);
			return Ok(());
		}
	};

	let mut embed = CreateEmbed::default();
	build(&mut embed);

	channel_id
		.send_message(&ctx.http, |message| message.set_embed(embed))
		.await?;

	Ok(())
}
