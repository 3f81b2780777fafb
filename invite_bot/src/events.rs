//! Gateway event handlers for invite tracking.
//!
//! Every handler degrades gracefully: a failed invite fetch is logged and reported as an unknown
//! attribution rather than crashing the event loop, and a guild the bot lacks permissions for
//! simply stays uncached.

use {
	crate::{error::Result, invite_ext::RichInviteExt, logs, GlobalState},
	gatekeeper::invites::InviteRecord,
	poise::Event,
	serenity::{
		model::prelude::{GuildId, InviteCreateEvent, InviteDeleteEvent, Member, Timestamp},
		prelude::Context,
	},
	tracing::{info, warn},
};

/// Dispatches the gateway events the tracker cares about.
pub async fn handle(ctx: &Context, event: &Event<'_>, state: &GlobalState) -> Result<()> {
	match event {
		Event::Ready { data_about_bot } => {
			info!("Connected to Discord as {}!", data_about_bot.user.tag());
			Ok(())
		}
		Event::GuildCreate { guild, .. } => seed_guild(ctx, state, guild.id).await,
		Event::InviteCreate { data } => invite_create(ctx, state, data).await,
		Event::InviteDelete { data } => invite_delete(ctx, state, data).await,
		Event::GuildMemberAddition { new_member } => member_join(ctx, state, new_member).await,
		_ => Ok(()),
	}
}

/// Fetches a guild's invites and maps them into cacheable records.
async fn fetch_invites(ctx: &Context, guild_id: GuildId) -> serenity::Result<Vec<InviteRecord>> {
	let invites = guild_id.invites(&ctx.http).await?;
	Ok(invites
		.iter()
		.map(RichInviteExt::to_record)
		.collect())
}

/// Seeds the invite cache when a guild becomes available.
///
/// Guilds the bot cannot fetch invites for (missing `Manage Server` permission, transport errors)
/// stay uncached; joins there report an unknown inviter until a later fetch succeeds.
async fn seed_guild(ctx: &Context, state: &GlobalState, guild_id: GuildId) -> Result<()> {
	match fetch_invites(ctx, guild_id).await {
		Ok(invites) => {
			state
				.invite_cache
				.lock()
				.await
				.replace(guild_id.0, invites);
			info!("Cached invites for {}", logs::guild_name(ctx, guild_id));
		}
		Err(why) => {
			warn!("Failed to cache invites for {}: {why:?}", logs::guild_name(ctx, guild_id));
		}
	}

	Ok(())
}

/// Refetches a guild's invites and replaces the cached snapshot. A failed fetch leaves the old
/// snapshot in place.
async fn refresh_snapshot(ctx: &Context, state: &GlobalState, guild_id: GuildId) {
	match fetch_invites(ctx, guild_id).await {
		Ok(invites) => {
			state
				.invite_cache
				.lock()
				.await
				.replace(guild_id.0, invites);
		}
		Err(why) => {
			warn!("Failed to refresh invites for guild {guild_id}: {why:?}");
		}
	}
}

async fn invite_create(
	ctx: &Context, state: &GlobalState, invite: &InviteCreateEvent,
) -> Result<()> {
	let guild_id = match invite.guild_id {
		Some(guild_id) => guild_id,
		// Group DM invites carry no guild and nothing to track.
		None => return Ok(()),
	};

	refresh_snapshot(ctx, state, guild_id).await;

	let created_by = invite
		.inviter
		.as_ref()
		.map(|user| format!("{} ({})", user.tag(), user.id))
		.unwrap_or_else(|| String::from("Unknown"));

	let max_uses = match invite.max_uses {
		0 => String::from("Unlimited"),
		limit => limit.to_string(),
	};

	// The event fires at creation time, so the expiry is `max_age` from now.
	let expires = logs::fmt_expiry(crate::invite_ext::expires_at(&Timestamp::now(), invite.max_age));

	logs::send(ctx, state, guild_id, |embed| {
		embed
			.title("Invite Created")
			.description(format!(
				"A new invite has been created for {}",
				logs::guild_name(ctx, guild_id)
			))
			.color(logs::GREEN)
			.timestamp(Timestamp::now())
			.field("Invite Code", &invite.code, true)
			.field("Created By", created_by, true)
			.field("Channel", format!("<#{}>", invite.channel_id), true)
			.field("Max Uses", max_uses, true)
			.field("Expires", expires, true)
	})
	.await
}

async fn invite_delete(
	ctx: &Context, state: &GlobalState, invite: &InviteDeleteEvent,
) -> Result<()> {
	let guild_id = match invite.guild_id {
		Some(guild_id) => guild_id,
		None => return Ok(()),
	};

	refresh_snapshot(ctx, state, guild_id).await;

	logs::send(ctx, state, guild_id, |embed| {
		embed
			.title("Invite Deleted")
			.description(format!(
				"An invite has been deleted from {}",
				logs::guild_name(ctx, guild_id)
			))
			.color(logs::RED)
			.timestamp(Timestamp::now())
			.field("Invite Code", &invite.code, true)
			.field("Channel", format!("<#{}>", invite.channel_id), true)
	})
	.await
}

async fn member_join(ctx: &Context, state: &GlobalState, member: &Member) -> Result<()> {
	let guild_id = member.guild_id;

	// Hold the lock across fetch-and-replace so two back-to-back joins never diff against the
	// same snapshot.
	let mut cache = state.invite_cache.lock().await;

	let used = match fetch_invites(ctx, guild_id).await {
		Ok(invites) => {
			if !cache.contains(guild_id.0) {
				info!("Cached invites for guild {guild_id} after member join");
			}
			cache.attribute_join(guild_id.0, invites)
		}
		Err(why) => {
			warn!("Failed to fetch invites after member join in guild {guild_id}: {why:?}");
			None
		}
	};

	drop(cache);

	logs::send(ctx, state, guild_id, |embed| {
		embed
			.title("Member Joined")
			.description(format!(
				"{} ({}) has joined {}",
				member.user.tag(),
				member.user.id,
				logs::guild_name(ctx, guild_id)
			))
			.color(logs::BLUE)
			.timestamp(Timestamp::now());

		match &used {
			Some(invite) => {
				let creator = match (&invite.inviter_tag, invite.inviter_id) {
					(Some(tag), Some(id)) => format!("{tag} ({id})"),
					_ => String::from("Unknown"),
				};

				embed
					.field("Invite Used", &invite.code, true)
					.field("Invite Creator", creator, true)
					.field("Invite Channel", format!("<#{}>", invite.channel_id), true)
					.field("Total Uses", invite.uses, true)
			}
			None => embed.field("Invite Used", "Could not determine", true),
		}
	})
	.await
}
