use {
	crate::{
		error::{Error, Result},
		invite_ext, logs, Context,
	},
	serenity::model::prelude::{Member, Timestamp},
	tracing::warn,
};

/// List this server's invites.
///
/// Shows every active invite with its creator, channel, use count and expiry. Pass a `member` \
/// to only see the invites that member created.
#[tracing::instrument(skip(ctx), fields(user = ctx.author().tag()))]
#[poise::command(
	slash_command,
	prefix_command,
	on_error = "Error::handle_command",
	required_permissions = "MANAGE_GUILD"
)]
pub async fn invites(
	ctx: Context<'_>,
	#[description = "Only show invites created by this member"] member: Option<Member>,
) -> Result<()> {
	ctx.defer().await?;

	let guild_id = ctx
		.guild_id()
		.ok_or(Error::NoGuild { reason: String::new() })?;

	let serenity_ctx = ctx.serenity_context();

	let invites = guild_id
		.invites(&serenity_ctx.http)
		.await
		.map_err(|why| {
			warn!("Failed to fetch invites for guild {guild_id}: {why:?}");
			Error::InviteFetch
		})?;

	let (title, invites) = match &member {
		Some(member) => (
			format!("Invites created by {}", member.user.name),
			invites
				.into_iter()
				.filter(|invite| {
					invite
						.inviter
						.as_ref()
						.map_or(false, |user| user.id == member.user.id)
				})
				.collect::<Vec<_>>(),
		),
		None => (
			format!("All invites for {}", logs::guild_name(serenity_ctx, guild_id)),
			invites,
		),
	};

	if invites.is_empty() {
		ctx.say("No invites found.").await?;
		return Ok(());
	}

	ctx.send(|reply| {
		reply.embed(|embed| {
			embed
				.title(title)
				.color(logs::BLUE)
				.timestamp(Timestamp::now());

			for invite in &invites {
				let creator = invite
					.inviter
					.as_ref()
					.map(|user| user.name.clone())
					.unwrap_or_else(|| String::from("Unknown"));

				let max_uses = match invite.max_uses {
					0 => String::from("∞"),
					limit => limit.to_string(),
				};

				let expires =
					logs::fmt_expiry(invite_ext::expires_at(&invite.created_at, invite.max_age));

				embed.field(
					format!("Invite: {}", invite.code),
					format!(
						"Creator: {creator}\nChannel: #{}\nUses: {}/{max_uses}\nExpires: {expires}",
						invite.channel.name, invite.uses
					),
					false,
				);
			}

			embed
		})
	})
	.await?;

	Ok(())
}
