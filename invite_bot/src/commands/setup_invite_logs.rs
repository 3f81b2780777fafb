use {
	crate::{
		error::{Error, Result},
		logs, Context,
	},
	serenity::model::prelude::{
		ChannelType, PermissionOverwrite, PermissionOverwriteType, Permissions, RoleId,
	},
	tracing::{error, info},
};

/// Create the `#invite-logs` channel for this server.
///
/// The channel is created hidden from `@everyone` and visible to the bot. Calling the command \
/// again once the channel exists does nothing.
#[tracing::instrument(skip(ctx), fields(user = ctx.author().tag()))]
#[poise::command(
	slash_command,
	prefix_command,
	on_error = "Error::handle_command",
	required_permissions = "ADMINISTRATOR"
)]
pub async fn setup_invite_logs(ctx: Context<'_>) -> Result<()> {
	ctx.defer().await?;

	let guild_id = ctx
		.guild_id()
		.ok_or(Error::NoGuild { reason: String::new() })?;

	let serenity_ctx = ctx.serenity_context();

	if let Some(channel_id) = logs::find_log_channel(serenity_ctx, ctx.data(), guild_id).await {
		ctx.say(format!(
			"The `{}` channel already exists! (<#{channel_id}>)",
			logs::INVITE_LOGS_CHANNEL
		))
		.await?;
		return Ok(());
	}

	let bot_id = serenity_ctx.cache.current_user().id;
	let overwrites = vec![
		PermissionOverwrite {
			allow: Permissions::empty(),
			deny: Permissions::VIEW_CHANNEL,
			kind: PermissionOverwriteType::Role(RoleId(guild_id.0)),
		},
		PermissionOverwrite {
			allow: Permissions::VIEW_CHANNEL | Permissions::SEND_MESSAGES,
			deny: Permissions::empty(),
			kind: PermissionOverwriteType::Member(bot_id),
		},
	];

	let channel = guild_id
		.create_channel(&serenity_ctx.http, |channel| {
			channel
				.name(logs::INVITE_LOGS_CHANNEL)
				.kind(ChannelType::Text)
				.permissions(overwrites)
		})
		.await
		.map_err(|why| {
			error!("Failed to create log channel in guild {guild_id}: {why:?}");
			Error::ChannelCreate
		})?;

	ctx.data()
		.log_channels
		.lock()
		.await
		.insert(guild_id, channel.id);

	info!("Created `#{}` in guild {guild_id}", channel.name);

	ctx.say(format!("Created <#{}> for invite logging!", channel.id))
		.await?;

	Ok(())
}
