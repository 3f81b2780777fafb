//! The global [`Error`] and [`Result`] types used across the entire crate.

use tracing::{error, info, warn};

/// Convenience alias with [`Error`] filled in.
pub type Result<T> = std::result::Result<T, Error>;

/// Global `Error` type for the entire crate.
#[derive(Debug, Clone)]
pub enum Error {
	/// Some unknown error occurred.
	Unknown,

	/// Some custom edge-case error that doesn't deserve it's own enum variant.
	Custom(String),

	/// Failed to parse JSON.
	ParseJSON,

	/// User Input was out of range.
	InputOutOfRange,

	/// Failed to fetch a guild's invites (missing permission or transport error).
	InviteFetch,

	/// Failed to create the log channel.
	ChannelCreate,

	/// A command that only works on a Guild was called somewhere else.
	NoGuild {
		/// Extra context appended to the reply.
		reason: String,
	},
}

impl std::fmt::Display for Error {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(match self {
			Error::Unknown => "Some unknown error occurred.",
			Error::Custom(msg) => msg,
			Error::ParseJSON => "Failed to parse JSON.",
			Error::InputOutOfRange => {
				"Your input was out of range. Please provide some realistic values."
			}
			Error::InviteFetch => {
				"Failed to fetch this server's invites. Does the bot have the `Manage Server` permission?"
			}
			Error::ChannelCreate => "Failed to create the channel.",
			Error::NoGuild { reason } => {
				return f.write_fmt(format_args!(
					"You can only call this command on a server{reason}."
				))
			}
		})
	}
}

impl std::error::Error for Error {}

impl From<serenity::Error> for Error {
	fn from(value: serenity::Error) -> Self {
		match value {
			serenity::Error::Json(why) => {
				error!("JSON Error {why:?}");
				Self::ParseJSON
			}
			serenity::Error::NotInRange(param, value, min, max) => {
				warn!("User Input (`{value}`) for `{param}` out of range (`{min}` - `{max}`)");
				Self::InputOutOfRange
			}
			why => {
				warn!("Error occurred: {why:?}");
				Self::Unknown
			}
		}
	}
}

impl From<color_eyre::Report> for Error {
	fn from(value: color_eyre::Report) -> Self {
		Self::Custom(value.to_string())
	}
}

impl Error {
	/// Turns a failed command invocation into a user-facing reply.
	pub async fn handle_command(error: poise::FrameworkError<'_, crate::GlobalState, Error>) {
		error!("Command failed. {error:?}");

		let (content, ephemeral) = match &error {
			poise::FrameworkError::Command { error, .. } => (error.to_string(), false),
			poise::FrameworkError::ArgumentParse { input, .. } => (
				format!(
					"You provided invalid input. {}",
					if let Some(input) = input { input } else { "" }
				),
				false,
			),
			poise::FrameworkError::CommandStructureMismatch { description, .. } => {
				error!("{description}");
				(String::from("Incorrect command structure."), false)
			}
			poise::FrameworkError::MissingBotPermissions { missing_permissions, .. } => {
				error!("{missing_permissions}");
				(
					String::from("The bot is missing permissions for this action. Please contact the server owner and kindly ask them to give the bot the required permissions."),
					false
				)
			}
			poise::FrameworkError::MissingUserPermissions { missing_permissions, .. } => {
				(
					if let Some(perms) = missing_permissions {
						format!("You are missing the `{perms}` permissions for this command.")
					} else {
						String::from("You are missing the required permissions for this command.")
					},
					true
				)
			}
			why => {
				error!("{why:?}");
				(String::from("Failed to execute command."), true)
			}
		};

		if let Some(ctx) = &error.ctx() {
			if let Err(why) = ctx
				.send(|reply| {
					reply
						.ephemeral(ephemeral)
						.content(&content)
				})
				.await
			{
				error!("Failed to respond to command. {why:?}");
			}

			info!("Handled error with `{content}`.");
		}
	}
}
