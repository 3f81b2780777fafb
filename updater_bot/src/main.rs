#![deny(clippy::perf, clippy::correctness)]
#![warn(
	clippy::style, missing_debug_implementations, rust_2018_idioms, rustdoc::broken_intra_doc_links
)]

//! Discord bot that updates its host repository on command.
//!
//! One allow-listed chat command: `!update` pulls the latest changes in the configured repository
//! and runs the configured entry-point script, relaying the output of both back into the channel.
//! Senders not on the allow-list get no response at all.

mod error;
mod process;

pub use error::{Error, Result};

use {
	clap::Parser,
	color_eyre::Result as Eyre,
	process::CommandOutput,
	serde::Deserialize,
	serenity::{
		async_trait,
		client::{Client, Context, EventHandler},
		model::prelude::{GatewayIntents, Message, Ready},
	},
	std::{collections::HashSet, path::PathBuf},
	tracing::{error, info, Level},
	tracing_subscriber::fmt::format::FmtSpan,
};

const UPDATE_COMMAND: &str = "!update";

#[derive(Debug, Clone, Parser)]
struct Args {
	/// The path to the bot's config file.
	#[arg(short, long)]
	#[clap(default_value = "./config.toml")]
	config: PathBuf,

	/// Run in debug mode.
	#[arg(long)]
	#[clap(default_value = "false")]
	debug: bool,
}

/// Config file for the bot.
#[derive(Debug, Deserialize)]
pub struct Config {
	/// Authentication Token for the Discord API.
	pub discord_token: String,

	/// UserIDs allowed to run the update command. Anybody else is ignored without a response.
	pub authorized_users: Vec<u64>,

	/// Directory in which the managed repository is located.
	pub repository_directory: String,

	/// Command that runs the repository's entry point, e.g. `python3 main.py`.
	pub run_command: String,

	/// How many seconds a subprocess may run before it is killed.
	pub command_timeout: u64,
}

#[tokio::main]
async fn main() -> Eyre<()> {
	color_eyre::install()?;
	let args = Args::parse();

	tracing_subscriber::fmt()
		.compact()
		.with_max_level(if args.debug { Level::DEBUG } else { Level::INFO })
		.with_line_number(true)
		.with_span_events(FmtSpan::NEW)
		.init();

	let config_file = std::fs::read_to_string(args.config)?;
	let config: Config = toml::from_str(&config_file)?;

	let intents = GatewayIntents::GUILDS
		| GatewayIntents::GUILD_MESSAGES
		| GatewayIntents::DIRECT_MESSAGES
		| GatewayIntents::MESSAGE_CONTENT;

	let mut client = Client::builder(&config.discord_token, intents)
		.event_handler(Handler::new(config))
		.await?;

	info!("Finished setting up. Connecting to Discord...");
	client.start().await?;

	Ok(())
}

/// Message handler holding the parsed config and the allow-list.
#[derive(Debug)]
struct Handler {
	config: Config,
	authorized_users: HashSet<u64>,
}

impl Handler {
	fn new(config: Config) -> Self {
		let authorized_users = HashSet::from_iter(config.authorized_users.iter().copied());
		Self { config, authorized_users }
	}

	fn is_authorized(&self, user_id: u64) -> bool {
		self.authorized_users.contains(&user_id)
	}

	fn is_update_command(content: &str) -> bool {
		content.to_lowercase().starts_with(UPDATE_COMMAND)
	}

	async fn run_update(&self, ctx: &Context, msg: &Message) -> Result<()> {
		msg.channel_id
			.say(&ctx.http, "Updating repo and running script...")
			.await?;

		let pull = process::git_pull(&self.config).await;
		self.relay(ctx, msg, "Git pull output", pull).await;

		let run = process::run_script(&self.config).await;
		self.relay(ctx, msg, "Script output", run).await;

		Ok(())
	}

	/// Relays a subprocess result verbatim, with the exit status up front. Output past Discord's
	/// message size limit fails to send; the error is logged and the command moves on.
	async fn relay(
		&self, ctx: &Context, msg: &Message, title: &str, output: Result<CommandOutput>,
	) {
		let content = match output {
			Ok(output) => format!(
				"{title} ({}):\n```\n{}\n```",
				output.describe_status(),
				output.combined()
			),
			Err(why) => format!("{title}:\n```\n{why}\n```"),
		};

		if let Err(why) = msg.channel_id.say(&ctx.http, content).await {
			error!("Failed to relay output: {why:?}");
		}
	}
}

#[async_trait]
impl EventHandler for Handler {
	async fn ready(&self, _: Context, ready: Ready) {
		info!("Connected to Discord as {}!", ready.user.tag());
	}

	async fn message(&self, ctx: Context, msg: Message) {
		if msg.author.id == ctx.cache.current_user().id {
			return;
		}

		// Unauthorized senders get no response at all.
		if !self.is_authorized(msg.author.id.0) {
			return;
		}

		if !Self::is_update_command(&msg.content) {
			return;
		}

		info!("{} triggered an update", msg.author.tag());

		if let Err(why) = self.run_update(&ctx, &msg).await {
			error!("Update command failed: {why:?}");
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn handler() -> Handler {
		Handler::new(Config {
			discord_token: String::new(),
			authorized_users: vec![123, 456],
			repository_directory: String::from("."),
			run_command: String::from("python3 main.py"),
			command_timeout: 60,
		})
	}

	#[test]
	fn only_allow_listed_users_are_authorized() {
		let handler = handler();

		assert!(handler.is_authorized(123));
		assert!(handler.is_authorized(456));
		assert!(!handler.is_authorized(789));
	}

	#[test]
	fn update_command_matches_case_insensitively() {
		assert!(Handler::is_update_command("!update"));
		assert!(Handler::is_update_command("!UPDATE"));
		assert!(Handler::is_update_command("!update please"));

		assert!(!Handler::is_update_command("update"));
		assert!(!Handler::is_update_command("!invites"));
		assert!(!Handler::is_update_command("please !update"));
	}
}
