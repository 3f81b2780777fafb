//! Discord Bot that keeps track of guild invites.
//!
//! The bot caches every guild's invite list and diffs use counts whenever a member joins, to work
//! out which invite (and therefore which inviter) they came in through. Invite creations,
//! deletions and member joins are logged as embeds to an `#invite-logs` channel, and two
//! permission-gated commands expose the invite list and the log channel setup.

#![warn(missing_debug_implementations, missing_docs, rust_2018_idioms)]
#![warn(clippy::style, clippy::perf, clippy::complexity, clippy::correctness)]

mod commands;
mod error;
mod events;
mod invite_ext;
mod logs;

use {
	crate::error::Error,
	clap::{Parser, ValueEnum},
	color_eyre::Result as Eyre,
	gatekeeper::invites::InviteCache,
	poise::{
		serenity_prelude::{ChannelId, GatewayIntents, GuildId, UserId},
		Command, Framework, FrameworkOptions, PrefixFrameworkOptions,
	},
	serde::Deserialize,
	std::{
		collections::{HashMap, HashSet},
		path::PathBuf,
	},
	time::macros::format_description,
	tokio::sync::Mutex,
	tracing::{debug, info},
	tracing_subscriber::{
		fmt::{format::FmtSpan, time::UtcTime},
		EnvFilter,
	},
};

#[tokio::main]
async fn main() -> Eyre<()> {
	color_eyre::install()?;
	let args = Args::parse();

	let config_file = std::fs::read_to_string(args.config)?;
	let config: Config = toml::from_str(&config_file)?;

	let cwd = std::env::var("PWD")?;
	let file_logger = tracing_appender::rolling::minutely(cwd + "/logs", "invite_bot.log");
	let (log_writer, _guard) = tracing_appender::non_blocking(file_logger);

	tracing_subscriber::fmt()
		.compact()
		.with_writer(log_writer)
		.with_timer(UtcTime::new(format_description!(
			"[[[year]-[month]-[day] | [hour]:[minute]:[second]]"
		)))
		.with_line_number(true)
		.with_span_events(FmtSpan::NEW)
		.with_env_filter({
			EnvFilter::new(if args.debug {
				"DEBUG"
			} else if let Some(ref level) = config.log_level {
				level.as_str()
			} else {
				"invite_bot=INFO,gatekeeper=INFO"
			})
		})
		.init();

	let global_state = GlobalState::new(config);

	let framework = Framework::builder()
		.options(FrameworkOptions {
			owners: HashSet::from_iter([UserId(global_state.config.owner_id)]),
			prefix_options: PrefixFrameworkOptions {
				prefix: Some(String::from("!")),
				ignore_bots: true,
				..Default::default()
			},
			commands: vec![commands::invites(), commands::setup_invite_logs()],
			event_handler: |ctx, event, _, state| {
				Box::pin(async move {
					debug!("Received event `{}`", event.name());
					events::handle(ctx, event, state).await
				})
			},
			..Default::default()
		})
		.token(&global_state.config.discord_token)
		.intents(
			GatewayIntents::GUILDS
				| GatewayIntents::GUILD_MEMBERS
				| GatewayIntents::GUILD_INVITES
				| GatewayIntents::GUILD_MESSAGES
				| GatewayIntents::MESSAGE_CONTENT,
		)
		.setup(move |ctx, _, framework| {
			Box::pin(async move {
				let commands = &framework.options().commands;
				let mode = &global_state.config.mode;
				match mode {
					RegisterMode::Dev => {
						let dev_guild = GuildId(global_state.config.dev_guild);
						poise::builtins::register_in_guild(ctx, commands, dev_guild).await?;
					}
					RegisterMode::Prod => {
						poise::builtins::register_globally(ctx, commands).await?;
					}
				}

				for Command { name, .. } in commands {
					info!("[{mode}] Successfully registered command `/{name}`.");
				}

				Ok(global_state)
			})
		});

	info!("Finished setting up. Connecting to Discord...");
	framework
		.run()
		.await
		.expect("Failed to run framework.");

	Ok(())
}

/// Some convenience CLI arguments to configure the bot quickly without changing the config file.
/// Any of these options will override the values set in the config file.
#[derive(Debug, Clone, Parser)]
struct Args {
	/// The path to the bot's config file.
	#[arg(short, long)]
	#[clap(default_value = "./config.toml")]
	pub config: PathBuf,

	/// Run in debug mode.
	#[arg(long)]
	#[clap(default_value = "false")]
	pub debug: bool,
}

/// Config file for the bot.
#[derive(Debug, Deserialize)]
pub struct Config {
	/// Can be one of the following:
	/// - `TRACE`
	/// - `DEBUG`
	/// - `INFO`
	/// - `WARN`
	/// - `ERROR`
	///
	/// This value will default to `INFO`.
	/// The `--debug` flag will always override this value to `DEBUG`.
	pub log_level: Option<String>,

	/// Authentication Token for the Discord API.
	pub discord_token: String,

	/// Which level to register commands on.
	/// - `Dev`: commands will be registered on a single guild only. This is fast and useful for
	///          development.
	/// - `Prod`: commands will be registered on every guild the bot is on and allowed to register
	///           commands on. This might take a while to reload and therefore should only be used
	///           when running in production.
	pub mode: RegisterMode,

	/// The GuildID of the development server. This will be used for registering commands when
	/// running in `Dev` mode.
	pub dev_guild: u64,

	/// The UserID of the bot's owner.
	pub owner_id: u64,
}

/// Which level to register commands on.
#[derive(Debug, Clone, Deserialize, ValueEnum)]
pub enum RegisterMode {
	/// Commands will be registered on a single guild only. This is fast and useful for
	/// development.
	Dev,

	/// Commands will be registered on every guild the bot is on and allowed to register commands
	/// on. This might take a while to reload and therefore should only be used when running in
	/// production.
	Prod,
}

impl std::fmt::Display for RegisterMode {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(match self {
			Self::Dev => "Dev",
			Self::Prod => "Prod",
		})
	}
}

/// Global State Object used for the entire runtime of the process. This holds the parsed config
/// file and the invite cache, so event handlers never touch ambient globals.
#[derive(Debug)]
pub struct GlobalState {
	/// Parsed config file of the bot.
	pub config: Config,

	/// Last-known invite list per guild.
	pub invite_cache: Mutex<InviteCache>,

	/// Resolved `#invite-logs` channel per guild. An id that went stale (channel deleted) gets
	/// re-resolved by name on the next send.
	pub log_channels: Mutex<HashMap<GuildId, ChannelId>>,
}

impl GlobalState {
	fn new(config: Config) -> Self {
		Self {
			config,
			invite_cache: Mutex::new(InviteCache::new()),
			log_channels: Mutex::new(HashMap::new()),
		}
	}
}

/// Global `Context` type which gets passed to slash commands.
pub type Context<'ctx> = poise::Context<'ctx, GlobalState, Error>;
