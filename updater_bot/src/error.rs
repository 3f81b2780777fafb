//! The global [`Error`] and [`Result`] types used across the entire crate.

use tracing::error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone)]
pub enum Error {
	/// Failed to spawn a subprocess.
	Spawn(String),

	/// A subprocess ran past the configured timeout and was killed.
	Timeout { seconds: u64 },

	/// An error from the Discord client.
	Serenity(String),
}

impl std::error::Error for Error {}

impl std::fmt::Display for Error {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Spawn(message) => {
				f.write_fmt(format_args!("Failed to start process: {message}"))
			}
			Self::Timeout { seconds } => {
				f.write_fmt(format_args!("Timed out after {seconds} seconds."))
			}
			Self::Serenity(message) => f.write_str(message),
		}
	}
}

impl From<std::io::Error> for Error {
	fn from(value: std::io::Error) -> Self {
		Self::Spawn(value.to_string())
	}
}

impl From<serenity::Error> for Error {
	fn from(value: serenity::Error) -> Self {
		error!("Discord error: {value:#?}");
		Self::Serenity(value.to_string())
	}
}
