//! Subprocess plumbing for the update command.
//!
//! Every invocation runs under an explicit timeout so a hung `git pull` or script cannot stall
//! the bot forever.

use {
	crate::{
		error::{Error, Result},
		Config,
	},
	std::time::Duration,
	tokio::process::Command,
	tracing::{error, info},
};

/// Captured result of one finished subprocess.
#[derive(Debug)]
pub struct CommandOutput {
	/// Exit code, if the process exited normally.
	pub status: Option<i32>,
	pub stdout: String,
	pub stderr: String,
}

impl CommandOutput {
	/// Both output streams back to back, the way a terminal would have shown them.
	pub fn combined(&self) -> String {
		format!("{}{}", self.stdout, self.stderr)
	}

	pub fn describe_status(&self) -> String {
		match self.status {
			Some(code) => format!("exit code {code}"),
			None => String::from("killed by signal"),
		}
	}
}

pub async fn git_pull(config: &Config) -> Result<CommandOutput> {
	run("git", &["pull"], config).await.map_err(|why| {
		error!("Failed to pull: {why:?}");
		why
	})
}

pub async fn run_script(config: &Config) -> Result<CommandOutput> {
	let run_command = config
		.run_command
		.split(' ')
		.collect::<Vec<&str>>();

	run(run_command[0], &run_command[1..], config)
		.await
		.map_err(|why| {
			error!("Failed to run script: {why:?}");
			why
		})
}

async fn run(program: &str, args: &[&str], config: &Config) -> Result<CommandOutput> {
	let output = Command::new(program)
		.current_dir(&config.repository_directory)
		.args(args)
		.kill_on_drop(true)
		.output();

	let output = tokio::time::timeout(Duration::from_secs(config.command_timeout), output)
		.await
		.map_err(|_| Error::Timeout { seconds: config.command_timeout })??;

	let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
	let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
	info!("Exit code {}", output.status);
	info!("stdout:\n{stdout}");
	info!("stderr:\n{stderr}");

	Ok(CommandOutput { status: output.status.code(), stdout, stderr })
}

#[cfg(test)]
mod tests {
	use super::*;

	fn config(command_timeout: u64) -> Config {
		Config {
			discord_token: String::new(),
			authorized_users: Vec::new(),
			repository_directory: String::from("."),
			run_command: String::from("echo hello"),
			command_timeout,
		}
	}

	#[tokio::test]
	async fn captures_output_and_exit_status() {
		let output = run_script(&config(5)).await.unwrap();

		assert_eq!(output.status, Some(0));
		assert_eq!(output.stdout.trim(), "hello");
		assert!(output.stderr.is_empty());
		assert_eq!(output.combined().trim(), "hello");
	}

	#[tokio::test]
	async fn long_running_processes_hit_the_timeout() {
		let mut config = config(1);
		config.run_command = String::from("sleep 5");

		match run_script(&config).await {
			Err(Error::Timeout { seconds: 1 }) => {}
			other => panic!("expected a timeout, got {other:?}"),
		}
	}
}
