// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use knus::Decode;
use miette::{IntoDiagnostic, bail};
use std::path::PathBuf;
use std::time::Duration;
use tokio::fs::read_to_string;

const DEFAULT_TRANSCRIPT_DIRECTORY: &str = "transcripts";
const DEFAULT_PAGE_SIZE: u16 = 100;
const DEFAULT_MESSAGE_CAP: usize = 1000;
const DEFAULT_PAGE_TIMEOUT_SECONDS: u64 = 10;

/// Discord caps a single message history request at 100 messages.
const MAX_PAGE_SIZE: u16 = 100;

pub async fn parse_config(config_path: &str) -> miette::Result<ConfigData> {
	let config_file_contents = read_to_string(config_path).await.into_diagnostic()?;
	parse_config_document(config_path, &config_file_contents)
}

/// The config file as written. Its transcript settings are checked and filled in with defaults to make [ConfigData].
#[derive(Debug, Decode)]
struct ConfigDocument {
	#[knus(child)]
	discord: DiscordConfig,
	#[knus(child)]
	database: DatabaseConfig,
	#[knus(child, default)]
	transcripts: TranscriptSettings,
}

#[derive(Debug)]
pub struct ConfigData {
	pub discord: DiscordConfig,
	pub database: DatabaseConfig,
	pub transcripts: TranscriptConfig,
}

#[derive(Debug, Decode)]
pub struct DiscordConfig {
	#[knus(child, unwrap(argument))]
	pub bot_token: String,
}

#[derive(Debug, Decode)]
pub struct DatabaseConfig {
	#[knus(child, unwrap(argument))]
	pub host: String,
	#[knus(child, unwrap(argument))]
	pub port: Option<u16>,
	#[knus(child, unwrap(argument))]
	pub username: String,
	#[knus(child, unwrap(argument))]
	pub password: String,
	#[knus(child, unwrap(argument))]
	pub database: String,
}

#[derive(Debug, Decode, Default)]
struct TranscriptSettings {
	#[knus(child, unwrap(argument))]
	directory: Option<String>,
	#[knus(child, unwrap(argument))]
	page_size: Option<u16>,
	#[knus(child, unwrap(argument))]
	message_cap: Option<u64>,
	#[knus(child, unwrap(argument))]
	page_timeout_seconds: Option<u64>,
}

/// Settings for transcript generation when a ticket is closed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TranscriptConfig {
	/// Scratch directory transcript files are written to before they're uploaded
	pub directory: PathBuf,
	/// Number of messages requested per history page
	pub page_size: u16,
	/// Upper bound on the number of messages included in one transcript
	pub message_cap: usize,
	/// Wall-clock limit for a single history page request
	pub page_timeout: Duration,
}

impl Default for TranscriptConfig {
	fn default() -> Self {
		Self {
			directory: PathBuf::from(DEFAULT_TRANSCRIPT_DIRECTORY),
			page_size: DEFAULT_PAGE_SIZE,
			message_cap: DEFAULT_MESSAGE_CAP,
			page_timeout: Duration::from_secs(DEFAULT_PAGE_TIMEOUT_SECONDS),
		}
	}
}

pub fn parse_config_document(file_name: &str, contents: &str) -> miette::Result<ConfigData> {
	let document: ConfigDocument = knus::parse(file_name, contents)?;
	Ok(ConfigData {
		discord: document.discord,
		database: document.database,
		transcripts: transcript_config(document.transcripts)?,
	})
}

fn transcript_config(settings: TranscriptSettings) -> miette::Result<TranscriptConfig> {
	let mut config = TranscriptConfig::default();
	if let Some(directory) = settings.directory {
		config.directory = PathBuf::from(directory);
	}
	if let Some(page_size) = settings.page_size {
		if page_size == 0 || page_size > MAX_PAGE_SIZE {
			bail!("transcripts.page_size must be between 1 and {}", MAX_PAGE_SIZE);
		}
		config.page_size = page_size;
	}
	if let Some(message_cap) = settings.message_cap {
		let message_cap = usize::try_from(message_cap).into_diagnostic()?;
		if message_cap == 0 {
			bail!("transcripts.message_cap must be at least 1");
		}
		config.message_cap = message_cap;
	}
	if let Some(timeout) = settings.page_timeout_seconds {
		if timeout == 0 {
			bail!("transcripts.page_timeout_seconds must be at least 1");
		}
		config.page_timeout = Duration::from_secs(timeout);
	}
	Ok(config)
}
