// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::platform::MessageSource;
use crate::config::TranscriptConfig;
use chrono::{DateTime, Utc};
use miette::IntoDiagnostic;
use std::fmt::Write;
use std::path::{Path, PathBuf};
use tokio::time::timeout;
use twilight_model::id::Id;
use twilight_model::id::marker::{ChannelMarker, MessageMarker};

const EMPTY_CONTENT_PLACEHOLDER: &str = "[No Content]";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

/// One message of a ticket channel, as it appears in the transcript
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TranscriptLine {
	pub message_id: Id<MessageMarker>,
	pub timestamp: DateTime<Utc>,
	pub author_tag: String,
	pub content: String,
	pub attachment_urls: Vec<String>,
}

/// Collects the channel's message history, oldest message first.
///
/// History is paged backward from the newest message. A failed or timed-out page ends collection early and the
/// transcript is built from whatever was collected before it. At most `config.message_cap` lines are returned; when
/// the channel holds more, the newest ones are kept.
pub async fn collect_transcript<S: MessageSource + ?Sized>(
	source: &S,
	channel_id: Id<ChannelMarker>,
	config: &TranscriptConfig,
) -> Vec<TranscriptLine> {
	let mut lines: Vec<TranscriptLine> = Vec::new();
	let mut before: Option<Id<MessageMarker>> = None;

	while lines.len() < config.message_cap {
		let remaining = config.message_cap - lines.len();
		let limit = u16::try_from(remaining).map_or(config.page_size, |remaining| remaining.min(config.page_size));

		let page = match timeout(config.page_timeout, source.fetch_message_page(channel_id, before, limit)).await {
			Ok(Ok(page)) => page,
			Ok(Err(error)) => {
				tracing::warn!(source = ?error, %channel_id, "Failed to fetch a page of ticket history");
				Vec::new()
			}
			Err(_) => {
				tracing::warn!(%channel_id, timeout = ?config.page_timeout, "Timed out fetching a page of ticket history");
				Vec::new()
			}
		};

		let Some(oldest) = page.iter().map(|line| line.message_id).min() else {
			break;
		};
		before = Some(oldest);
		lines.extend(page);
	}

	if lines.len() >= config.message_cap {
		tracing::debug!(%channel_id, cap = config.message_cap, "Transcript reached the message cap");
	}
	lines.truncate(config.message_cap);
	lines.sort_by_key(|line| (line.timestamp, line.message_id));
	lines
}

/// Context printed at the top of a transcript
pub struct TranscriptHeader<'a> {
	pub channel_name: &'a str,
	pub closer: &'a str,
	pub reason: &'a str,
}

pub fn render_transcript(header: &TranscriptHeader<'_>, lines: &[TranscriptLine]) -> String {
	let mut rendered = format!(
		"Transcript of {}\nClosed by: {}\nReason: {}\n\n",
		header.channel_name, header.closer, header.reason
	);
	for line in lines {
		let content = if line.content.is_empty() {
			EMPTY_CONTENT_PLACEHOLDER
		} else {
			line.content.as_str()
		};
		// Writing to a String can't fail.
		let _ = writeln!(
			rendered,
			"{} | {}: {}",
			line.timestamp.format(TIMESTAMP_FORMAT),
			line.author_tag,
			content
		);
		for url in line.attachment_urls.iter() {
			let _ = writeln!(rendered, "    Attachment: {}", url);
		}
	}
	rendered
}

/// A rendered transcript persisted to the scratch directory for upload
#[derive(Clone, Debug)]
pub struct TranscriptFile {
	pub file_name: String,
	pub path: PathBuf,
	pub contents: Vec<u8>,
}

impl TranscriptFile {
	/// Writes the transcript to `directory`, creating the directory if needed. The close time is part of the file name
	/// so repeated closes of same-named channels don't collide.
	pub async fn write(
		directory: &Path,
		channel_name: &str,
		contents: String,
		close_time: DateTime<Utc>,
	) -> miette::Result<Self> {
		let file_name = transcript_file_name(channel_name, close_time);
		let path = directory.join(&file_name);
		let contents = contents.into_bytes();

		tokio::fs::create_dir_all(directory).await.into_diagnostic()?;
		tokio::fs::write(&path, &contents).await.into_diagnostic()?;

		Ok(Self {
			file_name,
			path,
			contents,
		})
	}

	pub async fn remove(&self) -> miette::Result<()> {
		tokio::fs::remove_file(&self.path).await.into_diagnostic()
	}
}

pub fn transcript_file_name(channel_name: &str, close_time: DateTime<Utc>) -> String {
	let channel_name: String = channel_name
		.chars()
		.filter(|c| c.is_alphanumeric() || *c == '-' || *c == '_')
		.collect();
	format!("transcript-{}-{}.txt", channel_name, close_time.timestamp_millis())
}
