// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::utils::shared_components::ticket_control_buttons;
use super::utils::tickets::{close_summary_embed, points_notice_embed, ticket_welcome_embed};
use super::utils::timestamp::message_datetime;
use super::utils::users::user_tag;
use crate::tickets::{
	ChannelDetails, CloseSummary, MessageSource, PointsNotice, TicketPlatform, TranscriptFile, TranscriptLine,
};
use async_trait::async_trait;
use miette::IntoDiagnostic;
use std::sync::Arc;
use twilight_cache_inmemory::DefaultInMemoryCache;
use twilight_http::client::Client;
use twilight_http::request::AuditLogReason;
use twilight_mention::fmt::Mention;
use twilight_model::channel::ChannelType;
use twilight_model::channel::message::AllowedMentions;
use twilight_model::http::attachment::Attachment;
use twilight_model::channel::permission_overwrite::PermissionOverwrite;
use twilight_model::id::Id;
use twilight_model::id::marker::{ChannelMarker, GuildMarker, MessageMarker, UserMarker};

/// Performs ticket side effects against Discord, reading channel data from the gateway cache where it can
pub struct TwilightPlatform {
	http_client: Arc<Client>,
	cache: Arc<DefaultInMemoryCache>,
}

impl TwilightPlatform {
	pub fn new(http_client: Arc<Client>, cache: Arc<DefaultInMemoryCache>) -> Self {
		Self { http_client, cache }
	}

	fn cached_channel(&self, channel_id: Id<ChannelMarker>) -> Option<(Option<String>, Option<Id<ChannelMarker>>)> {
		self.cache
			.channel(channel_id)
			.map(|channel| (channel.name.clone(), channel.parent_id))
	}

	async fn channel_name_and_parent(
		&self,
		channel_id: Id<ChannelMarker>,
	) -> miette::Result<(Option<String>, Option<Id<ChannelMarker>>)> {
		if let Some(cached) = self.cached_channel(channel_id) {
			return Ok(cached);
		}
		let channel = self
			.http_client
			.channel(channel_id)
			.await
			.into_diagnostic()?
			.model()
			.await
			.into_diagnostic()?;
		Ok((channel.name, channel.parent_id))
	}

	fn transcript_attachment(transcript: &TranscriptFile) -> Attachment {
		Attachment::from_bytes(transcript.file_name.clone(), transcript.contents.clone(), 0)
	}
}

#[async_trait]
impl MessageSource for TwilightPlatform {
	async fn fetch_message_page(
		&self,
		channel_id: Id<ChannelMarker>,
		before: Option<Id<MessageMarker>>,
		limit: u16,
	) -> miette::Result<Vec<TranscriptLine>> {
		let response = match before {
			Some(before) => {
				self.http_client
					.channel_messages(channel_id)
					.before(before)
					.limit(limit)
					.await
			}
			None => self.http_client.channel_messages(channel_id).limit(limit).await,
		};
		let messages = response.into_diagnostic()?.models().await.into_diagnostic()?;

		Ok(messages
			.into_iter()
			.map(|message| TranscriptLine {
				message_id: message.id,
				timestamp: message_datetime(message.id, &message.timestamp),
				author_tag: user_tag(&message.author),
				content: message.content,
				attachment_urls: message.attachments.into_iter().map(|attachment| attachment.url).collect(),
			})
			.collect())
	}
}

#[async_trait]
impl TicketPlatform for TwilightPlatform {
	async fn channel_details(&self, channel_id: Id<ChannelMarker>) -> miette::Result<ChannelDetails> {
		let (name, parent_id) = self.channel_name_and_parent(channel_id).await?;
		let parent_name = match parent_id {
			Some(parent_id) => self.channel_name_and_parent(parent_id).await?.0,
			None => None,
		};
		Ok(ChannelDetails {
			name: name.unwrap_or_else(|| format!("ticket-{}", channel_id)),
			parent_id,
			parent_name,
		})
	}

	async fn create_ticket_channel(
		&self,
		guild_id: Id<GuildMarker>,
		name: &str,
		parent_id: Id<ChannelMarker>,
		permission_overwrites: &[PermissionOverwrite],
	) -> miette::Result<Id<ChannelMarker>> {
		let channel = self
			.http_client
			.create_guild_channel(guild_id, name)
			.kind(ChannelType::GuildText)
			.parent_id(parent_id)
			.permission_overwrites(permission_overwrites)
			.reason("Opened ticket")
			.await
			.into_diagnostic()?
			.model()
			.await
			.into_diagnostic()?;
		Ok(channel.id)
	}

	async fn send_ticket_controls(
		&self,
		channel_id: Id<ChannelMarker>,
		opener: Id<UserMarker>,
		category_name: &str,
	) -> miette::Result<()> {
		let embed = ticket_welcome_embed(category_name).into_diagnostic()?;
		let content = format!("{} Welcome to your ticket!", opener.mention());
		let mut allowed_mentions = AllowedMentions::default();
		allowed_mentions.users.push(opener);
		self.http_client
			.create_message(channel_id)
			.content(&content)
			.embeds(&[embed])
			.components(&[ticket_control_buttons()])
			.allowed_mentions(Some(&allowed_mentions))
			.await
			.into_diagnostic()?;
		Ok(())
	}

	async fn set_permission_overwrites(
		&self,
		channel_id: Id<ChannelMarker>,
		permission_overwrites: &[PermissionOverwrite],
	) -> miette::Result<()> {
		self.http_client
			.update_channel(channel_id)
			.permission_overwrites(permission_overwrites)
			.reason("Ticket claimed")
			.await
			.into_diagnostic()?;
		Ok(())
	}

	async fn send_notice(&self, channel_id: Id<ChannelMarker>, content: &str) -> miette::Result<()> {
		self.http_client
			.create_message(channel_id)
			.content(content)
			.allowed_mentions(Some(&AllowedMentions::default()))
			.await
			.into_diagnostic()?;
		Ok(())
	}

	async fn post_transcript(
		&self,
		channel_id: Id<ChannelMarker>,
		summary: &CloseSummary,
		transcript: &TranscriptFile,
	) -> miette::Result<()> {
		let embed = close_summary_embed(summary).into_diagnostic()?;
		self.http_client
			.create_message(channel_id)
			.embeds(&[embed])
			.attachments(&[Self::transcript_attachment(transcript)])
			.await
			.into_diagnostic()?;
		Ok(())
	}

	async fn send_transcript_dm(
		&self,
		user_id: Id<UserMarker>,
		summary: &CloseSummary,
		transcript: &TranscriptFile,
	) -> miette::Result<()> {
		let embed = close_summary_embed(summary).into_diagnostic()?;
		let dm_channel = self
			.http_client
			.create_private_channel(user_id)
			.await
			.into_diagnostic()?
			.model()
			.await
			.into_diagnostic()?;
		self.http_client
			.create_message(dm_channel.id)
			.embeds(&[embed])
			.attachments(&[Self::transcript_attachment(transcript)])
			.await
			.into_diagnostic()?;
		Ok(())
	}

	async fn post_points_notice(&self, channel_id: Id<ChannelMarker>, notice: &PointsNotice) -> miette::Result<()> {
		let embed = points_notice_embed(notice).into_diagnostic()?;
		self.http_client
			.create_message(channel_id)
			.embeds(&[embed])
			.allowed_mentions(Some(&AllowedMentions::default()))
			.await
			.into_diagnostic()?;
		Ok(())
	}

	async fn delete_channel(&self, channel_id: Id<ChannelMarker>, reason: &str) -> miette::Result<()> {
		self.http_client
			.delete_channel(channel_id)
			.reason(reason)
			.await
			.into_diagnostic()?;
		Ok(())
	}
}
