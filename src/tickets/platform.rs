// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::transcript::{TranscriptFile, TranscriptLine};
use async_trait::async_trait;
use twilight_model::channel::permission_overwrite::PermissionOverwrite;
use twilight_model::id::Id;
use twilight_model::id::marker::{ChannelMarker, GuildMarker, MessageMarker, UserMarker};

/// A source of channel message history, read one page at a time
#[async_trait]
pub trait MessageSource: Send + Sync {
	/// Fetches up to `limit` messages posted before `before` (or the newest messages if `before` is `None`).
	async fn fetch_message_page(
		&self,
		channel_id: Id<ChannelMarker>,
		before: Option<Id<MessageMarker>>,
		limit: u16,
	) -> miette::Result<Vec<TranscriptLine>>;
}

/// Every outbound chat-platform operation the ticket flows perform
#[async_trait]
pub trait TicketPlatform: MessageSource {
	async fn channel_details(&self, channel_id: Id<ChannelMarker>) -> miette::Result<ChannelDetails>;

	/// Creates a text channel for a new ticket and returns its ID.
	async fn create_ticket_channel(
		&self,
		guild_id: Id<GuildMarker>,
		name: &str,
		parent_id: Id<ChannelMarker>,
		permission_overwrites: &[PermissionOverwrite],
	) -> miette::Result<Id<ChannelMarker>>;

	/// Posts the claim/close controls for a freshly opened ticket.
	async fn send_ticket_controls(
		&self,
		channel_id: Id<ChannelMarker>,
		opener: Id<UserMarker>,
		category_name: &str,
	) -> miette::Result<()>;

	/// Replaces all permission overwrites on the channel.
	async fn set_permission_overwrites(
		&self,
		channel_id: Id<ChannelMarker>,
		permission_overwrites: &[PermissionOverwrite],
	) -> miette::Result<()>;

	async fn send_notice(&self, channel_id: Id<ChannelMarker>, content: &str) -> miette::Result<()>;

	/// Posts the close summary and transcript to a log channel.
	async fn post_transcript(
		&self,
		channel_id: Id<ChannelMarker>,
		summary: &CloseSummary,
		transcript: &TranscriptFile,
	) -> miette::Result<()>;

	/// Sends the close summary and transcript to a user by direct message.
	async fn send_transcript_dm(
		&self,
		user_id: Id<UserMarker>,
		summary: &CloseSummary,
		transcript: &TranscriptFile,
	) -> miette::Result<()>;

	async fn post_points_notice(&self, channel_id: Id<ChannelMarker>, notice: &PointsNotice) -> miette::Result<()>;

	async fn delete_channel(&self, channel_id: Id<ChannelMarker>, reason: &str) -> miette::Result<()>;
}

/// What the platform knows about a ticket channel
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ChannelDetails {
	pub name: String,
	pub parent_id: Option<Id<ChannelMarker>>,
	pub parent_name: Option<String>,
}

/// Summary of a closed ticket, shared by the log channel post and the opener's DM
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CloseSummary {
	pub ticket_name: String,
	pub ticket_type: String,
	pub closer_name: String,
	pub reason: String,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PointsNotice {
	pub staff_id: Id<UserMarker>,
	pub ticket_name: String,
	pub total_points: i32,
}
