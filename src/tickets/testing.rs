// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory stand-ins for the database and Discord used by the ticket tests.

use super::platform::{ChannelDetails, CloseSummary, MessageSource, PointsNotice, TicketPlatform};
use super::store::{
	ClaimOutcome, CloseStart, GuildConfigStore, PointAwardOutcome, StaffPointsStore, TicketInsertOutcome, TicketStore,
};
use super::transcript::{TranscriptFile, TranscriptLine};
use crate::model::{GuildConfig, Ticket, TicketStatus, database_id_from_discord_id};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use miette::bail;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use twilight_model::channel::permission_overwrite::PermissionOverwrite;
use twilight_model::id::Id;
use twilight_model::id::marker::{ChannelMarker, GuildMarker, MessageMarker, UserMarker};

pub fn history_line(id: u64, content: &str) -> TranscriptLine {
	TranscriptLine {
		message_id: Id::new(id),
		timestamp: DateTime::from_timestamp(1_700_000_000 + i64::try_from(id).unwrap(), 0).unwrap(),
		author_tag: format!("user{}", id),
		content: String::from(content),
		attachment_urls: Vec::new(),
	}
}

/// Channel history served newest-first, the way Discord pages it
pub struct FakeHistory {
	messages: Vec<TranscriptLine>,
	requested_limits: Mutex<Vec<u16>>,
	fail_after_pages: Option<usize>,
	stall: bool,
}

impl FakeHistory {
	pub fn with_messages(count: u64) -> Self {
		Self {
			messages: (1..=count).map(|id| history_line(id, &format!("message {}", id))).collect(),
			requested_limits: Mutex::new(Vec::new()),
			fail_after_pages: None,
			stall: false,
		}
	}

	pub fn failing_after_pages(mut self, pages: usize) -> Self {
		self.fail_after_pages = Some(pages);
		self
	}

	pub fn stalling(mut self) -> Self {
		self.stall = true;
		self
	}

	pub fn requested_limits(&self) -> Vec<u16> {
		self.requested_limits.lock().unwrap().clone()
	}

	pub fn all_messages(&self) -> Vec<TranscriptLine> {
		self.messages.clone()
	}
}

#[async_trait]
impl MessageSource for FakeHistory {
	async fn fetch_message_page(
		&self,
		_channel_id: Id<ChannelMarker>,
		before: Option<Id<MessageMarker>>,
		limit: u16,
	) -> miette::Result<Vec<TranscriptLine>> {
		let previous_pages = {
			let mut requested_limits = self.requested_limits.lock().unwrap();
			requested_limits.push(limit);
			requested_limits.len() - 1
		};
		if self.stall {
			tokio::time::sleep(Duration::from_secs(60)).await;
		}
		if self.fail_after_pages.is_some_and(|pages| previous_pages >= pages) {
			bail!("history unavailable");
		}

		Ok(self
			.messages
			.iter()
			.rev()
			.filter(|line| before.is_none_or(|before| line.message_id < before))
			.take(usize::from(limit))
			.cloned()
			.collect())
	}
}

/// Ticket, config, and points storage held in memory, following the same rules as the database store
#[derive(Default)]
pub struct MemoryStore {
	guild_configs: Mutex<HashMap<i64, GuildConfig>>,
	tickets: Mutex<HashMap<i64, Ticket>>,
	staff_points: Mutex<HashMap<i64, i32>>,
	point_awards: Mutex<HashMap<i64, i64>>,
	hide_open_tickets: bool,
}

impl MemoryStore {
	pub fn with_guild_config(mut self, config: GuildConfig) -> Self {
		self.guild_configs.get_mut().unwrap().insert(config.guild_id, config);
		self
	}

	pub fn with_ticket(mut self, ticket: Ticket) -> Self {
		self.tickets.get_mut().unwrap().insert(ticket.channel_id, ticket);
		self
	}

	/// Makes [TicketStore::open_ticket_for_user] miss existing tickets, as if another open was recorded between that
	/// lookup and the insert. Inserts still enforce one open ticket per user.
	pub fn with_racing_opens(mut self) -> Self {
		self.hide_open_tickets = true;
		self
	}

	pub fn with_points(mut self, staff_id: Id<UserMarker>, points: i32) -> Self {
		self.staff_points
			.get_mut()
			.unwrap()
			.insert(database_id_from_discord_id(staff_id.get()), points);
		self
	}
}

#[async_trait]
impl GuildConfigStore for MemoryStore {
	async fn guild_config(&self, guild_id: Id<GuildMarker>) -> miette::Result<Option<GuildConfig>> {
		let guild_configs = self.guild_configs.lock().unwrap();
		Ok(guild_configs.get(&database_id_from_discord_id(guild_id.get())).cloned())
	}
}

#[async_trait]
impl TicketStore for MemoryStore {
	async fn ticket(&self, channel_id: Id<ChannelMarker>) -> miette::Result<Option<Ticket>> {
		let tickets = self.tickets.lock().unwrap();
		Ok(tickets.get(&database_id_from_discord_id(channel_id.get())).cloned())
	}

	async fn open_ticket_for_user(
		&self,
		guild_id: Id<GuildMarker>,
		user_id: Id<UserMarker>,
	) -> miette::Result<Option<Ticket>> {
		if self.hide_open_tickets {
			return Ok(None);
		}
		let tickets = self.tickets.lock().unwrap();
		Ok(find_open_ticket(&tickets, guild_id, user_id).cloned())
	}

	async fn insert_ticket(&self, ticket: Ticket) -> miette::Result<TicketInsertOutcome> {
		let mut tickets = self.tickets.lock().unwrap();
		if tickets.contains_key(&ticket.channel_id) {
			bail!("duplicate ticket channel {}", ticket.channel_id);
		}
		if let Some(existing) = find_open_ticket(&tickets, ticket.get_guild_id(), ticket.get_user_id()) {
			return Ok(TicketInsertOutcome::AlreadyOpen(existing.get_channel_id()));
		}
		tickets.insert(ticket.channel_id, ticket);
		Ok(TicketInsertOutcome::Inserted)
	}

	async fn claim_ticket(
		&self,
		channel_id: Id<ChannelMarker>,
		staff_id: Id<UserMarker>,
	) -> miette::Result<ClaimOutcome> {
		let mut tickets = self.tickets.lock().unwrap();
		let Some(ticket) = tickets.get_mut(&database_id_from_discord_id(channel_id.get())) else {
			return Ok(ClaimOutcome::Missing);
		};
		if let Some(claimer) = ticket.get_claimer() {
			return Ok(ClaimOutcome::AlreadyClaimed(claimer));
		}
		if ticket.status != TicketStatus::Open {
			return Ok(ClaimOutcome::NotOpen);
		}
		ticket.claimer = Some(database_id_from_discord_id(staff_id.get()));
		Ok(ClaimOutcome::Claimed(ticket.clone()))
	}

	async fn release_claim(&self, channel_id: Id<ChannelMarker>, staff_id: Id<UserMarker>) -> miette::Result<bool> {
		let mut tickets = self.tickets.lock().unwrap();
		let Some(ticket) = tickets.get_mut(&database_id_from_discord_id(channel_id.get())) else {
			return Ok(false);
		};
		if ticket.get_claimer() != Some(staff_id) {
			return Ok(false);
		}
		ticket.claimer = None;
		Ok(true)
	}

	async fn begin_close(
		&self,
		channel_id: Id<ChannelMarker>,
		stale_before: DateTime<Utc>,
	) -> miette::Result<CloseStart> {
		let mut tickets = self.tickets.lock().unwrap();
		let Some(ticket) = tickets.get_mut(&database_id_from_discord_id(channel_id.get())) else {
			return Ok(CloseStart::Missing);
		};
		if ticket.close_running_since(stale_before) {
			return Ok(CloseStart::InProgress);
		}
		ticket.close_started_at = Some(Utc::now());
		Ok(match ticket.status {
			TicketStatus::Open => {
				ticket.status = TicketStatus::PendingTranscript;
				CloseStart::Started(ticket.clone())
			}
			TicketStatus::PendingTranscript => CloseStart::Started(ticket.clone()),
			TicketStatus::PendingDelete => CloseStart::DeletePending(ticket.clone()),
		})
	}

	async fn mark_pending_delete(&self, channel_id: Id<ChannelMarker>) -> miette::Result<()> {
		let mut tickets = self.tickets.lock().unwrap();
		if let Some(ticket) = tickets.get_mut(&database_id_from_discord_id(channel_id.get())) {
			ticket.status = TicketStatus::PendingDelete;
		}
		Ok(())
	}

	async fn delete_ticket(&self, channel_id: Id<ChannelMarker>) -> miette::Result<bool> {
		let mut tickets = self.tickets.lock().unwrap();
		Ok(tickets.remove(&database_id_from_discord_id(channel_id.get())).is_some())
	}

	async fn interrupted_closes(&self) -> miette::Result<Vec<Ticket>> {
		let tickets = self.tickets.lock().unwrap();
		Ok(tickets
			.values()
			.filter(|ticket| ticket.status != TicketStatus::Open)
			.cloned()
			.collect())
	}
}

fn find_open_ticket<'a>(
	tickets: &'a HashMap<i64, Ticket>,
	guild_id: Id<GuildMarker>,
	user_id: Id<UserMarker>,
) -> Option<&'a Ticket> {
	tickets.values().find(|ticket| {
		ticket.get_guild_id() == guild_id && ticket.get_user_id() == user_id && ticket.status == TicketStatus::Open
	})
}

#[async_trait]
impl StaffPointsStore for MemoryStore {
	async fn award_point(
		&self,
		staff_id: Id<UserMarker>,
		ticket_channel: Id<ChannelMarker>,
	) -> miette::Result<PointAwardOutcome> {
		let db_staff_id = database_id_from_discord_id(staff_id.get());
		let mut point_awards = self.point_awards.lock().unwrap();
		let mut staff_points = self.staff_points.lock().unwrap();

		let db_ticket_channel = database_id_from_discord_id(ticket_channel.get());
		if point_awards.contains_key(&db_ticket_channel) {
			let total = staff_points.get(&db_staff_id).copied().unwrap_or(0);
			return Ok(PointAwardOutcome::AlreadyAwarded { total });
		}
		point_awards.insert(db_ticket_channel, db_staff_id);
		let total = staff_points.entry(db_staff_id).or_insert(0);
		*total += 1;
		Ok(PointAwardOutcome::Awarded { total: *total })
	}

	async fn staff_points(&self, staff_id: Id<UserMarker>) -> miette::Result<i32> {
		let staff_points = self.staff_points.lock().unwrap();
		Ok(staff_points
			.get(&database_id_from_discord_id(staff_id.get()))
			.copied()
			.unwrap_or(0))
	}
}

/// A platform side effect recorded by [FakePlatform]
#[derive(Clone, Debug)]
pub enum PlatformCall {
	CreateChannel {
		name: String,
		parent_id: Id<ChannelMarker>,
		overwrites: Vec<PermissionOverwrite>,
	},
	Controls {
		channel_id: Id<ChannelMarker>,
		opener: Id<UserMarker>,
	},
	Overwrites {
		channel_id: Id<ChannelMarker>,
		overwrites: Vec<PermissionOverwrite>,
	},
	Notice {
		channel_id: Id<ChannelMarker>,
		content: String,
	},
	Transcript {
		channel_id: Id<ChannelMarker>,
		summary: CloseSummary,
		file_name: String,
		contents: String,
	},
	Dm {
		user_id: Id<UserMarker>,
		summary: CloseSummary,
		contents: String,
	},
	PointsNotice {
		channel_id: Id<ChannelMarker>,
		notice: PointsNotice,
	},
	DeleteChannel {
		channel_id: Id<ChannelMarker>,
		reason: String,
	},
}

/// Records what the ticket flows ask of Discord. Reads aren't recorded.
pub struct FakePlatform {
	history: FakeHistory,
	channels: Mutex<HashMap<Id<ChannelMarker>, ChannelDetails>>,
	calls: Mutex<Vec<PlatformCall>>,
	next_channel_id: AtomicU64,
	fail_log_posts: bool,
	fail_dms: bool,
	fail_channel_deletes: bool,
	fail_overwrites: AtomicBool,
}

impl Default for FakePlatform {
	fn default() -> Self {
		Self::with_messages(0)
	}
}

impl FakePlatform {
	pub fn with_messages(count: u64) -> Self {
		Self {
			history: FakeHistory::with_messages(count),
			channels: Mutex::new(HashMap::new()),
			calls: Mutex::new(Vec::new()),
			next_channel_id: AtomicU64::new(1000),
			fail_log_posts: false,
			fail_dms: false,
			fail_channel_deletes: false,
			fail_overwrites: AtomicBool::new(false),
		}
	}

	pub fn with_channel(mut self, channel_id: Id<ChannelMarker>, details: ChannelDetails) -> Self {
		self.channels.get_mut().unwrap().insert(channel_id, details);
		self
	}

	pub fn failing_log_posts(mut self) -> Self {
		self.fail_log_posts = true;
		self
	}

	pub fn failing_dms(mut self) -> Self {
		self.fail_dms = true;
		self
	}

	pub fn failing_channel_deletes(mut self) -> Self {
		self.fail_channel_deletes = true;
		self
	}

	/// Makes permission overwrite updates fail until turned off again.
	pub fn set_failing_overwrites(&self, failing: bool) {
		self.fail_overwrites.store(failing, Ordering::SeqCst);
	}

	pub fn calls(&self) -> Vec<PlatformCall> {
		self.calls.lock().unwrap().clone()
	}

	/// Gets the overwrites most recently set on the channel.
	pub fn last_overwrites(&self, channel_id: Id<ChannelMarker>) -> Option<Vec<PermissionOverwrite>> {
		self.calls().into_iter().rev().find_map(|call| match call {
			PlatformCall::Overwrites {
				channel_id: call_channel,
				overwrites,
			} if call_channel == channel_id => Some(overwrites),
			_ => None,
		})
	}

	fn record(&self, call: PlatformCall) {
		self.calls.lock().unwrap().push(call);
	}
}

#[async_trait]
impl MessageSource for FakePlatform {
	async fn fetch_message_page(
		&self,
		channel_id: Id<ChannelMarker>,
		before: Option<Id<MessageMarker>>,
		limit: u16,
	) -> miette::Result<Vec<TranscriptLine>> {
		self.history.fetch_message_page(channel_id, before, limit).await
	}
}

#[async_trait]
impl TicketPlatform for FakePlatform {
	async fn channel_details(&self, channel_id: Id<ChannelMarker>) -> miette::Result<ChannelDetails> {
		let channels = self.channels.lock().unwrap();
		Ok(channels.get(&channel_id).cloned().unwrap_or_else(|| ChannelDetails {
			name: format!("ticket-{}", channel_id),
			parent_id: None,
			parent_name: None,
		}))
	}

	async fn create_ticket_channel(
		&self,
		_guild_id: Id<GuildMarker>,
		name: &str,
		parent_id: Id<ChannelMarker>,
		permission_overwrites: &[PermissionOverwrite],
	) -> miette::Result<Id<ChannelMarker>> {
		let channel_id = Id::new(self.next_channel_id.fetch_add(1, Ordering::SeqCst));
		self.channels.lock().unwrap().insert(
			channel_id,
			ChannelDetails {
				name: String::from(name),
				parent_id: Some(parent_id),
				parent_name: None,
			},
		);
		self.record(PlatformCall::CreateChannel {
			name: String::from(name),
			parent_id,
			overwrites: permission_overwrites.to_vec(),
		});
		Ok(channel_id)
	}

	async fn send_ticket_controls(
		&self,
		channel_id: Id<ChannelMarker>,
		opener: Id<UserMarker>,
		_category_name: &str,
	) -> miette::Result<()> {
		self.record(PlatformCall::Controls { channel_id, opener });
		Ok(())
	}

	async fn set_permission_overwrites(
		&self,
		channel_id: Id<ChannelMarker>,
		permission_overwrites: &[PermissionOverwrite],
	) -> miette::Result<()> {
		if self.fail_overwrites.load(Ordering::SeqCst) {
			bail!("missing permissions to manage channel");
		}
		self.record(PlatformCall::Overwrites {
			channel_id,
			overwrites: permission_overwrites.to_vec(),
		});
		Ok(())
	}

	async fn send_notice(&self, channel_id: Id<ChannelMarker>, content: &str) -> miette::Result<()> {
		self.record(PlatformCall::Notice {
			channel_id,
			content: String::from(content),
		});
		Ok(())
	}

	async fn post_transcript(
		&self,
		channel_id: Id<ChannelMarker>,
		summary: &CloseSummary,
		transcript: &TranscriptFile,
	) -> miette::Result<()> {
		if self.fail_log_posts {
			bail!("missing access to log channel");
		}
		self.record(PlatformCall::Transcript {
			channel_id,
			summary: summary.clone(),
			file_name: transcript.file_name.clone(),
			contents: String::from_utf8_lossy(&transcript.contents).into_owned(),
		});
		Ok(())
	}

	async fn send_transcript_dm(
		&self,
		user_id: Id<UserMarker>,
		summary: &CloseSummary,
		transcript: &TranscriptFile,
	) -> miette::Result<()> {
		if self.fail_dms {
			bail!("cannot send messages to this user");
		}
		self.record(PlatformCall::Dm {
			user_id,
			summary: summary.clone(),
			contents: String::from_utf8_lossy(&transcript.contents).into_owned(),
		});
		Ok(())
	}

	async fn post_points_notice(&self, channel_id: Id<ChannelMarker>, notice: &PointsNotice) -> miette::Result<()> {
		self.record(PlatformCall::PointsNotice {
			channel_id,
			notice: notice.clone(),
		});
		Ok(())
	}

	async fn delete_channel(&self, channel_id: Id<ChannelMarker>, reason: &str) -> miette::Result<()> {
		if self.fail_channel_deletes {
			bail!("unknown channel");
		}
		self.record(PlatformCall::DeleteChannel {
			channel_id,
			reason: String::from(reason),
		});
		Ok(())
	}
}
