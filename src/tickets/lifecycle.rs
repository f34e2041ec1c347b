// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::error::{MissingRecord, TicketError};
use super::permissions::{claimed_channel_overwrites, opened_channel_overwrites};
use super::platform::{ChannelDetails, CloseSummary, PointsNotice, TicketPlatform};
use super::store::{ClaimOutcome, CloseStart, PointAwardOutcome, TicketInsertOutcome, TicketStores};
use super::transcript::{TranscriptFile, TranscriptHeader, collect_transcript, render_transcript};
use crate::config::TranscriptConfig;
use crate::model::{GuildConfig, Ticket, TicketCategory, TicketStatus, database_id_from_discord_id};
use chrono::{DateTime, TimeDelta, Utc};
use std::sync::Arc;
use twilight_mention::fmt::Mention;
use twilight_model::id::Id;
use twilight_model::id::marker::{ChannelMarker, GuildMarker, RoleMarker, UserMarker};

/// Longest channel name Discord accepts
const MAX_CHANNEL_NAME_LENGTH: usize = 100;
/// Longest audit log reason Discord accepts
const MAX_AUDIT_REASON_LENGTH: usize = 512;
/// Minutes after which an unfinished close is considered abandoned and may be taken over by another close
const STALE_CLOSE_MINUTES: i64 = 10;

pub const DEFAULT_CLOSE_REASON: &str = "No reason provided";

/// The user acting on a ticket, along with the roles used to authorize them
#[derive(Clone, Debug)]
pub struct Actor {
	pub user_id: Id<UserMarker>,
	pub name: String,
	pub roles: Vec<Id<RoleMarker>>,
}

impl Actor {
	pub fn has_role(&self, role: Id<RoleMarker>) -> bool {
		self.roles.contains(&role)
	}
}

/// Outcome of a best-effort side effect
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Delivery {
	Delivered,
	Skipped(&'static str),
	Failed(String),
}

impl Delivery {
	fn from_result(result: miette::Result<()>, what: &'static str) -> Self {
		match result {
			Ok(()) => Self::Delivered,
			Err(error) => {
				tracing::warn!(source = ?error, "Failed to {}", what);
				Self::Failed(error.to_string())
			}
		}
	}
}

/// What happened to staff points when a ticket was closed
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PointsCredit {
	NotAttempted,
	/// Nobody claimed the ticket, so nobody was credited
	Unclaimed,
	Awarded {
		staff_id: Id<UserMarker>,
		total: i32,
	},
	AlreadyAwarded {
		staff_id: Id<UserMarker>,
		total: i32,
	},
}

/// Summary of a finished close, logged once the ticket is gone
#[derive(Clone, Debug)]
pub struct CloseReport {
	pub channel_name: String,
	/// Set when an earlier close attempt already delivered the transcript and this one only finished deletion
	pub resumed: bool,
	pub transcript_lines: usize,
	pub closing_notice: Delivery,
	pub log_post: Delivery,
	pub opener_dm: Delivery,
	pub points: PointsCredit,
	pub points_notice: Delivery,
	pub transcript_cleanup: Delivery,
}

impl CloseReport {
	fn new(channel_name: String) -> Self {
		Self {
			channel_name,
			resumed: false,
			transcript_lines: 0,
			closing_notice: Delivery::Skipped("not attempted"),
			log_post: Delivery::Skipped("not attempted"),
			opener_dm: Delivery::Skipped("not attempted"),
			points: PointsCredit::NotAttempted,
			points_notice: Delivery::Skipped("not attempted"),
			transcript_cleanup: Delivery::Skipped("not attempted"),
		}
	}
}

/// A close that passed its checks and is waiting to run
#[derive(Clone, Debug)]
pub struct PendingClose {
	pub ticket: Ticket,
	pub config: GuildConfig,
	pub closer: Actor,
	pub reason: String,
}

/// Runs the open, claim, and close flows for tickets.
pub struct TicketController<S, P> {
	store: Arc<S>,
	platform: Arc<P>,
	transcripts: TranscriptConfig,
}

impl<S: TicketStores, P: TicketPlatform> TicketController<S, P> {
	pub fn new(store: Arc<S>, platform: Arc<P>, transcripts: TranscriptConfig) -> Self {
		Self {
			store,
			platform,
			transcripts,
		}
	}

	pub async fn open_ticket(
		&self,
		guild_id: Id<GuildMarker>,
		opener: &Actor,
		category: TicketCategory,
	) -> Result<Ticket, TicketError> {
		let Some(config) = self.store.guild_config(guild_id).await? else {
			return Err(TicketError::NotFound(MissingRecord::GuildConfig));
		};
		let Some(parent_id) = config.get_category_channel(category) else {
			return Err(TicketError::CategoryUnavailable);
		};
		if let Some(existing) = self.store.open_ticket_for_user(guild_id, opener.user_id).await? {
			return Err(TicketError::AlreadyOpen(existing.get_channel_id()));
		}

		let channel_name = ticket_channel_name(category, &opener.name);
		let overwrites = opened_channel_overwrites(guild_id, opener.user_id, config.get_staff_role());
		let channel_id = self
			.platform
			.create_ticket_channel(guild_id, &channel_name, parent_id, &overwrites)
			.await?;

		let ticket = Ticket {
			channel_id: database_id_from_discord_id(channel_id.get()),
			guild_id: database_id_from_discord_id(guild_id.get()),
			user_id: database_id_from_discord_id(opener.user_id.get()),
			claimer: None,
			category,
			status: TicketStatus::Open,
			opened_at: Utc::now(),
			close_started_at: None,
		};
		let rejection = match self.store.insert_ticket(ticket.clone()).await {
			Ok(TicketInsertOutcome::Inserted) => None,
			Ok(TicketInsertOutcome::AlreadyOpen(existing)) => {
				Some((TicketError::AlreadyOpen(existing), "User already has an open ticket"))
			}
			Err(error) => Some((TicketError::from(error), "Ticket could not be recorded")),
		};
		if let Some((error, delete_reason)) = rejection {
			if let Err(delete_error) = self.platform.delete_channel(channel_id, delete_reason).await {
				tracing::error!(source = ?delete_error, %channel_id, "Failed to remove unrecorded ticket channel");
			}
			return Err(error);
		}

		if let Err(error) = self
			.platform
			.send_ticket_controls(channel_id, opener.user_id, category.name())
			.await
		{
			tracing::warn!(source = ?error, %channel_id, "Failed to post ticket controls");
		}

		tracing::info!(%guild_id, %channel_id, opener = %opener.user_id, ?category, "Opened ticket");
		Ok(ticket)
	}

	pub async fn claim_ticket(&self, channel_id: Id<ChannelMarker>, claimer: &Actor) -> Result<Ticket, TicketError> {
		let Some(ticket) = self.store.ticket(channel_id).await? else {
			return Err(TicketError::NotFound(MissingRecord::Ticket));
		};
		let Some(config) = self.store.guild_config(ticket.get_guild_id()).await? else {
			return Err(TicketError::NotFound(MissingRecord::GuildConfig));
		};
		if !claimer.has_role(config.get_staff_role()) {
			return Err(TicketError::Unauthorized);
		}

		let ticket = match self.store.claim_ticket(channel_id, claimer.user_id).await? {
			ClaimOutcome::Claimed(ticket) => ticket,
			ClaimOutcome::AlreadyClaimed(staff_id) => return Err(TicketError::AlreadyClaimed(staff_id)),
			ClaimOutcome::NotOpen => return Err(TicketError::Closing),
			ClaimOutcome::Missing => return Err(TicketError::NotFound(MissingRecord::Ticket)),
		};

		let appeal_category = config.get_punishment_appeal_category();
		let hide_from_staff = match self.platform.channel_details(channel_id).await {
			Ok(details) => appeal_category.is_some() && details.parent_id == appeal_category,
			Err(error) => {
				tracing::warn!(source = ?error, %channel_id, "Couldn't look up ticket channel; using the recorded category");
				ticket.category == TicketCategory::PunishmentAppeal
			}
		};
		let overwrites = claimed_channel_overwrites(
			ticket.get_guild_id(),
			ticket.get_user_id(),
			claimer.user_id,
			config.get_staff_role(),
			hide_from_staff,
		);
		if let Err(error) = self.platform.set_permission_overwrites(channel_id, &overwrites).await {
			tracing::warn!(source = ?error, %channel_id, "Couldn't restrict claimed ticket; releasing the claim");
			if let Err(release_error) = self.store.release_claim(channel_id, claimer.user_id).await {
				tracing::error!(source = ?release_error, %channel_id, "Failed to release claim on unrestricted ticket");
			}
			return Err(error.into());
		}

		tracing::info!(%channel_id, claimer = %claimer.user_id, "Ticket claimed");
		Ok(ticket)
	}

	/// Checks that the close can go ahead. Nothing is changed; this is quick enough to run before the interaction is
	/// acknowledged.
	pub async fn authorize_close(
		&self,
		channel_id: Id<ChannelMarker>,
		closer: Actor,
		reason: Option<String>,
	) -> Result<PendingClose, TicketError> {
		let Some(ticket) = self.store.ticket(channel_id).await? else {
			return Err(TicketError::NotFound(MissingRecord::Ticket));
		};
		let Some(config) = self.store.guild_config(ticket.get_guild_id()).await? else {
			return Err(TicketError::NotFound(MissingRecord::GuildConfig));
		};
		if !closer.has_role(config.get_staff_role()) {
			return Err(TicketError::Unauthorized);
		}
		if ticket.close_running_since(stale_close_cutoff()) {
			return Err(TicketError::Closing);
		}

		let reason = reason
			.map(|reason| reason.trim().to_string())
			.filter(|reason| !reason.is_empty())
			.unwrap_or_else(|| String::from(DEFAULT_CLOSE_REASON));
		Ok(PendingClose {
			ticket,
			config,
			closer,
			reason,
		})
	}

	/// Closes the ticket: delivers the transcript, credits the claimer, and deletes the ticket record and channel.
	///
	/// Only one close of a ticket runs at a time; a second close started meanwhile gets [TicketError::Closing]. Nothing
	/// is rolled back on failure. A close left unfinished for a while can be taken over by closing again, and one that
	/// already delivered its transcript resumes straight at deletion.
	pub async fn close_ticket(&self, pending: PendingClose) -> Result<CloseReport, TicketError> {
		let channel_id = pending.ticket.get_channel_id();
		let ticket = match self.store.begin_close(channel_id, stale_close_cutoff()).await? {
			CloseStart::Started(ticket) | CloseStart::DeletePending(ticket) => ticket,
			CloseStart::InProgress => return Err(TicketError::Closing),
			CloseStart::Missing => return Err(TicketError::NotFound(MissingRecord::Ticket)),
		};

		let details = match self.platform.channel_details(channel_id).await {
			Ok(details) => details,
			Err(error) => {
				tracing::warn!(source = ?error, %channel_id, "Couldn't look up ticket channel details");
				ChannelDetails {
					name: format!("ticket-{}", channel_id),
					..ChannelDetails::default()
				}
			}
		};
		let mut report = CloseReport::new(details.name.clone());

		let transcript = if ticket.status == TicketStatus::PendingDelete {
			report.resumed = true;
			None
		} else {
			let lines = collect_transcript(&*self.platform, channel_id, &self.transcripts).await;
			report.transcript_lines = lines.len();
			let header = TranscriptHeader {
				channel_name: &details.name,
				closer: &pending.closer.name,
				reason: &pending.reason,
			};
			let rendered = render_transcript(&header, &lines);
			Some(TranscriptFile::write(&self.transcripts.directory, &details.name, rendered, Utc::now()).await?)
		};

		let result = self
			.finish_close(&pending, &ticket, &details, transcript.as_ref(), &mut report)
			.await;
		if let Some(transcript) = &transcript {
			report.transcript_cleanup = Delivery::from_result(transcript.remove().await, "remove transcript file");
		}
		result?;

		tracing::info!(%channel_id, closer = %pending.closer.user_id, ?report, "Closed ticket");
		Ok(report)
	}

	async fn finish_close(
		&self,
		pending: &PendingClose,
		ticket: &Ticket,
		details: &ChannelDetails,
		transcript: Option<&TranscriptFile>,
		report: &mut CloseReport,
	) -> Result<(), TicketError> {
		let channel_id = ticket.get_channel_id();

		if let Some(transcript) = transcript {
			let summary = CloseSummary {
				ticket_name: details.name.clone(),
				ticket_type: details
					.parent_name
					.clone()
					.unwrap_or_else(|| ticket.category.name().to_string()),
				closer_name: pending.closer.name.clone(),
				reason: pending.reason.clone(),
			};

			let notice = format!(
				"This ticket has been closed by {}. Deleting channel...",
				pending.closer.user_id.mention()
			);
			report.closing_notice = Delivery::from_result(
				self.platform.send_notice(channel_id, &notice).await,
				"post closing notice",
			);

			report.log_post = match pending.config.get_transcript_channel() {
				Some(log_channel) => Delivery::from_result(
					self.platform.post_transcript(log_channel, &summary, transcript).await,
					"post transcript to log channel",
				),
				None => Delivery::Skipped("no transcript channel configured"),
			};

			report.opener_dm = Delivery::from_result(
				self.platform
					.send_transcript_dm(ticket.get_user_id(), &summary, transcript)
					.await,
				"send transcript to ticket opener",
			);

			self.credit_claimer(pending, ticket, details, report).await?;
			self.store.mark_pending_delete(channel_id).await?;
		} else {
			report.points_notice = Delivery::Skipped("close resumed after transcript delivery");
		}

		self.store.delete_ticket(channel_id).await?;

		let reason = audit_reason(&pending.closer.name, &pending.reason);
		self.platform.delete_channel(channel_id, &reason).await?;
		Ok(())
	}

	async fn credit_claimer(
		&self,
		pending: &PendingClose,
		ticket: &Ticket,
		details: &ChannelDetails,
		report: &mut CloseReport,
	) -> Result<(), TicketError> {
		let Some(staff_id) = ticket.get_claimer() else {
			report.points = PointsCredit::Unclaimed;
			report.points_notice = Delivery::Skipped("ticket was never claimed");
			return Ok(());
		};

		match self.store.award_point(staff_id, ticket.get_channel_id()).await? {
			PointAwardOutcome::Awarded { total } => {
				report.points = PointsCredit::Awarded { staff_id, total };
				report.points_notice = match pending.config.get_points_log_channel() {
					Some(points_channel) => {
						let notice = PointsNotice {
							staff_id,
							ticket_name: details.name.clone(),
							total_points: total,
						};
						Delivery::from_result(
							self.platform.post_points_notice(points_channel, &notice).await,
							"post staff points notice",
						)
					}
					None => Delivery::Skipped("no points log channel configured"),
				};
			}
			PointAwardOutcome::AlreadyAwarded { total } => {
				report.points = PointsCredit::AlreadyAwarded { staff_id, total };
				report.points_notice = Delivery::Skipped("point already awarded for this ticket");
			}
		}
		Ok(())
	}

	/// Checks that the user may post the ticket panel, which is reserved for high staff.
	pub async fn authorize_panel(&self, guild_id: Id<GuildMarker>, actor: &Actor) -> Result<(), TicketError> {
		let Some(config) = self.store.guild_config(guild_id).await? else {
			return Err(TicketError::NotFound(MissingRecord::GuildConfig));
		};
		if !actor.has_role(config.get_high_staff_role()) {
			return Err(TicketError::Unauthorized);
		}
		Ok(())
	}

	pub async fn staff_points(&self, staff_id: Id<UserMarker>) -> Result<i32, TicketError> {
		Ok(self.store.staff_points(staff_id).await?)
	}

	/// Gets tickets whose close started but didn't finish, so they can be reported.
	pub async fn interrupted_closes(&self) -> Result<Vec<Ticket>, TicketError> {
		Ok(self.store.interrupted_closes().await?)
	}
}

/// Builds the channel name for a new ticket from its category and the opener's username.
pub fn ticket_channel_name(category: TicketCategory, username: &str) -> String {
	let mut user_part = String::new();
	for c in username.chars().flat_map(char::to_lowercase) {
		if c.is_alphanumeric() || c == '_' {
			user_part.push(c);
		} else if !user_part.ends_with('-') {
			user_part.push('-');
		}
	}
	let user_part = user_part.trim_matches('-');
	let user_part = if user_part.is_empty() { "user" } else { user_part };

	let name = format!("{}-{}", category.channel_prefix(), user_part);
	name.chars().take(MAX_CHANNEL_NAME_LENGTH).collect()
}

/// Closes that started before this time are treated as abandoned.
fn stale_close_cutoff() -> DateTime<Utc> {
	Utc::now() - TimeDelta::minutes(STALE_CLOSE_MINUTES)
}

fn audit_reason(closer_name: &str, reason: &str) -> String {
	let full = format!("Ticket closed by {} | Reason: {}", closer_name, reason);
	full.chars().take(MAX_AUDIT_REASON_LENGTH).collect()
}
