// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::schema::{guild_configs, point_awards, staff_points, tickets};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_derive_enum::DbEnum;
use twilight_model::id::Id;
use twilight_model::id::marker::{ChannelMarker, GuildMarker, RoleMarker, UserMarker};

/// Progress of a ticket through its lifecycle.
///
/// A closed ticket has no row at all; the non-open states are checkpoints in the close flow so that an interrupted
/// close can be detected and resumed.
#[derive(Clone, Copy, DbEnum, Debug, Eq, PartialEq)]
#[ExistingTypePath = "crate::schema::sql_types::TicketStatus"]
pub enum TicketStatus {
	Open,
	PendingTranscript,
	PendingDelete,
}

/// The kind of ticket a user opened from the ticket panel
#[derive(Clone, Copy, DbEnum, Debug, Eq, PartialEq)]
#[ExistingTypePath = "crate::schema::sql_types::TicketCategory"]
pub enum TicketCategory {
	GiveawayClaim,
	PunishmentAppeal,
	Other,
}

impl TicketCategory {
	pub fn all_categories() -> [Self; 3] {
		[Self::GiveawayClaim, Self::PunishmentAppeal, Self::Other]
	}

	pub fn from_id(id: &str) -> Option<Self> {
		match id {
			"giveaway_claim" => Some(Self::GiveawayClaim),
			"punish_appeal" => Some(Self::PunishmentAppeal),
			"other_ticket" => Some(Self::Other),
			_ => None,
		}
	}

	pub fn as_id(&self) -> &'static str {
		match self {
			Self::GiveawayClaim => "giveaway_claim",
			Self::PunishmentAppeal => "punish_appeal",
			Self::Other => "other_ticket",
		}
	}

	pub fn name(&self) -> &'static str {
		match self {
			Self::GiveawayClaim => "Giveaway Claim",
			Self::PunishmentAppeal => "Punishment Appeal",
			Self::Other => "Other",
		}
	}

	pub fn description(&self) -> &'static str {
		match self {
			Self::GiveawayClaim => "Select this if you won a giveaway.",
			Self::PunishmentAppeal => "Select this if you want to appeal a punishment.",
			Self::Other => "Select this if your issue is not listed above.",
		}
	}

	/// Prefix used for the names of ticket channels in this category
	pub fn channel_prefix(&self) -> &'static str {
		match self {
			Self::GiveawayClaim => "giveaway",
			Self::PunishmentAppeal => "appeal",
			Self::Other => "ticket",
		}
	}
}

/// A guild's ticket settings.
///
/// Rows are written by whoever administers the bot; the ticket flows only read them.
#[derive(Clone, Debug, Insertable, Queryable)]
pub struct GuildConfig {
	/// The ID of the guild.
	///
	/// To get a Discord-facing version of this more easily, use [Self::get_guild_id].
	pub guild_id: i64,
	/// The ID of the role all staff have.
	///
	/// To get a Discord-facing version of this more easily, use [Self::get_staff_role].
	pub staff_role: i64,
	/// The ID of the role senior staff have. Only they may post ticket panels.
	///
	/// To get a Discord-facing version of this more easily, use [Self::get_high_staff_role].
	pub high_staff_role: i64,
	/// The ID of the channel that receives ticket transcripts, if any.
	pub transcript_channel: Option<i64>,
	/// The ID of the channel that receives staff point notices, if any.
	pub points_log_channel: Option<i64>,
	/// The ID of the channel category giveaway claim tickets are created in, if enabled.
	pub giveaway_category: Option<i64>,
	/// The ID of the channel category punishment appeal tickets are created in, if enabled.
	pub punishment_appeal_category: Option<i64>,
	/// The ID of the channel category other tickets are created in, if enabled.
	pub other_category: Option<i64>,
}

impl GuildConfig {
	pub fn get_guild_id(&self) -> Id<GuildMarker> {
		Id::new(discord_id_from_database_id(self.guild_id))
	}

	pub fn get_staff_role(&self) -> Id<RoleMarker> {
		Id::new(discord_id_from_database_id(self.staff_role))
	}

	pub fn get_high_staff_role(&self) -> Id<RoleMarker> {
		Id::new(discord_id_from_database_id(self.high_staff_role))
	}

	pub fn get_transcript_channel(&self) -> Option<Id<ChannelMarker>> {
		optional_discord_id(self.transcript_channel)
	}

	pub fn get_points_log_channel(&self) -> Option<Id<ChannelMarker>> {
		optional_discord_id(self.points_log_channel)
	}

	pub fn get_punishment_appeal_category(&self) -> Option<Id<ChannelMarker>> {
		optional_discord_id(self.punishment_appeal_category)
	}

	/// Gets the channel category tickets of the given kind are created in, or `None` if that kind of ticket isn't
	/// enabled for the guild.
	pub fn get_category_channel(&self, category: TicketCategory) -> Option<Id<ChannelMarker>> {
		let database_id = match category {
			TicketCategory::GiveawayClaim => self.giveaway_category,
			TicketCategory::PunishmentAppeal => self.punishment_appeal_category,
			TicketCategory::Other => self.other_category,
		};
		optional_discord_id(database_id)
	}
}

/// The database representation of an open (or closing) ticket channel
#[derive(Clone, Debug, Insertable, Queryable)]
pub struct Ticket {
	/// The ticket channel's ID; one ticket per channel.
	///
	/// To get a Discord-facing version of this more easily, use [Self::get_channel_id].
	pub channel_id: i64,
	/// The ID of the guild the ticket is in.
	pub guild_id: i64,
	/// The ID of the user who opened the ticket.
	///
	/// To get a Discord-facing version of this more easily, use [Self::get_user_id].
	pub user_id: i64,
	/// The staff member who claimed the ticket, if anyone has.
	pub claimer: Option<i64>,
	pub category: TicketCategory,
	pub status: TicketStatus,
	pub opened_at: DateTime<Utc>,
	/// When the current close attempt started. Set while the ticket is closing.
	pub close_started_at: Option<DateTime<Utc>>,
}

impl Ticket {
	pub fn get_channel_id(&self) -> Id<ChannelMarker> {
		Id::new(discord_id_from_database_id(self.channel_id))
	}

	pub fn get_guild_id(&self) -> Id<GuildMarker> {
		Id::new(discord_id_from_database_id(self.guild_id))
	}

	pub fn get_user_id(&self) -> Id<UserMarker> {
		Id::new(discord_id_from_database_id(self.user_id))
	}

	pub fn get_claimer(&self) -> Option<Id<UserMarker>> {
		optional_discord_id(self.claimer)
	}

	/// Whether a close is in progress that started at or after `stale_before`. Older closes are treated as abandoned
	/// and may be taken over.
	pub fn close_running_since(&self, stale_before: DateTime<Utc>) -> bool {
		self.status != TicketStatus::Open && self.close_started_at.is_some_and(|started| started >= stale_before)
	}
}

/// A staff member's running point total
#[derive(Clone, Debug, Insertable, Queryable)]
#[diesel(table_name = staff_points)]
pub struct StaffPoints {
	pub staff_id: i64,
	pub points: i32,
}

/// Record of the point awarded for closing a ticket. At most one exists per ticket channel.
#[derive(Clone, Debug, Insertable, Queryable)]
pub struct PointAward {
	pub ticket_channel: i64,
	pub staff_id: i64,
	pub awarded_at: DateTime<Utc>,
}

/// Converts an ID used with Discord (unsigned) to an ID for Postgres use (signed)
pub fn database_id_from_discord_id(discord_id: u64) -> i64 {
	discord_id as i64
}

/// Converts an ID retrieved from the database (signed) to an ID for use with Discord (unsigned)
pub fn discord_id_from_database_id(database_id: i64) -> u64 {
	database_id as u64
}

fn optional_discord_id<T>(database_id: Option<i64>) -> Option<Id<T>> {
	database_id.and_then(|id| Id::new_checked(discord_id_from_database_id(id)))
}
