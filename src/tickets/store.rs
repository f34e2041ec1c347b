// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::database::DbPool;
use crate::model::{
	GuildConfig, PointAward, StaffPoints, Ticket, TicketStatus, database_id_from_discord_id,
	discord_id_from_database_id,
};
use crate::schema::{guild_configs, point_awards, staff_points, tickets};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DbError};
use miette::{IntoDiagnostic, bail};
use twilight_model::id::Id;
use twilight_model::id::marker::{ChannelMarker, GuildMarker, UserMarker};

/// Result of trying to set the claimer of a ticket
#[derive(Debug)]
pub enum ClaimOutcome {
	Claimed(Ticket),
	AlreadyClaimed(Id<UserMarker>),
	/// The ticket exists but is partway through being closed
	NotOpen,
	Missing,
}

/// Name of the index allowing only one open ticket per user in each guild
const ONE_OPEN_TICKET_INDEX: &str = "tickets_one_open_per_user";

/// Result of recording a newly opened ticket
#[derive(Debug)]
pub enum TicketInsertOutcome {
	Inserted,
	/// The user already has an open ticket in this guild
	AlreadyOpen(Id<ChannelMarker>),
}

/// Result of trying to start closing a ticket
#[derive(Debug)]
pub enum CloseStart {
	/// This call now owns the close. The ticket was either open or its earlier close had gone stale.
	Started(Ticket),
	/// This call took over a stale close whose transcript was already delivered; only deletion remains.
	DeletePending(Ticket),
	/// Another close of this ticket started recently and may still be running
	InProgress,
	Missing,
}

/// Result of crediting a staff member for a closed ticket
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PointAwardOutcome {
	Awarded { total: i32 },
	/// A point was already awarded for this ticket (for example, by an earlier attempt to close it)
	AlreadyAwarded { total: i32 },
}

#[async_trait]
pub trait GuildConfigStore: Send + Sync {
	async fn guild_config(&self, guild_id: Id<GuildMarker>) -> miette::Result<Option<GuildConfig>>;
}

#[async_trait]
pub trait TicketStore: Send + Sync {
	async fn ticket(&self, channel_id: Id<ChannelMarker>) -> miette::Result<Option<Ticket>>;

	/// Gets the open ticket the user has in the guild, if any.
	async fn open_ticket_for_user(
		&self,
		guild_id: Id<GuildMarker>,
		user_id: Id<UserMarker>,
	) -> miette::Result<Option<Ticket>>;

	/// Records a new ticket unless the user already has an open one in the guild. The check is enforced by the
	/// store, so two opens racing each other can't both be recorded.
	async fn insert_ticket(&self, ticket: Ticket) -> miette::Result<TicketInsertOutcome>;

	/// Sets the claimer only if the ticket is open and nobody has claimed it yet. The check and the write happen as
	/// one operation, so two staff members claiming at once can't both succeed.
	async fn claim_ticket(
		&self,
		channel_id: Id<ChannelMarker>,
		staff_id: Id<UserMarker>,
	) -> miette::Result<ClaimOutcome>;

	/// Clears the claimer, but only if it's still `staff_id`. Returns whether the claim was released.
	async fn release_claim(&self, channel_id: Id<ChannelMarker>, staff_id: Id<UserMarker>) -> miette::Result<bool>;

	/// Starts closing the ticket. An open ticket moves to [TicketStatus::PendingTranscript]. A ticket already closing
	/// is only taken over if its close started before `stale_before`; otherwise the close is reported as in progress.
	/// Either way, the close start time is stamped in the same operation as the check.
	async fn begin_close(
		&self,
		channel_id: Id<ChannelMarker>,
		stale_before: DateTime<Utc>,
	) -> miette::Result<CloseStart>;

	async fn mark_pending_delete(&self, channel_id: Id<ChannelMarker>) -> miette::Result<()>;

	/// Deletes the ticket record, returning whether one existed.
	async fn delete_ticket(&self, channel_id: Id<ChannelMarker>) -> miette::Result<bool>;

	/// Gets tickets whose close was started but never finished.
	async fn interrupted_closes(&self) -> miette::Result<Vec<Ticket>>;
}

#[async_trait]
pub trait StaffPointsStore: Send + Sync {
	/// Awards one point to the staff member for the ticket. Awarding for the same ticket again changes nothing.
	async fn award_point(
		&self,
		staff_id: Id<UserMarker>,
		ticket_channel: Id<ChannelMarker>,
	) -> miette::Result<PointAwardOutcome>;

	async fn staff_points(&self, staff_id: Id<UserMarker>) -> miette::Result<i32>;
}

/// All of the stores the ticket flows use
pub trait TicketStores: TicketStore + GuildConfigStore + StaffPointsStore {}

impl<T: TicketStore + GuildConfigStore + StaffPointsStore> TicketStores for T {}

/// Postgres-backed implementation of the ticket stores
#[derive(Clone)]
pub struct DatabaseStore {
	db_connection_pool: DbPool,
}

impl DatabaseStore {
	pub fn new(db_connection_pool: DbPool) -> Self {
		Self { db_connection_pool }
	}
}

#[async_trait]
impl GuildConfigStore for DatabaseStore {
	async fn guild_config(&self, guild_id: Id<GuildMarker>) -> miette::Result<Option<GuildConfig>> {
		let mut db_connection = self.db_connection_pool.get().into_diagnostic()?;
		guild_configs::table
			.find(database_id_from_discord_id(guild_id.get()))
			.first(&mut db_connection)
			.optional()
			.into_diagnostic()
	}
}

#[async_trait]
impl TicketStore for DatabaseStore {
	async fn ticket(&self, channel_id: Id<ChannelMarker>) -> miette::Result<Option<Ticket>> {
		let mut db_connection = self.db_connection_pool.get().into_diagnostic()?;
		tickets::table
			.find(database_id_from_discord_id(channel_id.get()))
			.first(&mut db_connection)
			.optional()
			.into_diagnostic()
	}

	async fn open_ticket_for_user(
		&self,
		guild_id: Id<GuildMarker>,
		user_id: Id<UserMarker>,
	) -> miette::Result<Option<Ticket>> {
		let mut db_connection = self.db_connection_pool.get().into_diagnostic()?;
		tickets::table
			.filter(
				tickets::guild_id
					.eq(database_id_from_discord_id(guild_id.get()))
					.and(tickets::user_id.eq(database_id_from_discord_id(user_id.get())))
					.and(tickets::status.eq(TicketStatus::Open)),
			)
			.first(&mut db_connection)
			.optional()
			.into_diagnostic()
	}

	async fn insert_ticket(&self, ticket: Ticket) -> miette::Result<TicketInsertOutcome> {
		let mut db_connection = self.db_connection_pool.get().into_diagnostic()?;
		let (db_guild_id, db_user_id) = (ticket.guild_id, ticket.user_id);

		let insert_result = diesel::insert_into(tickets::table)
			.values(ticket)
			.execute(&mut db_connection);
		match insert_result {
			Ok(_) => Ok(TicketInsertOutcome::Inserted),
			Err(DbError::DatabaseError(DatabaseErrorKind::UniqueViolation, info))
				if info.constraint_name() == Some(ONE_OPEN_TICKET_INDEX) =>
			{
				let existing: Option<i64> = tickets::table
					.filter(
						tickets::guild_id
							.eq(db_guild_id)
							.and(tickets::user_id.eq(db_user_id))
							.and(tickets::status.eq(TicketStatus::Open)),
					)
					.select(tickets::channel_id)
					.first(&mut db_connection)
					.optional()
					.into_diagnostic()?;
				match existing {
					Some(channel_id) => Ok(TicketInsertOutcome::AlreadyOpen(Id::new(discord_id_from_database_id(
						channel_id,
					)))),
					None => bail!("open ticket conflicted on insert but is no longer open"),
				}
			}
			Err(error) => bail!(error),
		}
	}

	async fn claim_ticket(
		&self,
		channel_id: Id<ChannelMarker>,
		staff_id: Id<UserMarker>,
	) -> miette::Result<ClaimOutcome> {
		let mut db_connection = self.db_connection_pool.get().into_diagnostic()?;
		let db_channel_id = database_id_from_discord_id(channel_id.get());
		let db_staff_id = database_id_from_discord_id(staff_id.get());

		let claimed: Option<Ticket> = diesel::update(tickets::table)
			.filter(
				tickets::channel_id
					.eq(db_channel_id)
					.and(tickets::claimer.is_null())
					.and(tickets::status.eq(TicketStatus::Open)),
			)
			.set(tickets::claimer.eq(Some(db_staff_id)))
			.get_result(&mut db_connection)
			.optional()
			.into_diagnostic()?;
		if let Some(ticket) = claimed {
			return Ok(ClaimOutcome::Claimed(ticket));
		}

		let ticket: Option<Ticket> = tickets::table
			.find(db_channel_id)
			.first(&mut db_connection)
			.optional()
			.into_diagnostic()?;
		Ok(match ticket {
			None => ClaimOutcome::Missing,
			Some(ticket) => match ticket.claimer {
				Some(claimer) => ClaimOutcome::AlreadyClaimed(Id::new(discord_id_from_database_id(claimer))),
				None => ClaimOutcome::NotOpen,
			},
		})
	}

	async fn release_claim(&self, channel_id: Id<ChannelMarker>, staff_id: Id<UserMarker>) -> miette::Result<bool> {
		let mut db_connection = self.db_connection_pool.get().into_diagnostic()?;
		let released = diesel::update(tickets::table)
			.filter(
				tickets::channel_id
					.eq(database_id_from_discord_id(channel_id.get()))
					.and(tickets::claimer.eq(database_id_from_discord_id(staff_id.get()))),
			)
			.set(tickets::claimer.eq(None::<i64>))
			.execute(&mut db_connection)
			.into_diagnostic()?;
		Ok(released > 0)
	}

	async fn begin_close(
		&self,
		channel_id: Id<ChannelMarker>,
		stale_before: DateTime<Utc>,
	) -> miette::Result<CloseStart> {
		let mut db_connection = self.db_connection_pool.get().into_diagnostic()?;
		let db_channel_id = database_id_from_discord_id(channel_id.get());
		let now = Utc::now();

		let started: Option<Ticket> = diesel::update(tickets::table)
			.filter(
				tickets::channel_id
					.eq(db_channel_id)
					.and(tickets::status.eq(TicketStatus::Open)),
			)
			.set((
				tickets::status.eq(TicketStatus::PendingTranscript),
				tickets::close_started_at.eq(Some(now)),
			))
			.get_result(&mut db_connection)
			.optional()
			.into_diagnostic()?;
		if let Some(ticket) = started {
			return Ok(CloseStart::Started(ticket));
		}

		let taken_over: Option<Ticket> = diesel::update(tickets::table)
			.filter(
				tickets::channel_id
					.eq(db_channel_id)
					.and(tickets::status.ne(TicketStatus::Open))
					.and(
						tickets::close_started_at
							.is_null()
							.or(tickets::close_started_at.lt(stale_before)),
					),
			)
			.set(tickets::close_started_at.eq(Some(now)))
			.get_result(&mut db_connection)
			.optional()
			.into_diagnostic()?;
		if let Some(ticket) = taken_over {
			return Ok(match ticket.status {
				TicketStatus::PendingDelete => CloseStart::DeletePending(ticket),
				_ => CloseStart::Started(ticket),
			});
		}

		let exists = tickets::table
			.find(db_channel_id)
			.select(tickets::channel_id)
			.first::<i64>(&mut db_connection)
			.optional()
			.into_diagnostic()?
			.is_some();
		Ok(if exists { CloseStart::InProgress } else { CloseStart::Missing })
	}

	async fn mark_pending_delete(&self, channel_id: Id<ChannelMarker>) -> miette::Result<()> {
		let mut db_connection = self.db_connection_pool.get().into_diagnostic()?;
		diesel::update(tickets::table)
			.filter(tickets::channel_id.eq(database_id_from_discord_id(channel_id.get())))
			.set(tickets::status.eq(TicketStatus::PendingDelete))
			.execute(&mut db_connection)
			.into_diagnostic()?;
		Ok(())
	}

	async fn delete_ticket(&self, channel_id: Id<ChannelMarker>) -> miette::Result<bool> {
		let mut db_connection = self.db_connection_pool.get().into_diagnostic()?;
		let deleted = diesel::delete(tickets::table)
			.filter(tickets::channel_id.eq(database_id_from_discord_id(channel_id.get())))
			.execute(&mut db_connection)
			.into_diagnostic()?;
		Ok(deleted > 0)
	}

	async fn interrupted_closes(&self) -> miette::Result<Vec<Ticket>> {
		let mut db_connection = self.db_connection_pool.get().into_diagnostic()?;
		tickets::table
			.filter(tickets::status.ne(TicketStatus::Open))
			.load(&mut db_connection)
			.into_diagnostic()
	}
}

#[async_trait]
impl StaffPointsStore for DatabaseStore {
	async fn award_point(
		&self,
		staff_id: Id<UserMarker>,
		ticket_channel: Id<ChannelMarker>,
	) -> miette::Result<PointAwardOutcome> {
		let mut db_connection = self.db_connection_pool.get().into_diagnostic()?;
		let db_staff_id = database_id_from_discord_id(staff_id.get());
		let award = PointAward {
			ticket_channel: database_id_from_discord_id(ticket_channel.get()),
			staff_id: db_staff_id,
			awarded_at: Utc::now(),
		};

		db_connection
			.transaction::<_, diesel::result::Error, _>(|db_connection| {
				let recorded = diesel::insert_into(point_awards::table)
					.values(&award)
					.on_conflict_do_nothing()
					.execute(db_connection)?;
				if recorded == 0 {
					let total: Option<i32> = staff_points::table
						.find(db_staff_id)
						.select(staff_points::points)
						.first(db_connection)
						.optional()?;
					return Ok(PointAwardOutcome::AlreadyAwarded {
						total: total.unwrap_or(0),
					});
				}

				let new_points = StaffPoints {
					staff_id: db_staff_id,
					points: 1,
				};
				let total: i32 = diesel::insert_into(staff_points::table)
					.values(&new_points)
					.on_conflict(staff_points::staff_id)
					.do_update()
					.set(staff_points::points.eq(staff_points::points + 1))
					.returning(staff_points::points)
					.get_result(db_connection)?;
				Ok(PointAwardOutcome::Awarded { total })
			})
			.into_diagnostic()
	}

	async fn staff_points(&self, staff_id: Id<UserMarker>) -> miette::Result<i32> {
		let mut db_connection = self.db_connection_pool.get().into_diagnostic()?;
		let points: Option<i32> = staff_points::table
			.find(database_id_from_discord_id(staff_id.get()))
			.select(staff_points::points)
			.first(&mut db_connection)
			.optional()
			.into_diagnostic()?;
		Ok(points.unwrap_or(0))
	}
}
