// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use miette::Diagnostic;
use std::fmt;
use twilight_mention::fmt::Mention;
use twilight_model::id::Id;
use twilight_model::id::marker::{ChannelMarker, UserMarker};

/// The record a ticket operation needed but couldn't find
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MissingRecord {
	Ticket,
	GuildConfig,
}

/// Reasons a ticket operation didn't go through.
///
/// Everything except [TicketError::Unexpected] is a user-facing rejection that happened before any state changed.
#[derive(Debug, Diagnostic)]
pub enum TicketError {
	NotFound(MissingRecord),
	Unauthorized,
	AlreadyClaimed(Id<UserMarker>),
	Closing,
	CategoryUnavailable,
	AlreadyOpen(Id<ChannelMarker>),
	Unexpected(miette::Report),
}

impl TicketError {
	/// Message shown to the user whose interaction failed
	pub fn user_message(&self) -> String {
		match self {
			Self::NotFound(MissingRecord::Ticket) => String::from("This isn't a valid ticket channel."),
			Self::NotFound(MissingRecord::GuildConfig) => String::from("The ticket system isn't set up on this server."),
			Self::Unauthorized => String::from("You don't have permission to do that."),
			Self::AlreadyClaimed(_) => String::from("This ticket has already been claimed by a staff member."),
			Self::Closing => String::from("This ticket is already being closed."),
			Self::CategoryUnavailable => String::from("That type of ticket can't be opened on this server right now."),
			Self::AlreadyOpen(channel) => format!("You already have an open ticket: {}", channel.mention()),
			Self::Unexpected(_) => String::from("Something went wrong. Please try again."),
		}
	}
}

impl From<miette::Report> for TicketError {
	fn from(report: miette::Report) -> Self {
		Self::Unexpected(report)
	}
}

impl std::error::Error for TicketError {}

impl fmt::Display for TicketError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::NotFound(MissingRecord::Ticket) => write!(f, "no ticket exists for the channel"),
			Self::NotFound(MissingRecord::GuildConfig) => write!(f, "no ticket configuration exists for the guild"),
			Self::Unauthorized => write!(f, "the acting user lacks the required role"),
			Self::AlreadyClaimed(claimer) => write!(f, "the ticket is already claimed by {}", claimer),
			Self::Closing => write!(f, "the ticket is being closed"),
			Self::CategoryUnavailable => write!(f, "the ticket category isn't enabled for the guild"),
			Self::AlreadyOpen(channel) => write!(f, "the user already has an open ticket in {}", channel),
			Self::Unexpected(report) => write!(f, "unexpected failure: {}", report),
		}
	}
}
