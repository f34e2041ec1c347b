// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::tickets::{CloseSummary, PointsNotice};
use chrono::Utc;
use twilight_mention::fmt::Mention;
use twilight_model::channel::message::embed::Embed;
use twilight_model::util::datetime::Timestamp;
use twilight_util::builder::embed::{EmbedBuilder, EmbedFieldBuilder};
use twilight_validate::embed::EmbedValidationError;

const TRANSCRIPT_EMBED_COLOR: u32 = 0x9b7dfb;
const POINTS_EMBED_COLOR: u32 = 0x57f287;
const PANEL_EMBED_COLOR: u32 = 0x000000;

/// Generates the embed sent alongside a transcript to the log channel and the ticket opener
pub fn close_summary_embed(summary: &CloseSummary) -> Result<Embed, EmbedValidationError> {
	let mut embed = EmbedBuilder::new()
		.title("Ticket Transcript")
		.color(TRANSCRIPT_EMBED_COLOR)
		.field(EmbedFieldBuilder::new("Ticket Name:", &summary.ticket_name))
		.field(EmbedFieldBuilder::new("Ticket Type:", &summary.ticket_type))
		.field(EmbedFieldBuilder::new("Ticket Closer:", &summary.closer_name))
		.field(EmbedFieldBuilder::new("Closing Reason:", &summary.reason));
	if let Ok(timestamp) = Timestamp::from_micros(Utc::now().timestamp_micros()) {
		embed = embed.timestamp(timestamp);
	}
	Ok(embed.validate()?.build())
}

pub fn points_notice_embed(notice: &PointsNotice) -> Result<Embed, EmbedValidationError> {
	let description = format!(
		"+1 point to {} for handling ticket **{}**",
		notice.staff_id.mention(),
		notice.ticket_name
	);
	let embed = EmbedBuilder::new()
		.title("Staff Point Awarded")
		.description(description)
		.color(POINTS_EMBED_COLOR)
		.field(EmbedFieldBuilder::new("Total Points", notice.total_points.to_string()))
		.validate()?
		.build();
	Ok(embed)
}

/// Generates the embed introducing a new ticket above its controls
pub fn ticket_welcome_embed(category_name: &str) -> Result<Embed, EmbedValidationError> {
	let embed = EmbedBuilder::new()
		.title(format!("{} Ticket", category_name))
		.description("Thanks for reaching out! A staff member will claim this ticket shortly.")
		.validate()?
		.build();
	Ok(embed)
}

pub fn ticket_panel_embed() -> Result<Embed, EmbedValidationError> {
	let embed = EmbedBuilder::new()
		.title("Ticket Options")
		.description("Choose the type of ticket that fits your request from the menu below.")
		.color(PANEL_EMBED_COLOR)
		.validate()?
		.build();
	Ok(embed)
}
