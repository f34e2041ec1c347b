// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::discord::BotTicketController;
use crate::discord::utils::responses::{defer_ephemeral, ticket_error_message, update_deferred};
use crate::discord::utils::users::actor_from_interaction;
use crate::model::TicketCategory;
use miette::bail;
use twilight_http::client::Client;
use twilight_mention::fmt::Mention;
use twilight_model::application::interaction::message_component::MessageComponentInteractionData;
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_model::id::Id;
use twilight_model::id::marker::ApplicationMarker;

pub async fn handle_open_selection(
	interaction: &InteractionCreate,
	interaction_data: &MessageComponentInteractionData,
	http_client: &Client,
	application_id: Id<ApplicationMarker>,
	controller: &BotTicketController,
) -> miette::Result<()> {
	let Some(guild_id) = interaction.guild_id else {
		bail!("Ticket panel was used outside of a guild");
	};
	let Some(selected) = interaction_data.values.first() else {
		bail!("Ticket panel selection had no value");
	};
	let Some(category) = TicketCategory::from_id(selected) else {
		bail!("Unknown ticket type selected: {}", selected);
	};
	let opener = actor_from_interaction(interaction)?;

	let interaction_client = http_client.interaction(application_id);
	defer_ephemeral(interaction, &interaction_client).await?;

	let message = match controller.open_ticket(guild_id, &opener, category).await {
		Ok(ticket) => format!("Your ticket has been opened: {}", ticket.get_channel_id().mention()),
		Err(error) => ticket_error_message(&error, "open a ticket"),
	};
	update_deferred(interaction, &interaction_client, &message).await
}
