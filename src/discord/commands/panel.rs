// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::discord::BotTicketController;
use crate::discord::utils::responses::{respond_ephemeral, ticket_error_message};
use crate::discord::utils::shared_components::ticket_panel_select;
use crate::discord::utils::tickets::ticket_panel_embed;
use crate::discord::utils::users::actor_from_interaction;
use miette::{IntoDiagnostic, bail};
use twilight_http::client::Client;
use twilight_model::application::command::{Command, CommandType};
use twilight_model::application::interaction::InteractionContextType;
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_model::id::Id;
use twilight_model::id::marker::ApplicationMarker;
use twilight_util::builder::command::CommandBuilder;

pub fn command_definition() -> Command {
	CommandBuilder::new(
		"panel",
		"Post the ticket panel in this channel",
		CommandType::ChatInput,
	)
	.contexts([InteractionContextType::Guild])
	.build()
}

pub async fn handle_command(
	interaction: &InteractionCreate,
	http_client: &Client,
	application_id: Id<ApplicationMarker>,
	controller: &BotTicketController,
) -> miette::Result<()> {
	let Some(guild_id) = interaction.guild_id else {
		bail!("Panel command was used outside of a guild");
	};
	let Some(channel) = &interaction.channel else {
		bail!("Panel command was used outside of a channel");
	};
	let actor = actor_from_interaction(interaction)?;

	let interaction_client = http_client.interaction(application_id);
	if let Err(error) = controller.authorize_panel(guild_id, &actor).await {
		let message = ticket_error_message(&error, "post the ticket panel");
		respond_ephemeral(interaction, &interaction_client, &message).await?;
		return Ok(());
	}

	let embed = ticket_panel_embed().into_diagnostic()?;
	http_client
		.create_message(channel.id)
		.embeds(&[embed])
		.components(&[ticket_panel_select()])
		.await
		.into_diagnostic()?;

	respond_ephemeral(interaction, &interaction_client, "Ticket panel posted.").await
}
