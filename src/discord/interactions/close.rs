// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::discord::BotTicketController;
use crate::discord::utils::responses::{CLOSE_IN_PROGRESS, respond_ephemeral, ticket_error_message, update_deferred};
use crate::discord::utils::shared_components::{CLOSE_REASON_INPUT_ID, CLOSE_REASON_MODAL_ID, close_reason_input};
use crate::discord::utils::users::actor_from_interaction;
use miette::{IntoDiagnostic, bail};
use twilight_http::client::{Client, InteractionClient};
use twilight_model::application::interaction::modal::ModalInteractionData;
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_model::http::interaction::{InteractionResponse, InteractionResponseType};
use twilight_model::id::Id;
use twilight_model::id::marker::ApplicationMarker;
use twilight_util::builder::InteractionResponseDataBuilder;

const CLOSE_ACTION: &str = "close the ticket";

/// Shows the close reason form, after checking the user could close the ticket at all.
pub async fn handle_close_button(
	interaction: &InteractionCreate,
	http_client: &Client,
	application_id: Id<ApplicationMarker>,
	controller: &BotTicketController,
) -> miette::Result<()> {
	let Some(channel) = &interaction.channel else {
		bail!("Close button was used outside of a channel");
	};
	let actor = actor_from_interaction(interaction)?;

	let interaction_client = http_client.interaction(application_id);
	if let Err(error) = controller.authorize_close(channel.id, actor, None).await {
		let message = ticket_error_message(&error, CLOSE_ACTION);
		respond_ephemeral(interaction, &interaction_client, &message).await?;
		return Ok(());
	}

	let response = InteractionResponseDataBuilder::new()
		.custom_id(CLOSE_REASON_MODAL_ID)
		.title("Close Ticket")
		.components([close_reason_input()])
		.build();
	let response = InteractionResponse {
		kind: InteractionResponseType::Modal,
		data: Some(response),
	};
	interaction_client
		.create_response(interaction.id, &interaction.token, &response)
		.await
		.into_diagnostic()?;

	Ok(())
}

pub async fn handle_close_reason_modal(
	interaction: &InteractionCreate,
	modal_data: &ModalInteractionData,
	http_client: &Client,
	application_id: Id<ApplicationMarker>,
	controller: &BotTicketController,
) -> miette::Result<()> {
	let mut reason: Option<String> = None;
	for row in modal_data.components.iter() {
		for component in row.components.iter() {
			if component.custom_id == CLOSE_REASON_INPUT_ID {
				reason = component.value.clone();
			}
		}
	}

	let interaction_client = http_client.interaction(application_id);
	close_ticket_channel(interaction, &interaction_client, controller, reason).await
}

/// Closes the ticket the interaction was used in. The interaction is acknowledged as soon as the close is authorized,
/// since building the transcript can outlast Discord's response window.
pub async fn close_ticket_channel(
	interaction: &InteractionCreate,
	interaction_client: &InteractionClient<'_>,
	controller: &BotTicketController,
	reason: Option<String>,
) -> miette::Result<()> {
	let Some(channel) = &interaction.channel else {
		bail!("Ticket close was requested outside of a channel");
	};
	let actor = actor_from_interaction(interaction)?;

	let pending = match controller.authorize_close(channel.id, actor, reason).await {
		Ok(pending) => pending,
		Err(error) => {
			let message = ticket_error_message(&error, CLOSE_ACTION);
			respond_ephemeral(interaction, interaction_client, &message).await?;
			return Ok(());
		}
	};
	respond_ephemeral(interaction, interaction_client, CLOSE_IN_PROGRESS).await?;

	if let Err(error) = controller.close_ticket(pending).await {
		let message = ticket_error_message(&error, CLOSE_ACTION);
		if let Err(update_error) = update_deferred(interaction, interaction_client, &message).await {
			tracing::warn!(source = ?update_error, "Couldn't report failed ticket close to the user");
		}
	}

	Ok(())
}
