// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::BotTicketController;
use miette::bail;
use twilight_http::client::Client;
use twilight_model::application::interaction::message_component::MessageComponentInteractionData;
use twilight_model::application::interaction::modal::ModalInteractionData;
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_model::id::Id;
use twilight_model::id::marker::ApplicationMarker;

mod claim;
mod close;
mod open;

pub use close::close_ticket_channel;

pub async fn route_interaction(
	interaction: &InteractionCreate,
	interaction_data: &MessageComponentInteractionData,
	http_client: &Client,
	application_id: Id<ApplicationMarker>,
	controller: &BotTicketController,
) -> miette::Result<()> {
	let custom_id_path: Vec<&str> = interaction_data.custom_id.split('/').collect();

	match custom_id_path.as_slice() {
		["ticket", "open"] => {
			open::handle_open_selection(interaction, interaction_data, http_client, application_id, controller).await
		}
		["ticket", "claim"] => claim::handle_claim_button(interaction, http_client, application_id, controller).await,
		["ticket", "close"] => close::handle_close_button(interaction, http_client, application_id, controller).await,
		_ => bail!("Unknown component interaction: {}", interaction_data.custom_id),
	}
}

pub async fn route_modal_submit(
	interaction: &InteractionCreate,
	modal_data: &ModalInteractionData,
	http_client: &Client,
	application_id: Id<ApplicationMarker>,
	controller: &BotTicketController,
) -> miette::Result<()> {
	let custom_id_path: Vec<&str> = modal_data.custom_id.split('/').collect();

	match custom_id_path.as_slice() {
		["ticket", "close_reason"] => {
			close::handle_close_reason_modal(interaction, modal_data, http_client, application_id, controller).await
		}
		_ => bail!("Unknown modal submitted: {}", modal_data.custom_id),
	}
}
