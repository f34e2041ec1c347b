// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::discord::BotTicketController;
use crate::discord::utils::responses::{respond_ephemeral, ticket_error_message};
use crate::discord::utils::users::actor_from_interaction;
use miette::{IntoDiagnostic, bail};
use twilight_http::client::Client;
use twilight_mention::fmt::Mention;
use twilight_model::channel::message::AllowedMentions;
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_model::http::interaction::{InteractionResponse, InteractionResponseType};
use twilight_model::id::Id;
use twilight_model::id::marker::ApplicationMarker;
use twilight_util::builder::InteractionResponseDataBuilder;

pub async fn handle_claim_button(
	interaction: &InteractionCreate,
	http_client: &Client,
	application_id: Id<ApplicationMarker>,
	controller: &BotTicketController,
) -> miette::Result<()> {
	let Some(channel) = &interaction.channel else {
		bail!("Claim button was used outside of a channel");
	};
	let actor = actor_from_interaction(interaction)?;

	let interaction_client = http_client.interaction(application_id);
	let ticket = match controller.claim_ticket(channel.id, &actor).await {
		Ok(ticket) => ticket,
		Err(error) => {
			let message = ticket_error_message(&error, "claim the ticket");
			respond_ephemeral(interaction, &interaction_client, &message).await?;
			return Ok(());
		}
	};

	let content = format!(
		"{} has claimed this ticket and will be assisting {}.",
		actor.user_id.mention(),
		ticket.get_user_id().mention()
	);
	let response = InteractionResponseDataBuilder::new()
		.content(content)
		.allowed_mentions(AllowedMentions::default())
		.build();
	let response = InteractionResponse {
		kind: InteractionResponseType::ChannelMessageWithSource,
		data: Some(response),
	};
	interaction_client
		.create_response(interaction.id, &interaction.token, &response)
		.await
		.into_diagnostic()?;

	Ok(())
}
