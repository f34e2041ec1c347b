// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::tickets::TicketError;
use miette::IntoDiagnostic;
use twilight_http::client::InteractionClient;
use twilight_model::channel::message::{AllowedMentions, MessageFlags};
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_model::http::interaction::{InteractionResponse, InteractionResponseType};
use twilight_util::builder::InteractionResponseDataBuilder;

pub const CLOSE_IN_PROGRESS: &str = "Closing the ticket. The transcript is being generated...";

/// Replies to the interaction with a message only the user can see.
pub async fn respond_ephemeral(
	interaction: &InteractionCreate,
	interaction_client: &InteractionClient<'_>,
	content: &str,
) -> miette::Result<()> {
	let response = InteractionResponseDataBuilder::new()
		.content(content)
		.flags(MessageFlags::EPHEMERAL)
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

/// Acknowledges the interaction with a private "thinking" state, to be filled in later with [update_deferred].
pub async fn defer_ephemeral(
	interaction: &InteractionCreate,
	interaction_client: &InteractionClient<'_>,
) -> miette::Result<()> {
	let response = InteractionResponseDataBuilder::new()
		.flags(MessageFlags::EPHEMERAL)
		.build();
	let response = InteractionResponse {
		kind: InteractionResponseType::DeferredChannelMessageWithSource,
		data: Some(response),
	};
	interaction_client
		.create_response(interaction.id, &interaction.token, &response)
		.await
		.into_diagnostic()?;
	Ok(())
}

pub async fn update_deferred(
	interaction: &InteractionCreate,
	interaction_client: &InteractionClient<'_>,
	content: &str,
) -> miette::Result<()> {
	interaction_client
		.update_response(&interaction.token)
		.content(Some(content))
		.await
		.into_diagnostic()?;
	Ok(())
}

/// Gets the message to show the user for a failed ticket action, logging failures the user can't do anything about.
pub fn ticket_error_message(error: &TicketError, action: &str) -> String {
	if let TicketError::Unexpected(report) = error {
		tracing::error!(source = ?report, "Failed to {}", action);
		return format!("Something went wrong while trying to {}. Please try again.", action);
	}
	error.user_message()
}
