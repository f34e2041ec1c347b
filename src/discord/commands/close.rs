// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::discord::BotTicketController;
use crate::discord::interactions::close_ticket_channel;
use twilight_http::client::Client;
use twilight_model::application::command::{Command, CommandType};
use twilight_model::application::interaction::InteractionContextType;
use twilight_model::application::interaction::application_command::{CommandData, CommandOptionValue};
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_model::id::Id;
use twilight_model::id::marker::ApplicationMarker;
use twilight_util::builder::command::{CommandBuilder, StringBuilder};

const MAX_REASON_LENGTH: u16 = 1000;

pub fn command_definition() -> Command {
	let reason = StringBuilder::new("reason", "Why the ticket is being closed")
		.max_length(MAX_REASON_LENGTH)
		.required(false)
		.build();
	CommandBuilder::new("close", "Close this ticket", CommandType::ChatInput)
		.contexts([InteractionContextType::Guild])
		.option(reason)
		.build()
}

pub async fn handle_command(
	interaction: &InteractionCreate,
	command_data: &CommandData,
	http_client: &Client,
	application_id: Id<ApplicationMarker>,
	controller: &BotTicketController,
) -> miette::Result<()> {
	let reason = command_data
		.options
		.iter()
		.find(|option| option.name == "reason")
		.and_then(|option| match &option.value {
			CommandOptionValue::String(reason) => Some(reason.clone()),
			_ => None,
		});

	let interaction_client = http_client.interaction(application_id);
	close_ticket_channel(interaction, &interaction_client, controller, reason).await
}
