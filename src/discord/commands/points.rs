// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::discord::BotTicketController;
use crate::discord::utils::responses::{respond_ephemeral, ticket_error_message};
use crate::discord::utils::users::actor_from_interaction;
use twilight_http::client::Client;
use twilight_mention::fmt::Mention;
use twilight_model::application::command::{Command, CommandType};
use twilight_model::application::interaction::InteractionContextType;
use twilight_model::application::interaction::application_command::{CommandData, CommandOptionValue};
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_model::id::Id;
use twilight_model::id::marker::ApplicationMarker;
use twilight_util::builder::command::{CommandBuilder, UserBuilder};

pub fn command_definition() -> Command {
	let user = UserBuilder::new("user", "The staff member to look up (defaults to you)")
		.required(false)
		.build();
	CommandBuilder::new(
		"points",
		"Show how many ticket points a staff member has",
		CommandType::ChatInput,
	)
	.contexts([InteractionContextType::Guild])
	.option(user)
	.build()
}

pub async fn handle_command(
	interaction: &InteractionCreate,
	command_data: &CommandData,
	http_client: &Client,
	application_id: Id<ApplicationMarker>,
	controller: &BotTicketController,
) -> miette::Result<()> {
	let requested_user = command_data
		.options
		.iter()
		.find(|option| option.name == "user")
		.and_then(|option| match option.value {
			CommandOptionValue::User(user) => Some(user),
			_ => None,
		});
	let staff_id = match requested_user {
		Some(user) => user,
		None => actor_from_interaction(interaction)?.user_id,
	};

	let message = match controller.staff_points(staff_id).await {
		Ok(1) => format!("{} has 1 point.", staff_id.mention()),
		Ok(points) => format!("{} has {} points.", staff_id.mention(), points),
		Err(error) => ticket_error_message(&error, "look up staff points"),
	};
	let interaction_client = http_client.interaction(application_id);
	respond_ephemeral(interaction, &interaction_client, &message).await
}
