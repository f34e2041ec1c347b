// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::BotTicketController;
use miette::bail;
use twilight_http::client::Client;
use twilight_model::application::command::Command;
use twilight_model::application::interaction::application_command::CommandData;
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_model::id::Id;
use twilight_model::id::marker::ApplicationMarker;

mod close;
mod panel;
mod points;

pub fn command_definitions() -> Vec<Command> {
	vec![
		close::command_definition(),
		panel::command_definition(),
		points::command_definition(),
	]
}

pub async fn route_command(
	interaction: &InteractionCreate,
	command_data: &CommandData,
	http_client: &Client,
	application_id: Id<ApplicationMarker>,
	controller: &BotTicketController,
) -> miette::Result<()> {
	match command_data.name.as_str() {
		"close" => close::handle_command(interaction, command_data, http_client, application_id, controller).await,
		"panel" => panel::handle_command(interaction, http_client, application_id, controller).await,
		"points" => points::handle_command(interaction, command_data, http_client, application_id, controller).await,
		_ => bail!("Unknown command encountered: {}\n{:?}", command_data.name, command_data),
	}
}
