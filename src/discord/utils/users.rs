// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::tickets::Actor;
use miette::bail;
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_model::user::User;

/// Gets the user's tag as shown in transcripts and audit logs.
pub fn user_tag(user: &User) -> String {
	format_tag(&user.name, user.discriminator)
}

/// Users on the new username system have no discriminator.
fn format_tag(name: &str, discriminator: u16) -> String {
	if discriminator == 0 {
		String::from(name)
	} else {
		format!("{}#{:04}", name, discriminator)
	}
}

/// Gets the acting guild member from the interaction, with the roles used to authorize ticket actions.
pub fn actor_from_interaction(interaction: &InteractionCreate) -> miette::Result<Actor> {
	let Some(interaction_member) = &interaction.member else {
		bail!("Interaction isn't from a guild member");
	};
	let Some(interaction_user) = &interaction_member.user else {
		bail!("Interaction member is not a user");
	};
	Ok(Actor {
		user_id: interaction_user.id,
		name: user_tag(interaction_user),
		roles: interaction_member.roles.clone(),
	})
}
