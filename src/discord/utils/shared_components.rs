// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::model::TicketCategory;
use twilight_model::channel::message::component::{
	ActionRow, Button, ButtonStyle, Component, SelectMenu, SelectMenuOption, SelectMenuType, TextInput, TextInputStyle,
};

pub const OPEN_TICKET_ID: &str = "ticket/open";
pub const CLAIM_TICKET_ID: &str = "ticket/claim";
pub const CLOSE_TICKET_ID: &str = "ticket/close";
pub const CLOSE_REASON_MODAL_ID: &str = "ticket/close_reason";
pub const CLOSE_REASON_INPUT_ID: &str = "close_reason";

/// Longest close reason accepted from the modal
const MAX_CLOSE_REASON_LENGTH: u16 = 1000;

/// The ticket type menu posted by `/panel`
pub fn ticket_panel_select() -> Component {
	let options: Vec<SelectMenuOption> = TicketCategory::all_categories()
		.iter()
		.map(|category| SelectMenuOption {
			default: false,
			description: Some(String::from(category.description())),
			emoji: None,
			label: String::from(category.name()),
			value: String::from(category.as_id()),
		})
		.collect();
	let select_menu = SelectMenu {
		channel_types: None,
		custom_id: String::from(OPEN_TICKET_ID),
		default_values: None,
		disabled: false,
		kind: SelectMenuType::Text,
		max_values: Some(1),
		min_values: Some(1),
		options: Some(options),
		placeholder: Some(String::from("Select Ticket Type")),
	};
	Component::ActionRow(ActionRow {
		components: vec![Component::SelectMenu(select_menu)],
	})
}

/// The Claim and Close buttons posted in a new ticket channel
pub fn ticket_control_buttons() -> Component {
	let claim_button = Button {
		custom_id: Some(String::from(CLAIM_TICKET_ID)),
		disabled: false,
		emoji: None,
		label: Some(String::from("Claim")),
		style: ButtonStyle::Success,
		url: None,
		sku_id: None,
	};
	let close_button = Button {
		custom_id: Some(String::from(CLOSE_TICKET_ID)),
		disabled: false,
		emoji: None,
		label: Some(String::from("Close")),
		style: ButtonStyle::Danger,
		url: None,
		sku_id: None,
	};
	Component::ActionRow(ActionRow {
		components: vec![Component::Button(claim_button), Component::Button(close_button)],
	})
}

pub fn close_reason_input() -> Component {
	let reason_input = TextInput {
		custom_id: String::from(CLOSE_REASON_INPUT_ID),
		label: String::from("Reason for closing the ticket"),
		max_length: Some(MAX_CLOSE_REASON_LENGTH),
		min_length: None,
		placeholder: None,
		required: Some(true),
		style: TextInputStyle::Paragraph,
		value: None,
	};
	Component::ActionRow(ActionRow {
		components: vec![Component::TextInput(reason_input)],
	})
}
