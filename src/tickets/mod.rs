// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

mod error;
mod lifecycle;
mod permissions;
mod platform;
mod store;
#[cfg(test)]
mod testing;
mod transcript;

pub use error::{MissingRecord, TicketError};
pub use lifecycle::{
	Actor, CloseReport, DEFAULT_CLOSE_REASON, Delivery, PendingClose, PointsCredit, TicketController,
	ticket_channel_name,
};
pub use platform::{ChannelDetails, CloseSummary, MessageSource, PointsNotice, TicketPlatform};
pub use store::{
	ClaimOutcome, CloseStart, DatabaseStore, GuildConfigStore, PointAwardOutcome, StaffPointsStore, TicketInsertOutcome,
	TicketStore, TicketStores,
};
pub use transcript::{TranscriptFile, TranscriptHeader, TranscriptLine, collect_transcript, render_transcript};
