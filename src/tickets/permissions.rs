// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use twilight_model::channel::permission_overwrite::{PermissionOverwrite, PermissionOverwriteType};
use twilight_model::guild::Permissions;
use twilight_model::id::Id;
use twilight_model::id::marker::{GuildMarker, RoleMarker, UserMarker};

/// Permissions for anyone taking part in the ticket conversation
pub fn participant_permissions() -> Permissions {
	Permissions::VIEW_CHANNEL | Permissions::SEND_MESSAGES | Permissions::READ_MESSAGE_HISTORY
}

/// Overwrites for a freshly opened ticket: only the opener and staff can see it.
pub fn opened_channel_overwrites(
	guild_id: Id<GuildMarker>,
	opener: Id<UserMarker>,
	staff_role: Id<RoleMarker>,
) -> Vec<PermissionOverwrite> {
	vec![
		everyone_hidden(guild_id),
		member_participant(opener),
		PermissionOverwrite {
			allow: participant_permissions(),
			deny: Permissions::empty(),
			id: staff_role.cast(),
			kind: PermissionOverwriteType::Role,
		},
	]
}

/// Overwrites for a claimed ticket. The opener and the claiming staff member keep full access. Other staff keep
/// read-only access unless `hide_from_staff` is set (appeal tickets), in which case they lose sight of the channel.
pub fn claimed_channel_overwrites(
	guild_id: Id<GuildMarker>,
	opener: Id<UserMarker>,
	claimer: Id<UserMarker>,
	staff_role: Id<RoleMarker>,
	hide_from_staff: bool,
) -> Vec<PermissionOverwrite> {
	let mut overwrites = vec![everyone_hidden(guild_id), member_participant(opener)];
	if !hide_from_staff {
		overwrites.push(PermissionOverwrite {
			allow: Permissions::VIEW_CHANNEL | Permissions::READ_MESSAGE_HISTORY,
			deny: Permissions::SEND_MESSAGES,
			id: staff_role.cast(),
			kind: PermissionOverwriteType::Role,
		});
	}
	overwrites.push(member_participant(claimer));
	overwrites
}

fn everyone_hidden(guild_id: Id<GuildMarker>) -> PermissionOverwrite {
	PermissionOverwrite {
		allow: Permissions::empty(),
		deny: Permissions::VIEW_CHANNEL,
		id: guild_id.cast(),
		kind: PermissionOverwriteType::Role,
	}
}

pub fn member_participant(user_id: Id<UserMarker>) -> PermissionOverwrite {
	PermissionOverwrite {
		allow: participant_permissions(),
		deny: Permissions::empty(),
		id: user_id.cast(),
		kind: PermissionOverwriteType::Member,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const GUILD: Id<GuildMarker> = Id::new(1);
	const OPENER: Id<UserMarker> = Id::new(11);
	const CLAIMER: Id<UserMarker> = Id::new(21);
	const STAFF: Id<RoleMarker> = Id::new(100);

	#[test]
	fn claimed_ticket_leaves_staff_read_only() {
		let overwrites = claimed_channel_overwrites(GUILD, OPENER, CLAIMER, STAFF, false);
		assert_eq!(overwrites.len(), 4);

		let staff = overwrites
			.iter()
			.find(|overwrite| overwrite.id == STAFF.cast())
			.unwrap();
		let allowed = staff.allow;
		assert!(allowed.contains(Permissions::VIEW_CHANNEL | Permissions::READ_MESSAGE_HISTORY));
		assert!(!allowed.contains(Permissions::SEND_MESSAGES));
		assert_eq!(staff.deny, Permissions::SEND_MESSAGES);
	}

	#[test]
	fn claimed_appeal_hides_other_staff() {
		let overwrites = claimed_channel_overwrites(GUILD, OPENER, CLAIMER, STAFF, true);
		assert!(overwrites.iter().all(|overwrite| overwrite.id != STAFF.cast()));

		let everyone = overwrites.iter().find(|overwrite| overwrite.id == GUILD.cast()).unwrap();
		assert_eq!(everyone.deny, Permissions::VIEW_CHANNEL);
		assert!(everyone.allow.is_empty());
		for user in [OPENER, CLAIMER] {
			let overwrite = overwrites.iter().find(|overwrite| overwrite.id == user.cast()).unwrap();
			assert_eq!(overwrite.kind, PermissionOverwriteType::Member);
			assert_eq!(overwrite.allow, participant_permissions());
			assert!(overwrite.deny.is_empty());
		}
	}
}
