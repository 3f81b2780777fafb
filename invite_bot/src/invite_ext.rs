//! Extension traits over [`serenity`]'s invite types.

use {
	chrono::{DateTime, TimeZone, Utc},
	gatekeeper::invites::InviteRecord,
	serenity::model::prelude::{RichInvite, Timestamp},
};

/// Conversion from serenity's fetched invites into the cacheable record type.
pub trait RichInviteExt {
	/// Strips a fetched invite down to the fields the tracker cares about.
	fn to_record(&self) -> InviteRecord;
}

impl RichInviteExt for RichInvite {
	fn to_record(&self) -> InviteRecord {
		InviteRecord {
			code: self.code.clone(),
			inviter_id: self.inviter.as_ref().map(|user| user.id.0),
			inviter_tag: self.inviter.as_ref().map(|user| user.tag()),
			channel_id: self.channel.id.0,
			uses: self.uses,
			max_uses: match self.max_uses {
				0 => None,
				limit => Some(limit),
			},
			expires_at: expires_at(&self.created_at, self.max_age),
		}
	}
}

/// Discord reports invite lifetimes as `max_age` seconds after creation, where `0` means the
/// invite never expires.
pub fn expires_at(created_at: &Timestamp, max_age: u64) -> Option<DateTime<Utc>> {
	if max_age == 0 {
		return None;
	}

	Utc.timestamp_opt(created_at.unix_timestamp() + max_age as i64, 0)
		.single()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn zero_max_age_never_expires() {
		let created_at = Timestamp::from_unix_timestamp(1_700_000_000).unwrap();
		assert_eq!(expires_at(&created_at, 0), None);
	}

	#[test]
	fn expiry_is_offset_from_creation() {
		let created_at = Timestamp::from_unix_timestamp(1_700_000_000).unwrap();
		let expires = expires_at(&created_at, 86_400).unwrap();
		assert_eq!(expires.timestamp(), 1_700_086_400);
	}
}
