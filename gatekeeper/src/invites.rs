//! The invite snapshot cache and the join-attribution diff.

use {
	chrono::{DateTime, Utc},
	serde::{Deserialize, Serialize},
	std::collections::HashMap,
	tracing::debug,
};

/// Read-only copy of a single guild invite, as last fetched from Discord.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InviteRecord {
	/// The invite's code. Unique within its guild.
	pub code: String,

	/// The user who created the invite, if Discord still knows them.
	pub inviter_id: Option<u64>,

	/// Display tag of the inviter, for log output.
	pub inviter_tag: Option<String>,

	/// The channel the invite points at.
	pub channel_id: u64,

	/// How often the invite has been used so far.
	pub uses: u64,

	/// Maximum amount of uses. `None` = unlimited.
	pub max_uses: Option<u64>,

	/// When the invite expires. `None` = never.
	pub expires_at: Option<DateTime<Utc>>,
}

/// Compares the snapshot taken before a member joined against a fresh fetch and picks the invite
/// whose use count went up.
///
/// The first invite with a strictly increased count wins. If two invites got used within the same
/// window, the result is whichever one the iteration order yields first; with a single snapshot
/// per guild there is nothing better to go on.
pub fn find_used_invite<'a>(
	before: &[InviteRecord], after: &'a [InviteRecord],
) -> Option<&'a InviteRecord> {
	after.iter().find(|current| {
		before
			.iter()
			.any(|old| old.code == current.code && current.uses > old.uses)
	})
}

/// Last-known invite lists, one per guild.
///
/// This is a best-effort cache. A guild the bot could not fetch invites for simply has no entry,
/// and consumers treat that as "attribution unavailable" rather than an error. Entries live for
/// the lifetime of the process.
#[derive(Debug, Default)]
pub struct InviteCache {
	guilds: HashMap<u64, Vec<InviteRecord>>,
}

impl InviteCache {
	pub fn new() -> Self {
		Self::default()
	}

	/// Whether a snapshot exists for the given guild.
	pub fn contains(&self, guild_id: u64) -> bool {
		self.guilds.contains_key(&guild_id)
	}

	/// The current snapshot for the given guild, if any.
	pub fn get(&self, guild_id: u64) -> Option<&[InviteRecord]> {
		self.guilds.get(&guild_id).map(Vec::as_slice)
	}

	/// Replaces the stored snapshot for a guild with a fresh fetch.
	pub fn replace(&mut self, guild_id: u64, invites: Vec<InviteRecord>) {
		debug!(guild_id, count = invites.len(), "replacing invite snapshot");
		self.guilds.insert(guild_id, invites);
	}

	/// Diffs the stored snapshot against a freshly fetched invite list and returns the invite the
	/// new member came in through, if it can tell.
	///
	/// The stored snapshot is replaced with `after` whether or not a match was found, so the next
	/// join always diffs against the most recent state. A guild without a snapshot gets seeded
	/// and reports `None` for this one join; the cache never infers retroactively.
	pub fn attribute_join(
		&mut self, guild_id: u64, after: Vec<InviteRecord>,
	) -> Option<InviteRecord> {
		let used = match self.guilds.get(&guild_id) {
			Some(before) => find_used_invite(before, &after).cloned(),
			None => {
				debug!(guild_id, "no snapshot for guild, seeding");
				None
			}
		};

		self.replace(guild_id, after);
		used
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn invite(code: &str, uses: u64) -> InviteRecord {
		InviteRecord {
			code: String::from(code),
			inviter_id: Some(1),
			inviter_tag: Some(String::from("somebody#0001")),
			channel_id: 10,
			uses,
			max_uses: None,
			expires_at: None,
		}
	}

	#[test]
	fn single_increased_use_is_attributed() {
		let before = vec![invite("abc", 2)];
		let after = vec![invite("abc", 3), invite("xyz", 0)];

		let used = find_used_invite(&before, &after).expect("`abc` went from 2 to 3 uses");
		assert_eq!(used.code, "abc");
		assert_eq!(used.uses, 3);
	}

	#[test]
	fn unchanged_counts_are_unknown() {
		let before = vec![invite("abc", 2)];
		let after = vec![invite("abc", 2)];

		assert!(find_used_invite(&before, &after).is_none());
	}

	#[test]
	fn invite_without_a_counterpart_is_ignored() {
		// A code that only exists in `after` has no baseline to diff against.
		let before = vec![invite("abc", 2)];
		let after = vec![invite("xyz", 1), invite("abc", 2)];

		assert!(find_used_invite(&before, &after).is_none());
	}

	#[test]
	fn first_increased_invite_wins_ties() {
		let before = vec![invite("abc", 2), invite("xyz", 5)];
		let after = vec![invite("abc", 3), invite("xyz", 6)];

		let used = find_used_invite(&before, &after).unwrap();
		assert_eq!(used.code, "abc");
	}

	#[test]
	fn diffing_twice_yields_the_same_result() {
		let before = vec![invite("abc", 2)];
		let after = vec![invite("abc", 3)];

		assert_eq!(find_used_invite(&before, &after), find_used_invite(&before, &after));
	}

	#[test]
	fn uncached_guild_reports_unknown_and_seeds() {
		let mut cache = InviteCache::new();
		assert!(!cache.contains(1));

		let used = cache.attribute_join(1, vec![invite("abc", 2)]);

		assert!(used.is_none());
		assert_eq!(cache.get(1), Some(&[invite("abc", 2)][..]));
	}

	#[test]
	fn snapshot_is_replaced_even_without_a_match() {
		let mut cache = InviteCache::new();
		cache.replace(1, vec![invite("abc", 2)]);

		let used = cache.attribute_join(1, vec![invite("abc", 2), invite("xyz", 0)]);

		assert!(used.is_none());
		assert_eq!(cache.get(1).map(<[_]>::len), Some(2));
	}

	#[test]
	fn consecutive_joins_diff_against_the_latest_snapshot() {
		let mut cache = InviteCache::new();
		cache.replace(1, vec![invite("abc", 2)]);

		let first = cache.attribute_join(1, vec![invite("abc", 3)]);
		assert_eq!(first.unwrap().uses, 3);

		let second = cache.attribute_join(1, vec![invite("abc", 4)]);
		assert_eq!(second.unwrap().uses, 4);
	}

	#[test]
	fn stale_snapshot_stays_when_no_new_fetch_arrives() {
		// The fetch-failed path never calls into the cache, so the old state must still be there
		// for the next event.
		let mut cache = InviteCache::new();
		cache.replace(1, vec![invite("abc", 2)]);

		assert_eq!(cache.get(1).map(<[_]>::len), Some(1));
	}
}
