mod invites;
pub use invites::invites;

mod setup_invite_logs;
pub use setup_invite_logs::setup_invite_logs;
