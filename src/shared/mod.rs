pub const SERVER_ADDRESS: &str = "0.0.0.0";
pub const SERVER_PORT: u16 = 8000;

pub const DECK_SIZE: usize = 108;
pub const INITIAL_HAND_SIZE: usize = 7;
pub const MIN_PLAYERS: usize = 2;
pub const DEFAULT_MAX_PLAYERS: usize = 10;

/// Bot pacing: randomized pause before a bot acts so its turns read as
/// human-paced rather than instantaneous.
pub const BOT_DELAY_MIN_MS: u64 = 1500;
pub const BOT_DELAY_MAX_MS: u64 = 3000;
/// Pause between a bot playing down to one card and declaring UNO.
pub const BOT_UNO_DELAY_MS: u64 = 500;
