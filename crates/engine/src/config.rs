use std::time::Duration;

use crate::command::CommandTokens;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// How long a player stays busy after one of their commands is processed.
    pub cooldown: Duration,
    /// Quiet period after a suppressed message before "slow down" is shown.
    pub notice_delay: Duration,
    pub inactivity_timeout: Duration,
    pub max_active_games: usize,
    pub tokens: CommandTokens,
    /// Chat identity allowed to issue the shutdown token.
    pub admin: Option<String>,
    pub slow_down_text: String,
    pub capacity_text: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cooldown: Duration::from_secs(2),
            notice_delay: Duration::from_millis(500),
            inactivity_timeout: Duration::from_secs(300),
            max_active_games: 4,
            tokens: CommandTokens::default(),
            admin: None,
            slow_down_text: "Slow down! One guess at a time.".into(),
            capacity_text: "Sorry, all game slots are taken. Try again soon.".into(),
        }
    }
}
