use shared::domain::Guess;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Join,
    Guess(Guess),
    Shutdown,
}

/// Chat tokens recognised as commands. Matching is done on the trimmed,
/// lowercased message, so tokens are stored lowercase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTokens {
    pub join: Vec<String>,
    pub higher: Vec<String>,
    pub lower: Vec<String>,
    pub shutdown: Vec<String>,
}

impl Default for CommandTokens {
    fn default() -> Self {
        Self {
            join: vec!["!j".into()],
            higher: vec!["h".into(), "higher".into()],
            lower: vec!["l".into(), "lower".into()],
            shutdown: vec!["!shutdown".into()],
        }
    }
}

impl CommandTokens {
    pub fn parse(&self, text: &str) -> Option<Command> {
        let normalized = text.trim().to_lowercase();
        let matches = |tokens: &[String]| tokens.iter().any(|token| *token == normalized);

        if matches(&self.join) {
            Some(Command::Join)
        } else if matches(&self.higher) {
            Some(Command::Guess(Guess::Higher))
        } else if matches(&self.lower) {
            Some(Command::Guess(Guess::Lower))
        } else if matches(&self.shutdown) {
            Some(Command::Shutdown)
        } else {
            None
        }
    }

    /// Splits a comma separated token list, as used in config files.
    pub fn split_list(raw: &str) -> Vec<String> {
        raw.split(',')
            .map(|token| token.trim().to_lowercase())
            .filter(|token| !token.is_empty())
            .collect()
    }
}
