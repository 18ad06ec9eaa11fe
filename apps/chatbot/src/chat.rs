/// One inbound chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatLine<'a> {
    pub display_name: &'a str,
    pub text: &'a str,
}

/// Splits `name<TAB>text`, falling back to `name: text`. Lines without a
/// sender are dropped.
pub fn parse_line(line: &str) -> Option<ChatLine<'_>> {
    let line = line.trim_end_matches(['\r', '\n']);
    let (name, text) = line.split_once('\t').or_else(|| line.split_once(':'))?;
    let display_name = name.trim();
    if display_name.is_empty() {
        return None;
    }
    Some(ChatLine {
        display_name,
        text: text.trim(),
    })
}

#[cfg(test)]
#[path = "tests/chat_tests.rs"]
mod tests;
