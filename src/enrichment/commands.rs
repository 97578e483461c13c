use crate::domain::model::Command;

/// Parses a `commands` file: one `title,shell command,description` per line.
///
/// Blank lines are ignored, missing fields become empty strings and the
/// description keeps any further commas.
pub fn parse_commands(text: &str) -> Vec<Command> {
    text.trim()
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            let mut parts = line.splitn(3, ',').map(str::trim);
            Command {
                title: parts.next().unwrap_or_default().to_string(),
                shell_command: parts.next().unwrap_or_default().to_string(),
                description: parts.next().unwrap_or_default().to_string(),
            }
        })
        .collect()
}
