use teloxide::utils::command::{BotCommands, ParseError};

#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(
    rename_rule = "lowercase",
    description = "These commands are supported:"
)]
pub enum Command {
    #[command(description = "start the bot and open the app.")]
    Start,
    #[command(description = "display this text.")]
    Help,
    #[command(description = "leave the current dialog.")]
    Cancel,
    #[command(hide)]
    Admin,
    #[command(hide, parse_with = url_argument)]
    SetWebApp(String),
}

// Accepts an empty argument so the handler can answer with usage help.
fn url_argument(input: String) -> Result<(String,), ParseError> {
    Ok((input.trim().to_string(),))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("/start", "bot").unwrap(), Command::Start);
        assert_eq!(Command::parse("/admin", "bot").unwrap(), Command::Admin);
        assert_eq!(Command::parse("/cancel", "bot").unwrap(), Command::Cancel);
    }

    #[test]
    fn test_parse_setwebapp_with_url() {
        assert_eq!(
            Command::parse("/setwebapp https://good.example/", "bot").unwrap(),
            Command::SetWebApp("https://good.example/".to_string())
        );
    }

    #[test]
    fn test_parse_setwebapp_without_argument() {
        assert_eq!(
            Command::parse("/setwebapp", "bot").unwrap(),
            Command::SetWebApp(String::new())
        );
    }

    #[test]
    fn test_unknown_command_is_not_parsed() {
        assert!(Command::parse("/settings", "bot").is_err());
        assert!(Command::parse("hello", "bot").is_err());
    }
}
