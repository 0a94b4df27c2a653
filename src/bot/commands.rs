pub const ADD_USAGE: &str = "Usage: /addsource <name> <rss_url>";
pub const REMOVE_USAGE: &str = "Usage: /removesource <name>";

/// A chat command the bot understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCommand {
    Start,
    AddSource { name: String, url: String },
    RemoveSource { name: String },
    ListSources,
    /// Known command with the wrong number of arguments
    Usage(&'static str),
}

impl BotCommand {
    /// Parse a message text. Returns `None` for plain text and unknown commands.
    pub fn parse(text: &str) -> Option<Self> {
        let mut parts = text.split_whitespace();
        let head = parts.next()?.strip_prefix('/')?;
        // "/listsources@my_bot" in group chats
        let command = head.split('@').next().unwrap_or_default().to_lowercase();
        let args: Vec<&str> = parts.collect();

        let parsed = match command.as_str() {
            "start" => BotCommand::Start,
            "addsource" => match args.as_slice() {
                [name, url] => BotCommand::AddSource {
                    name: name.to_string(),
                    url: url.to_string(),
                },
                _ => BotCommand::Usage(ADD_USAGE),
            },
            "removesource" => match args.as_slice() {
                [name] => BotCommand::RemoveSource {
                    name: name.to_string(),
                },
                _ => BotCommand::Usage(REMOVE_USAGE),
            },
            "listsources" => BotCommand::ListSources,
            _ => return None,
        };

        Some(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_add() {
        assert_eq!(
            BotCommand::parse("/addsource nyaa https://nyaa.si/?page=rss"),
            Some(BotCommand::AddSource {
                name: "nyaa".to_string(),
                url: "https://nyaa.si/?page=rss".to_string(),
            })
        );
    }

    #[test]
    fn test_parse_add_wrong_arity() {
        assert_eq!(
            BotCommand::parse("/addsource nyaa"),
            Some(BotCommand::Usage(ADD_USAGE))
        );
        assert_eq!(
            BotCommand::parse("/addsource a b c"),
            Some(BotCommand::Usage(ADD_USAGE))
        );
    }

    #[test]
    fn test_parse_remove() {
        assert_eq!(
            BotCommand::parse("/removesource nyaa"),
            Some(BotCommand::RemoveSource {
                name: "nyaa".to_string()
            })
        );
        assert_eq!(
            BotCommand::parse("/removesource"),
            Some(BotCommand::Usage(REMOVE_USAGE))
        );
    }

    #[test]
    fn test_parse_bot_suffix_and_case() {
        assert_eq!(
            BotCommand::parse("/ListSources@feed_bot"),
            Some(BotCommand::ListSources)
        );
        assert_eq!(BotCommand::parse("  /start  "), Some(BotCommand::Start));
    }

    #[test]
    fn test_parse_ignores_other_text() {
        assert_eq!(BotCommand::parse("hello there"), None);
        assert_eq!(BotCommand::parse("/unknown"), None);
        assert_eq!(BotCommand::parse(""), None);
        assert_eq!(BotCommand::parse("/"), None);
    }
}
