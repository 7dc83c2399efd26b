use teloxide::types::{KeyboardButton, KeyboardMarkup, KeyboardRemove, ReplyMarkup};

// Buttons
pub(crate) const ALL_USERS: &str = "All users";
pub(crate) const DELETE_USER: &str = "Delete user";
pub(crate) const DEACTIVATE_USER: &str = "Deactivate user";
pub(crate) const ADD_ADMIN: &str = "Add user to admins";
pub(crate) const REMOVE_ADMIN: &str = "Remove user from admins";
pub(crate) const MAIN_MENU: &str = "Main menu";
pub(crate) const REGISTER: &str = "Register";
pub(crate) const HELP: &str = "Help";

// Admin replies
pub(crate) const ADMIN_ONLY: &str = "These actions are available to administrators only";
pub(crate) const ENTER_ID: &str = "Enter the user id";
pub(crate) const ENTER_EMAIL: &str = "Enter the user's email";
pub(crate) const RETRY_EMAIL: &str = "Enter the email again or press Main menu";
pub(crate) const NOT_FOUND: &str = "User not found";
pub(crate) const DELETE_COMPLETE: &str = "User deleted";
pub(crate) const DEACTIVATE_COMPLETE: &str = "User deactivated";
pub(crate) const ACTIVATE_COMPLETE: &str = "User activated";
pub(crate) const PROMOTE_COMPLETE: &str = "The user is now an administrator";
pub(crate) const DEMOTE_COMPLETE: &str = "The user is no longer an administrator";
pub(crate) const NON_USER: &str = "This user does not exist";
pub(crate) const ADMIN_ALREADY: &str = "This user is already an administrator";
pub(crate) const NOT_ADMIN: &str = "This user is not an administrator";
pub(crate) const RETURN_TO_MENU: &str = "You are back in the main menu";

// User replies
pub(crate) const WELCOME_GUEST: &str =
    "Hello! Press Register or send /register to create your account.";
pub(crate) const ENTER_OWN_EMAIL: &str = "Enter your email";
pub(crate) const BAD_EMAIL: &str = "This does not look like an email, try again";
pub(crate) const EMAIL_TAKEN: &str = "This email is already registered, try another one";
pub(crate) const REGISTRATION_COMPLETE: &str = "Registration complete";
pub(crate) const ALREADY_REGISTERED: &str = "You are already registered";
pub(crate) const ACCOUNT_DEACTIVATED: &str = "Your account is deactivated";
pub(crate) const UNKNOWN_SENDER: &str = "Unable to identify the user.";
pub(crate) const BUSY: &str = "Finish the current action first or send /cancel";
pub(crate) const CANCELLED: &str = "Cancelled";
pub(crate) const FALLBACK: &str = "Something went wrong, please try again later";

/// Longest text Telegram accepts in one message, in UTF-16 code units.
pub(crate) const MESSAGE_LIMIT: usize = 4096;

/// Reply keyboards the bot can attach to a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Keyboard {
    Admin,
    Main,
    Remove,
}

impl Keyboard {
    pub(crate) fn markup(self) -> ReplyMarkup {
        match self {
            Self::Admin => ReplyMarkup::Keyboard(reply_keyboard(&[
                &[ALL_USERS],
                &[DELETE_USER, DEACTIVATE_USER],
                &[ADD_ADMIN, REMOVE_ADMIN],
                &[MAIN_MENU],
            ])),
            Self::Main => ReplyMarkup::Keyboard(reply_keyboard(&[&[REGISTER], &[HELP]])),
            Self::Remove => ReplyMarkup::KeyboardRemove(KeyboardRemove::new()),
        }
    }
}

fn reply_keyboard(rows: &[&[&str]]) -> KeyboardMarkup {
    KeyboardMarkup::new(
        rows.iter()
            .map(|row| row.iter().map(|label| KeyboardButton::new(*label)).collect::<Vec<_>>()),
    )
    .resize_keyboard()
}

/// A text message plus an optional keyboard change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Reply {
    pub text: String,
    pub keyboard: Option<Keyboard>,
}

impl Reply {
    pub(crate) fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: None,
        }
    }

    pub(crate) fn with_keyboard(mut self, keyboard: Keyboard) -> Self {
        self.keyboard = Some(keyboard);
        self
    }

    pub(crate) fn fallback() -> Self {
        Self::text(FALLBACK)
    }
}

/// One line per user, or `None` when there is nothing to show.
pub(crate) fn render_users(users: &[engine::User]) -> Option<String> {
    if users.is_empty() {
        return None;
    }
    Some(
        users
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n"),
    )
}

/// Split `text` into messages Telegram accepts. Breaks fall between lines;
/// only a line longer than [`MESSAGE_LIMIT`] is cut.
pub(crate) fn split_message(text: &str) -> Vec<String> {
    let mut chunks: Vec<String> = Vec::new();
    for piece in text.split('\n').flat_map(cut_line) {
        match chunks.last_mut() {
            Some(chunk) if telegram_len(chunk) + 1 + telegram_len(piece) <= MESSAGE_LIMIT => {
                chunk.push('\n');
                chunk.push_str(piece);
            }
            _ => chunks.push(piece.to_string()),
        }
    }
    chunks
}

fn telegram_len(text: &str) -> usize {
    text.encode_utf16().count()
}

fn cut_line(line: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut units = 0;
    for (idx, ch) in line.char_indices() {
        if units + ch.len_utf16() > MESSAGE_LIMIT {
            pieces.push(&line[start..idx]);
            start = idx;
            units = 0;
        }
        units += ch.len_utf16();
    }
    pieces.push(&line[start..]);
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_user_list_renders_nothing() {
        assert_eq!(render_users(&[]), None);
    }

    #[test]
    fn user_list_renders_one_line_each() {
        let users = vec![
            engine::User::new(1, "a@example.com".to_string()),
            engine::User::new(2, "b@example.com".to_string()),
        ];
        let text = render_users(&users).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.starts_with("1 • a@example.com"));
    }

    #[test]
    fn short_text_is_a_single_message() {
        assert_eq!(split_message("hello\nworld"), vec!["hello\nworld".to_string()]);
        assert_eq!(split_message(""), vec![String::new()]);
    }

    #[test]
    fn long_user_list_is_split_between_lines() {
        let users: Vec<_> = (0..100)
            .map(|i| engine::User::new(1_000_000_000 + i, format!("someone{i}@example.com")))
            .collect();
        let text = render_users(&users).unwrap();
        assert!(telegram_len(&text) > MESSAGE_LIMIT);

        let chunks = split_message(&text);
        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| telegram_len(c) <= MESSAGE_LIMIT));
        assert_eq!(chunks.iter().map(|c| c.lines().count()).sum::<usize>(), 100);
        assert_eq!(chunks.join("\n"), text);
    }

    #[test]
    fn oversized_line_is_cut_at_the_limit() {
        let line = "•".repeat(MESSAGE_LIMIT + 10);
        let chunks = split_message(&line);
        assert_eq!(chunks.len(), 2);
        assert_eq!(telegram_len(&chunks[0]), MESSAGE_LIMIT);
        assert_eq!(chunks.concat(), line);
    }

    #[test]
    fn admin_keyboard_has_a_way_back() {
        let ReplyMarkup::Keyboard(kb) = Keyboard::Admin.markup() else {
            panic!("expected a reply keyboard");
        };
        let labels: Vec<&str> = kb
            .keyboard
            .iter()
            .flatten()
            .map(|b| b.text.as_str())
            .collect();
        assert!(labels.contains(&MAIN_MENU));
        assert_eq!(labels.len(), 6);
    }
}
