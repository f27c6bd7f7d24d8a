/// Key presses the composer reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPress {
    Enter { shift: bool },
    Char(char),
    Backspace,
}

/// What a key press means for the composer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposerAction {
    Submit,
    Insert(char),
    DeleteBackward,
}

impl ComposerAction {
    /// Plain Enter submits; Shift+Enter is a literal newline.
    pub fn from_key(key: KeyPress) -> Self {
        match key {
            KeyPress::Enter { shift: false } => Self::Submit,
            KeyPress::Enter { shift: true } => Self::Insert('\n'),
            KeyPress::Char(ch) => Self::Insert(ch),
            KeyPress::Backspace => Self::DeleteBackward,
        }
    }

    /// Applies a non-submit action to composer text. Returns `false` for `Submit`.
    pub fn edit(self, text: &mut String) -> bool {
        match self {
            Self::Submit => false,
            Self::Insert(ch) => {
                text.push(ch);
                true
            }
            Self::DeleteBackward => {
                text.pop();
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enter_submits_and_shift_enter_inserts_newline() {
        assert_eq!(
            ComposerAction::from_key(KeyPress::Enter { shift: false }),
            ComposerAction::Submit
        );
        assert_eq!(
            ComposerAction::from_key(KeyPress::Enter { shift: true }),
            ComposerAction::Insert('\n')
        );
    }

    #[test]
    fn edits_apply_to_text() {
        let bang = ComposerAction::from_key(KeyPress::Char('!'));
        let newline = ComposerAction::from_key(KeyPress::Enter { shift: true });
        let backspace = ComposerAction::from_key(KeyPress::Backspace);

        let mut text = String::from("hi");
        assert!(bang.edit(&mut text));
        assert!(newline.edit(&mut text));
        assert_eq!(text, "hi!\n");

        assert!(backspace.edit(&mut text));
        assert_eq!(text, "hi!");
        assert!(!ComposerAction::Submit.edit(&mut text));
        assert_eq!(text, "hi!");
    }
}
