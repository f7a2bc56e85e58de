use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiCommand {
    Quit,
    OpenFilePrompt,
    Rerun,
    ToggleLevels,
    Export,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptCommand {
    Insert(char),
    Backspace,
    Submit,
    Cancel,
}

/// Raw mode swallows SIGINT, so Ctrl+C reaches us as a key press.
pub fn is_interrupt(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
}

pub fn parse_main_command(key_code: &KeyCode) -> Option<UiCommand> {
    match key_code {
        KeyCode::Esc => Some(UiCommand::Quit),
        KeyCode::F(5) => Some(UiCommand::Rerun),
        KeyCode::Char(c) => match c.to_ascii_lowercase() {
            'q' => Some(UiCommand::Quit),
            'o' | 'u' => Some(UiCommand::OpenFilePrompt),
            'r' => Some(UiCommand::Rerun),
            'l' => Some(UiCommand::ToggleLevels),
            'e' => Some(UiCommand::Export),
            _ => None,
        },
        _ => None,
    }
}

/// While the file prompt is open every printable key is text, including `q`.
pub fn parse_prompt_command(key_code: &KeyCode) -> Option<PromptCommand> {
    match key_code {
        KeyCode::Enter => Some(PromptCommand::Submit),
        KeyCode::Esc => Some(PromptCommand::Cancel),
        KeyCode::Backspace => Some(PromptCommand::Backspace),
        KeyCode::Char(c) => Some(PromptCommand::Insert(*c)),
        _ => None,
    }
}
