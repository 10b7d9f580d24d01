use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Map a character to its QWERTY equivalent so the action keys work on a
/// Cyrillic layout too.
pub fn to_qwerty(c: char) -> char {
    match c {
        'й' | 'Й' => 'q',
        'с' | 'С' => 'c',
        'щ' | 'Щ' => 'o',
        'ч' | 'Ч' => 'x',
        'п' | 'П' => 'g',
        'к' | 'К' => 'r',
        _ => c,
    }
}

/// Case-insensitive match of a key against an action letter
pub fn key_matches(key: &KeyCode, expected: char) -> bool {
    match key {
        KeyCode::Char(c) => to_qwerty(*c).to_ascii_lowercase() == expected,
        _ => false,
    }
}

/// User intents derived from keyboard input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    // Result actions
    Copy,
    OpenLink,
    Dismiss,

    // Camera
    GrantPermission,
    RetryCamera,

    Quit,
}

/// What the scan screen is showing, for mapping keys to intents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Scanning,
    ResultShown,
    PermissionNeeded,
    CameraStopped,
}

/// Map a key event to a user intent based on what is on screen
pub fn map_key_to_intent(key: &KeyEvent, mode: InputMode) -> Option<Intent> {
    let code = &key.code;

    if key.modifiers.contains(KeyModifiers::CONTROL) && *code == KeyCode::Char('c') {
        return Some(Intent::Quit);
    }
    if key_matches(code, 'q') {
        return Some(Intent::Quit);
    }

    match mode {
        InputMode::ResultShown => {
            if *code == KeyCode::Esc || key_matches(code, 'x') {
                return Some(Intent::Dismiss);
            }
            if *code == KeyCode::Enter || key_matches(code, 'c') {
                return Some(Intent::Copy);
            }
            if key_matches(code, 'o') {
                return Some(Intent::OpenLink);
            }
            None
        }
        InputMode::PermissionNeeded => {
            if *code == KeyCode::Esc {
                return Some(Intent::Quit);
            }
            if *code == KeyCode::Enter || key_matches(code, 'g') {
                return Some(Intent::GrantPermission);
            }
            None
        }
        InputMode::CameraStopped => {
            if *code == KeyCode::Esc {
                return Some(Intent::Quit);
            }
            if *code == KeyCode::Enter || key_matches(code, 'r') {
                return Some(Intent::RetryCamera);
            }
            None
        }
        InputMode::Scanning => {
            if *code == KeyCode::Esc {
                return Some(Intent::Quit);
            }
            None
        }
    }
}
