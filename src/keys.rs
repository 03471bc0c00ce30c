use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// A set of keys that trigger the same action.
#[derive(Debug, Clone)]
pub struct Binding {
    keys: Vec<(KeyCode, KeyModifiers)>,
}

impl Binding {
    fn new(keys: &[(KeyCode, KeyModifiers)]) -> Self {
        Self {
            keys: keys.to_vec(),
        }
    }

    /// Shift is ignored so `R` matches however the terminal reports it.
    pub fn matches(&self, key: &KeyEvent) -> bool {
        let mods = key.modifiers.difference(KeyModifiers::SHIFT);
        self.keys
            .iter()
            .any(|(code, m)| *code == key.code && m.difference(KeyModifiers::SHIFT) == mods)
    }
}

/// Application key bindings, built once at startup and shared by value.
#[derive(Debug, Clone)]
pub struct KeyMap {
    pub up: Binding,
    pub down: Binding,
    pub open: Binding,
    pub back: Binding,
    pub quit: Binding,
    pub force_quit: Binding,
    pub refresh: Binding,
    pub page_up: Binding,
    pub page_down: Binding,
    pub go_to_top: Binding,
    pub go_to_end: Binding,
    pub next_page: Binding,
}

impl Default for KeyMap {
    fn default() -> Self {
        const NONE: KeyModifiers = KeyModifiers::NONE;
        const CTRL: KeyModifiers = KeyModifiers::CONTROL;

        Self {
            up: Binding::new(&[(KeyCode::Char('k'), NONE), (KeyCode::Up, NONE)]),
            down: Binding::new(&[(KeyCode::Char('j'), NONE), (KeyCode::Down, NONE)]),
            open: Binding::new(&[(KeyCode::Enter, NONE)]),
            back: Binding::new(&[(KeyCode::Esc, NONE), (KeyCode::Backspace, NONE)]),
            quit: Binding::new(&[(KeyCode::Char('q'), NONE)]),
            force_quit: Binding::new(&[(KeyCode::Char('c'), CTRL)]),
            refresh: Binding::new(&[(KeyCode::Char('R'), NONE)]),
            page_up: Binding::new(&[(KeyCode::PageUp, NONE), (KeyCode::Char('u'), CTRL)]),
            page_down: Binding::new(&[(KeyCode::PageDown, NONE), (KeyCode::Char('d'), CTRL)]),
            go_to_top: Binding::new(&[(KeyCode::Char('g'), NONE), (KeyCode::Home, NONE)]),
            go_to_end: Binding::new(&[(KeyCode::Char('G'), NONE), (KeyCode::End, NONE)]),
            next_page: Binding::new(&[(KeyCode::Char('L'), NONE)]),
        }
    }
}
