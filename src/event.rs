use crossterm::event::KeyEvent;

use crate::action::Action;

/// Terminal-side inputs produced by the `EventHandler`.
#[derive(Debug, Clone)]
pub enum Event {
    Tick,
    Render,
    Key(KeyEvent),
    Resize(u16, u16),
}

impl Event {
    /// Render is handled by the loop itself; everything else becomes an action.
    pub fn into_action(self) -> Option<Action> {
        match self {
            Event::Tick => Some(Action::Tick),
            Event::Render => None,
            Event::Key(key) => Some(Action::Key(key)),
            Event::Resize(width, height) => Some(Action::Resize { width, height }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};

    #[test]
    fn render_has_no_action() {
        assert!(Event::Render.into_action().is_none());
    }

    #[test]
    fn inputs_map_to_actions() {
        assert!(matches!(Event::Tick.into_action(), Some(Action::Tick)));
        assert!(matches!(
            Event::Resize(80, 24).into_action(),
            Some(Action::Resize {
                width: 80,
                height: 24
            })
        ));
        let key = KeyEvent::new(KeyCode::Char('j'), KeyModifiers::NONE);
        assert!(matches!(
            Event::Key(key).into_action(),
            Some(Action::Key(k)) if k.code == KeyCode::Char('j')
        ));
    }
}
