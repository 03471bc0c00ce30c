use ratatui::text::{Line, Span};

use super::styles::Styles;

const FRAMES: [&str; 8] = ["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"];

/// Labelled loading indicator, advanced by `Action::Tick`.
#[derive(Debug, Clone)]
pub struct Spinner {
    frame: usize,
    label: String,
    active: bool,
    styles: Styles,
}

impl Spinner {
    pub fn new(styles: Styles) -> Self {
        Self {
            frame: 0,
            label: String::new(),
            active: false,
            styles,
        }
    }

    pub fn start(&mut self, label: impl Into<String>) {
        self.active = true;
        self.label = label.into();
    }

    pub fn stop(&mut self) {
        self.active = false;
        self.label.clear();
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn tick(&mut self) {
        if self.active {
            self.frame = (self.frame + 1) % FRAMES.len();
        }
    }

    pub fn view(&self) -> Line<'static> {
        if !self.active {
            return Line::default();
        }
        Line::from(vec![
            Span::styled(FRAMES[self.frame], self.styles.spinner),
            Span::raw(" "),
            Span::raw(self.label.clone()),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn inactive_spinner_is_blank_and_frozen() {
        let mut spinner = Spinner::new(Styles::default());
        spinner.tick();
        assert_eq!(spinner.frame, 0);
        assert!(text(&spinner.view()).is_empty());
    }

    #[test]
    fn active_spinner_shows_label_and_advances() {
        let mut spinner = Spinner::new(Styles::default());
        spinner.start("Loading issues...");
        assert!(spinner.is_active());
        assert_eq!(text(&spinner.view()), "⣾ Loading issues...");

        spinner.tick();
        assert_eq!(text(&spinner.view()), "⣽ Loading issues...");

        spinner.stop();
        assert!(!spinner.is_active());
        assert!(text(&spinner.view()).is_empty());
    }
}
