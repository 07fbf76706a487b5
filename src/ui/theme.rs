use owo_colors::Style;
use std::sync::OnceLock;

static THEME: OnceLock<Theme> = OnceLock::new();

/// Styles for answers and command reports
#[derive(Debug, Clone)]
pub struct Theme {
    /// Answer headings and section titles
    pub heading: Style,
    pub done: Style,
    /// A typed name was not accepted
    pub rejected: Style,
    /// Valid question with nothing to show
    pub empty: Style,
    pub label: Style,
    pub accent: Style,
}

impl Theme {
    /// Colored on a terminal unless `NO_COLOR` is set
    pub fn detect() -> Self {
        let no_color = std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty());
        if no_color || !console::Term::stdout().is_term() {
            return Self::plain();
        }
        Self::colored()
    }

    pub fn colored() -> Self {
        Self {
            heading: Style::new().cyan().bold(),
            done: Style::new().green().bold(),
            rejected: Style::new().red().bold(),
            empty: Style::new().yellow(),
            label: Style::new().white().dimmed(),
            accent: Style::new().magenta(),
        }
    }

    pub fn plain() -> Self {
        Self {
            heading: Style::new(),
            done: Style::new(),
            rejected: Style::new(),
            empty: Style::new(),
            label: Style::new(),
            accent: Style::new(),
        }
    }
}

pub fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::detect)
}
