use crate::object::ObjectKind;
use owo_colors::Style;
use std::sync::OnceLock;

static THEME: OnceLock<Theme> = OnceLock::new();

#[derive(Debug, Clone)]
pub struct Theme {
    pub header: Style,
    pub success: Style,
    pub error: Style,
    pub warn: Style,
    pub info: Style,
    pub dim: Style,
    pub muted: Style,
    colored: bool,
}

impl Theme {
    pub fn detect() -> Self {
        if !console::Term::stdout().is_term() {
            return Self::plain();
        }
        Self::colored()
    }

    pub fn colored() -> Self {
        Self {
            header: Style::new().cyan().bold(),
            success: Style::new().green().bold(),
            error: Style::new().red().bold(),
            warn: Style::new().yellow().bold(),
            info: Style::new().magenta(),
            dim: Style::new().white().dimmed(),
            muted: Style::new().bright_black(),
            colored: true,
        }
    }

    pub fn plain() -> Self {
        Self {
            header: Style::new(),
            success: Style::new(),
            error: Style::new(),
            warn: Style::new(),
            info: Style::new(),
            dim: Style::new(),
            muted: Style::new(),
            colored: false,
        }
    }

    /// Style for an object of the given kind
    pub fn kind(&self, kind: ObjectKind) -> Style {
        if !self.colored {
            return Style::new();
        }
        match kind {
            ObjectKind::Table => Style::new().green(),
            ObjectKind::View => Style::new().blue(),
            ObjectKind::MaterializedView => Style::new().blue().bold(),
            ObjectKind::Function => Style::new().yellow(),
            ObjectKind::Procedure => Style::new().yellow().bold(),
            ObjectKind::Trigger => Style::new().cyan(),
            ObjectKind::Sequence => Style::new().bright_red(),
            ObjectKind::Type => Style::new().magenta(),
            ObjectKind::Index => Style::new().white().dimmed(),
            ObjectKind::Constraint => Style::new().bright_black(),
        }
    }
}

pub fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::detect)
}
