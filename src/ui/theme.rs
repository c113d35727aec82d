use crate::relationship::RelationshipKind;
use owo_colors::Style;
use std::sync::OnceLock;

static THEME: OnceLock<Theme> = OnceLock::new();

#[derive(Debug, Clone)]
pub struct Theme {
    pub header: Style,
    pub success: Style,
    pub error: Style,
    pub dim: Style,
    pub muted: Style,
    /// Entity keys such as `client:5`
    pub key: Style,
    pub owns: Style,
    pub contains: Style,
    pub authorizes: Style,
    pub references: Style,
}

impl Theme {
    pub fn detect() -> Self {
        if !console::Term::stdout().is_term() || std::env::var_os("NO_COLOR").is_some() {
            return Self::plain();
        }
        Self::colored()
    }

    pub fn colored() -> Self {
        Self {
            header: Style::new().cyan().bold(),
            success: Style::new().green().bold(),
            error: Style::new().red().bold(),
            dim: Style::new().white().dimmed(),
            muted: Style::new().bright_black(),
            key: Style::new().bright_cyan(),
            owns: Style::new().blue().bold(),
            contains: Style::new().green(),
            authorizes: Style::new().yellow(),
            references: Style::new().magenta(),
        }
    }

    pub fn plain() -> Self {
        Self {
            header: Style::new(),
            success: Style::new(),
            error: Style::new(),
            dim: Style::new(),
            muted: Style::new(),
            key: Style::new(),
            owns: Style::new(),
            contains: Style::new(),
            authorizes: Style::new(),
            references: Style::new(),
        }
    }

    pub fn kind(&self, kind: RelationshipKind) -> Style {
        match kind {
            RelationshipKind::Owns => self.owns.clone(),
            RelationshipKind::Contains => self.contains.clone(),
            RelationshipKind::Authorizes => self.authorizes.clone(),
            RelationshipKind::References => self.references.clone(),
        }
    }
}

pub fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::detect)
}
