use crate::error::{NotesError, Result};
use crate::persistence::Persistence;
use crate::store::KeyValueStore;

pub const DEFAULT_THEME: &str = "lofi";

pub const AVAILABLE_THEMES: &[&str] = &[
    "light",
    "dark",
    "cupcake",
    "bumblebee",
    "emerald",
    "corporate",
    "synthwave",
    "retro",
    "cyberpunk",
    "valentine",
    "halloween",
    "garden",
    "forest",
    "aqua",
    "lofi",
    "pastel",
    "fantasy",
    "wireframe",
    "black",
    "luxury",
    "dracula",
    "cmyk",
    "autumn",
    "business",
    "acid",
    "lemonade",
    "night",
    "coffee",
    "winter",
];

pub fn is_available(name: &str) -> bool {
    AVAILABLE_THEMES.contains(&name)
}

/// The active theme. The UI applies [`ThemeSettings::current`] however it
/// styles things; this type only validates and remembers the choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeSettings {
    current: String,
}

impl Default for ThemeSettings {
    fn default() -> Self {
        Self {
            current: DEFAULT_THEME.to_string(),
        }
    }
}

impl ThemeSettings {
    /// Restores the saved theme, falling back to the default when nothing
    /// usable is stored.
    pub fn initialize<S: KeyValueStore>(persistence: &Persistence<S>) -> Self {
        match persistence.load_theme() {
            Ok(Some(name)) if is_available(&name) => Self { current: name },
            Ok(Some(name)) => {
                tracing::warn!(theme = %name, "Ignoring unknown saved theme");
                Self::default()
            }
            Ok(None) => Self::default(),
            Err(e) => {
                tracing::warn!("Failed to load theme: {}", e);
                Self::default()
            }
        }
    }

    pub fn current(&self) -> &str {
        &self.current
    }

    /// Switches theme and saves it. A failed save is logged; the switch still
    /// takes effect for this session.
    pub fn change<S: KeyValueStore>(
        &mut self,
        name: &str,
        persistence: &Persistence<S>,
    ) -> Result<()> {
        if !is_available(name) {
            return Err(NotesError::UnknownTheme(name.to_string()));
        }
        self.current = name.to_string();
        if let Err(e) = persistence.save_theme(name) {
            tracing::error!("Failed to save theme: {}", e);
        }
        Ok(())
    }
}
