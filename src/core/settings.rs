//=========================================================================
// Settings
//=========================================================================
//
// Theme variant and the change notification consumed by the dispatch
// loop. Producers hold the `Sender`; the loop selects on the `Receiver`.
//
//=========================================================================

/// Light or dark appearance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ThemeVariant {
    #[default]
    Light,
    Dark,
}

impl ThemeVariant {
    pub fn from_dark_mode(dark: bool) -> Self {
        if dark {
            ThemeVariant::Dark
        } else {
            ThemeVariant::Light
        }
    }
}

/// A settings update delivered to the dispatch loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SettingsChange {
    pub theme: ThemeVariant,
}

/// Device configuration reported to the configuration listener when the
/// system theme flips.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Configuration {
    pub system_theme: ThemeVariant,
}
