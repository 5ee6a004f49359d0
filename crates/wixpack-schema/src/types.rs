//! Closed sets of string values accepted by the manifest.
//!
//! The manifest keeps these fields as plain strings so that documents
//! round-trip untouched; validation parses them through the enums below.

use std::fmt;

macro_rules! closed_set {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }

            /// Exact, case-sensitive match against the accepted spellings.
            pub fn from_name(s: &str) -> Option<Self> {
                match s {
                    $($text => Some($name::$variant),)+
                    _ => None,
                }
            }

            /// Accepted spellings joined for error messages.
            pub fn expected() -> String {
                Self::ALL
                    .iter()
                    .map(|v| v.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

closed_set!(
    /// Cabinet compression level.
    Compression {
        High => "high",
        Low => "low",
        Medium => "medium",
        MsZip => "mszip",
        Off => "none",
    }
);

closed_set!(
    /// When a hook runs. An empty value means both install and uninstall.
    HookWhen {
        Install => "install",
        Uninstall => "uninstall",
    }
);

closed_set!(
    Impersonate {
        Yes => "yes",
        No => "no",
    }
);

closed_set!(
    /// Hook scheduling relative to the installer transaction.
    ExecuteMode {
        Deferred => "deferred",
        Immediate => "immediate",
    }
);

closed_set!(
    ShortcutLocation {
        Program => "program",
        Desktop => "desktop",
    }
);

closed_set!(
    StartMode {
        Auto => "auto",
        Manual => "manual",
        Delayed => "delayed",
    }
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_exact_spelling_only() {
        assert_eq!(
            ShortcutLocation::from_name("desktop"),
            Some(ShortcutLocation::Desktop)
        );
        assert_eq!(ShortcutLocation::from_name("Desktop"), None);
        assert_eq!(ShortcutLocation::from_name("taskbar"), None);
    }

    #[test]
    fn expected_lists_all_values() {
        assert_eq!(Compression::expected(), "high, low, medium, mszip, none");
        assert_eq!(HookWhen::expected(), "install, uninstall");
    }

    #[test]
    fn display_matches_as_str() {
        assert_eq!(ExecuteMode::Immediate.to_string(), "immediate");
        assert_eq!(StartMode::Delayed.as_str(), "delayed");
    }
}
