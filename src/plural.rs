//! Numerus (plural form) rules.
//!
//! A `.ts` numerus message stores one translation per plural category of
//! the target language, in the order the rule numbers them. The rules
//! follow the families Qt Linguist knows about.

use crate::input::normalize_language_code;

/// Plural rule family of a language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PluralRule {
    /// One form for every count (Japanese, Chinese, Turkish, Hungarian, ...).
    Single,
    /// `n == 1`, everything else.
    #[default]
    EnglishLike,
    /// `n <= 1`, everything else.
    FrenchLike,
    /// `1`; `2-4` except `12-14` (modulo 100); everything else.
    Polish,
    /// `1`; `2-4`; everything else.
    CzechSlovak,
    /// Russian, Ukrainian, Belarusian and the Serbo-Croatian languages.
    EastSlavic,
    Slovenian,
    Lithuanian,
    Latvian,
    Romanian,
    Irish,
    Arabic,
}

impl PluralRule {
    /// Rule for a locale code such as `pl`, `pl_PL` or `pt-BR`.
    ///
    /// Unknown languages get the English rule.
    #[must_use]
    pub fn for_language(code: &str) -> Self {
        let normalized = normalize_language_code(code);
        let primary = normalized.split('_').next().unwrap_or_default();

        match (primary, normalized.as_str()) {
            (_, "pt_br") => Self::FrenchLike,
            ("ja" | "zh" | "ko" | "vi" | "th" | "id" | "ms" | "lo" | "my" | "km" | "tr" | "hu" | "fa", _) => {
                Self::Single
            }
            ("fr" | "tl" | "fil" | "oc", _) => Self::FrenchLike,
            ("pl", _) => Self::Polish,
            ("cs" | "sk", _) => Self::CzechSlovak,
            ("ru" | "uk" | "be" | "sr" | "hr" | "bs", _) => Self::EastSlavic,
            ("sl", _) => Self::Slovenian,
            ("lt", _) => Self::Lithuanian,
            ("lv", _) => Self::Latvian,
            ("ro" | "mo", _) => Self::Romanian,
            ("ga", _) => Self::Irish,
            ("ar", _) => Self::Arabic,
            _ => Self::EnglishLike,
        }
    }

    /// Number of numerus forms a complete translation carries.
    #[must_use]
    pub const fn form_count(self) -> usize {
        match self {
            Self::Single => 1,
            Self::EnglishLike | Self::FrenchLike => 2,
            Self::Polish
            | Self::CzechSlovak
            | Self::EastSlavic
            | Self::Lithuanian
            | Self::Latvian
            | Self::Romanian
            | Self::Irish => 3,
            Self::Slovenian => 4,
            Self::Arabic => 6,
        }
    }

    /// Plural category index for a count. Always below [`Self::form_count`].
    #[must_use]
    pub const fn category(self, count: i64) -> usize {
        let n = count.unsigned_abs();
        let mod10 = n % 10;
        let mod100 = n % 100;
        let teen = 10 <= mod100 && mod100 <= 19;

        match self {
            Self::Single => 0,
            Self::EnglishLike => usize_if(n != 1, 1),
            Self::FrenchLike => usize_if(n > 1, 1),
            Self::Polish => {
                if n == 1 {
                    0
                } else if 2 <= mod10 && mod10 <= 4 && !teen {
                    1
                } else {
                    2
                }
            }
            Self::CzechSlovak => match n {
                1 => 0,
                2..=4 => 1,
                _ => 2,
            },
            Self::EastSlavic => {
                if mod10 == 1 && mod100 != 11 {
                    0
                } else if 2 <= mod10 && mod10 <= 4 && !teen {
                    1
                } else {
                    2
                }
            }
            Self::Slovenian => match mod100 {
                1 => 0,
                2 => 1,
                3 | 4 => 2,
                _ => 3,
            },
            Self::Lithuanian => {
                if mod10 == 1 && !teen {
                    0
                } else if mod10 != 0 && !teen {
                    1
                } else {
                    2
                }
            }
            Self::Latvian => {
                if mod10 == 1 && mod100 != 11 {
                    0
                } else if n != 0 {
                    1
                } else {
                    2
                }
            }
            Self::Romanian => {
                if n == 1 {
                    0
                } else if n == 0 || (1 <= mod100 && mod100 <= 19) {
                    1
                } else {
                    2
                }
            }
            Self::Irish => match n {
                1 => 0,
                2 => 1,
                _ => 2,
            },
            Self::Arabic => match n {
                0 => 0,
                1 => 1,
                2 => 2,
                _ if 3 <= mod100 && mod100 <= 10 => 3,
                _ if mod100 >= 11 => 4,
                _ => 5,
            },
        }
    }
}

const fn usize_if(condition: bool, value: usize) -> usize {
    if condition { value } else { 0 }
}

/// Replace every `%n` in a numerus translation with the count, as `tr(source, n)` does.
#[must_use]
pub fn substitute_count(text: &str, count: i64) -> String {
    text.replace("%n", &count.to_string())
}
