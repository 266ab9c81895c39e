//! Reserved words of the rule language
//!
//! Keywords are matched case-insensitively. Words that only carry meaning after
//! `is`/`has` (`text`, `length`, `blank`, `word`, `uppercase`, `lowercase`,
//! `upper`, `lower`, `case`) are deliberately not reserved so they remain usable
//! as property and function names.
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Keyword {
    // Boolean composition
    And,
    Or,
    Not,

    // Comparison phrases
    Is,
    Equals,
    Less,
    Greater,
    Than,
    Between,
    In,
    Has,
    No,

    // Rule structure
    Where,

    // Arithmetic words
    Div,
    Mod,

    // Literal words
    Null,
    True,
    False,
    This,
}

const ALL_KEYWORDS: &[Keyword] = &[
    Keyword::And,
    Keyword::Or,
    Keyword::Not,
    Keyword::Is,
    Keyword::Equals,
    Keyword::Less,
    Keyword::Greater,
    Keyword::Than,
    Keyword::Between,
    Keyword::In,
    Keyword::Has,
    Keyword::No,
    Keyword::Where,
    Keyword::Div,
    Keyword::Mod,
    Keyword::Null,
    Keyword::True,
    Keyword::False,
    Keyword::This,
];

impl Keyword {
    /// Canonical lowercase spelling
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
            Self::Not => "not",
            Self::Is => "is",
            Self::Equals => "equals",
            Self::Less => "less",
            Self::Greater => "greater",
            Self::Than => "than",
            Self::Between => "between",
            Self::In => "in",
            Self::Has => "has",
            Self::No => "no",
            Self::Where => "where",
            Self::Div => "div",
            Self::Mod => "mod",
            Self::Null => "null",
            Self::True => "true",
            Self::False => "false",
            Self::This => "this",
        }
    }

    /// Case-insensitive lookup
    pub fn from_word(word: &str) -> Option<Self> {
        ALL_KEYWORDS
            .iter()
            .copied()
            .find(|kw| kw.as_str().eq_ignore_ascii_case(word))
    }

    /// Words that start or continue a comparison tail
    pub const fn is_comparison_word(self) -> bool {
        matches!(
            self,
            Self::Is
                | Self::Equals
                | Self::Less
                | Self::Greater
                | Self::Between
                | Self::In
                | Self::Has
                | Self::Not
        )
    }

    pub const fn is_literal_word(self) -> bool {
        matches!(self, Self::Null | Self::True | Self::False | Self::This)
    }
}

impl std::fmt::Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn reserved_keywords() -> impl Iterator<Item = &'static str> {
    ALL_KEYWORDS.iter().map(|kw| kw.as_str())
}

pub fn is_reserved_keyword(word: &str) -> bool {
    Keyword::from_word(word).is_some()
}
