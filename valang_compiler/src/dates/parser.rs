//! Date expression parser
//!
//! A date expression is an optional absolute date followed by a chain of
//! modifiers, each introduced by `T`. The parser holds an ordered table of
//! full-match patterns; at every step it tries the longest prefix of the
//! remaining text first and shrinks it one character at a time until some
//! pattern matches. The first registered pattern that matches wins.
//!
//! ```text
//! 2008-01-01          absolute date
//! T                   now
//! T-1d                now minus one day
//! T<d                 start of today
//! T>M                 start of next month
//! T<M-1d              last day of the previous month, at midnight
//! 2008-01-31T+1M      one month after a fixed date
//! ```

use super::error::{DateParseError, DateResult};
use super::modifiers::{self, TimeUnit};
use crate::config::compile_time::dates::*;
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use regex::{Captures, Regex};

/// Modifier applied to the value built so far (or to "now" at the start)
pub type DateModifier = Box<dyn Fn(NaiveDateTime, &Captures<'_>) -> Option<NaiveDateTime> + Send + Sync>;

enum DateHandler {
    /// chrono format string for an absolute date
    Format(String),
    Modifier(DateModifier),
}

struct DatePattern {
    source: String,
    regex: Regex,
    handler: DateHandler,
}

impl DatePattern {
    fn apply(&self, text: &str, base: NaiveDateTime) -> Option<DateResult<NaiveDateTime>> {
        let captures = self.regex.captures(text)?;
        let out_of_range = || DateParseError::OutOfRange {
            text: text.to_string(),
        };
        let result = match &self.handler {
            DateHandler::Format(format) => parse_absolute(text, format).ok_or_else(out_of_range),
            DateHandler::Modifier(modifier) => modifier(base, &captures).ok_or_else(out_of_range),
        };
        Some(result)
    }
}

/// Ordered registry of date patterns
pub struct DateParser {
    patterns: Vec<DatePattern>,
}

impl Default for DateParser {
    fn default() -> Self {
        Self::with_default_patterns()
    }
}

impl std::fmt::Debug for DateParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DateParser")
            .field(
                "patterns",
                &self.patterns.iter().map(|p| p.source.as_str()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl DateParser {
    /// A parser with no patterns at all
    pub fn empty() -> Self {
        Self {
            patterns: Vec::new(),
        }
    }

    /// The standard absolute formats and `T` modifiers
    pub fn with_default_patterns() -> Self {
        let mut parser = Self::empty();
        parser.install_defaults();
        parser
    }

    fn install_defaults(&mut self) {
        let formats = [
            (r"^\d{8}$", "%Y%m%d"),
            (r"^\d{4}-\d{2}-\d{2}$", "%Y-%m-%d"),
            (r"^\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}$", "%Y-%m-%d %H:%M:%S"),
            (r"^\d{8} \d{6}$", "%Y%m%d %H%M%S"),
            (r"^\d{8} \d{2}:\d{2}:\d{2}$", "%Y%m%d %H:%M:%S"),
            (r"^\d{4}-\d{2}-\d{2} \d{6}$", "%Y-%m-%d %H%M%S"),
        ];
        let mut results: Vec<DateResult<()>> = formats
            .into_iter()
            .map(|(pattern, format)| self.register_format(pattern, format))
            .collect();

        results.push(self.register_modifier(r"^T$", |base, _| Some(base)));
        results.push(self.register_modifier(r"^T([+-])(\d+)([SsmHdwMy])$", |base, caps| {
            let amount: i64 = caps[2].parse().ok()?;
            let amount = if &caps[1] == "-" { -amount } else { amount };
            modifiers::shift(base, TimeUnit::from_symbol(&caps[3])?, amount)
        }));
        results.push(self.register_modifier(r"^T<([smHdwMy])$", |base, caps| {
            modifiers::start_of(base, TimeUnit::from_symbol(&caps[1])?)
        }));
        results.push(self.register_modifier(r"^T>([smHdwMy])$", |base, caps| {
            modifiers::start_of_next(base, TimeUnit::from_symbol(&caps[1])?)
        }));

        for error in results.into_iter().filter_map(Result::err) {
            crate::log_error!(error.error_code(), "Default date pattern rejected",
                "error" => error
            );
        }
    }

    /// Register an absolute format. Whitespace in the input is collapsed to
    /// single spaces before matching.
    pub fn register_format(&mut self, pattern: &str, format: &str) -> DateResult<()> {
        self.register(pattern, DateHandler::Format(format.to_string()))
    }

    pub fn register_modifier<F>(&mut self, pattern: &str, modifier: F) -> DateResult<()>
    where
        F: Fn(NaiveDateTime, &Captures<'_>) -> Option<NaiveDateTime> + Send + Sync + 'static,
    {
        self.register(pattern, DateHandler::Modifier(Box::new(modifier)))
    }

    fn register(&mut self, pattern: &str, handler: DateHandler) -> DateResult<()> {
        if self.patterns.iter().any(|p| p.source == pattern) {
            return Err(DateParseError::DuplicatePattern {
                pattern: pattern.to_string(),
            });
        }
        let regex = Regex::new(pattern).map_err(|e| DateParseError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        self.patterns.push(DatePattern {
            source: pattern.to_string(),
            regex,
            handler,
        });
        Ok(())
    }

    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    /// Parse relative to the local wall clock
    pub fn parse(&self, text: &str) -> DateResult<NaiveDateTime> {
        self.parse_at(text, Local::now().naive_local())
    }

    /// Parse relative to an explicit "now"
    pub fn parse_at(&self, text: &str, now: NaiveDateTime) -> DateResult<NaiveDateTime> {
        let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if normalized.is_empty() {
            return Err(DateParseError::EmptyExpression);
        }
        if normalized.chars().count() > MAX_EXPRESSION_LENGTH {
            return Err(DateParseError::ExpressionTooLong {
                length: normalized.chars().count(),
            });
        }

        let mut consumed = 0;
        let mut current: Option<NaiveDateTime> = None;
        let mut steps = 0;

        while consumed < normalized.len() {
            steps += 1;
            if steps > MAX_MODIFIER_STEPS {
                return Err(DateParseError::TooManySteps {
                    text: text.to_string(),
                });
            }

            let rest = &normalized[consumed..];
            // Later steps always start with the `T` marker; it is implied
            // after an absolute date or a previous modifier.
            let prefixed = current.is_some() && !rest.starts_with('T');
            let candidate = if prefixed {
                format!("T{}", rest)
            } else {
                rest.to_string()
            };

            let base = current.unwrap_or(now);
            let matched = self.match_longest_prefix(&candidate, prefixed, base)?;
            let (length, value) = matched.ok_or_else(|| {
                if current.is_none() {
                    DateParseError::NoPatternMatched {
                        text: text.to_string(),
                    }
                } else {
                    DateParseError::UnconsumedInput {
                        text: text.to_string(),
                        remainder: rest.to_string(),
                    }
                }
            })?;

            consumed += if prefixed { length - 1 } else { length };
            current = Some(value);
        }

        current.ok_or(DateParseError::NoPatternMatched {
            text: text.to_string(),
        })
    }

    /// Longest prefix of `candidate` matched by any pattern, with its value
    fn match_longest_prefix(
        &self,
        candidate: &str,
        prefixed: bool,
        base: NaiveDateTime,
    ) -> DateResult<Option<(usize, NaiveDateTime)>> {
        let minimum = if prefixed { 2 } else { 1 };
        let mut ends: Vec<usize> = candidate
            .char_indices()
            .map(|(i, c)| i + c.len_utf8())
            .filter(|&end| end >= minimum)
            .collect();
        ends.reverse();

        for end in ends {
            let prefix = &candidate[..end];
            if let Some(result) = self.patterns.iter().find_map(|p| p.apply(prefix, base)) {
                return result.map(|value| Some((end, value)));
            }
        }
        Ok(None)
    }
}

fn parse_absolute(text: &str, format: &str) -> Option<NaiveDateTime> {
    if format.contains("%H") {
        NaiveDateTime::parse_from_str(text, format).ok()
    } else {
        NaiveDate::parse_from_str(text, format)
            .ok()
            .map(|date| date.and_time(NaiveTime::MIN))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn at(text: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn now() -> NaiveDateTime {
        // Wednesday
        at("2008-04-16 14:25:36")
    }

    fn parse(text: &str) -> DateResult<NaiveDateTime> {
        DateParser::with_default_patterns().parse_at(text, now())
    }

    #[test]
    fn test_absolute_formats() {
        assert_eq!(parse("20080101").unwrap(), at("2008-01-01 00:00:00"));
        assert_eq!(parse("2008-01-01").unwrap(), at("2008-01-01 00:00:00"));
        assert_eq!(parse("2008-01-01 12:30:45").unwrap(), at("2008-01-01 12:30:45"));
        assert_eq!(parse("20080101 123045").unwrap(), at("2008-01-01 12:30:45"));
        assert_eq!(parse("20080101   12:30:45").unwrap(), at("2008-01-01 12:30:45"));
        assert_eq!(parse("2008-01-01 123045").unwrap(), at("2008-01-01 12:30:45"));
    }

    #[test]
    fn test_now_and_shifts() {
        assert_eq!(parse("T").unwrap(), now());
        assert_eq!(parse("T-1d").unwrap(), at("2008-04-15 14:25:36"));
        assert_eq!(parse("T+2w").unwrap(), at("2008-04-30 14:25:36"));
        assert_eq!(parse("T+12H").unwrap(), at("2008-04-17 02:25:36"));
        assert_eq!(parse("T-1y").unwrap(), at("2007-04-16 14:25:36"));
        assert_eq!(
            parse("T+500S").unwrap(),
            now() + chrono::Duration::try_milliseconds(500).unwrap()
        );
    }

    #[test]
    fn test_truncation() {
        assert_eq!(parse("T<d").unwrap(), at("2008-04-16 00:00:00"));
        assert_eq!(parse("T>d").unwrap(), at("2008-04-17 00:00:00"));
        assert_eq!(parse("T<w").unwrap(), at("2008-04-14 00:00:00"));
        assert_eq!(parse("T<M").unwrap(), at("2008-04-01 00:00:00"));
        assert_eq!(parse("T>y").unwrap(), at("2009-01-01 00:00:00"));
        assert_eq!(parse("T<H").unwrap(), at("2008-04-16 14:00:00"));
    }

    #[test]
    fn test_modifier_chains() {
        assert_eq!(parse("T<M-1d").unwrap(), at("2008-03-31 00:00:00"));
        assert_eq!(parse("T-1d<d").unwrap(), at("2008-04-15 00:00:00"));
        assert_eq!(parse("T<d+1H+30m").unwrap(), at("2008-04-16 01:30:00"));
        assert_eq!(parse("T>M-1d").unwrap(), at("2008-04-30 00:00:00"));
    }

    #[test]
    fn test_absolute_date_with_modifiers() {
        assert_eq!(parse("2008-01-31+1M").unwrap(), at("2008-02-29 00:00:00"));
        assert_eq!(parse("2008-01-31T+1M").unwrap(), at("2008-02-29 00:00:00"));
        assert_eq!(parse("20080131T>y").unwrap(), at("2009-01-01 00:00:00"));
        assert_eq!(parse("2008-01-01T").unwrap(), at("2008-01-01 00:00:00"));
    }

    #[test]
    fn test_errors() {
        assert_matches!(parse(""), Err(DateParseError::EmptyExpression));
        assert_matches!(parse("   "), Err(DateParseError::EmptyExpression));
        assert_matches!(parse("yesterday"), Err(DateParseError::NoPatternMatched { .. }));
        assert_matches!(
            parse("T-1dxyz"),
            Err(DateParseError::UnconsumedInput { remainder, .. }) if remainder == "xyz"
        );
        assert_matches!(parse("T<q"), Err(DateParseError::UnconsumedInput { .. }));
        assert_matches!(parse("2008-13-45"), Err(DateParseError::OutOfRange { .. }));
        assert_matches!(parse("T+99999999999y"), Err(DateParseError::OutOfRange { .. }));
        let long = "T+1d".repeat(MAX_EXPRESSION_LENGTH);
        assert_matches!(parse(&long), Err(DateParseError::ExpressionTooLong { .. }));
    }

    #[test]
    fn test_step_limit() {
        let steps = "T".repeat(MAX_MODIFIER_STEPS + 1);
        if steps.len() <= MAX_EXPRESSION_LENGTH {
            assert_matches!(parse(&steps), Err(DateParseError::TooManySteps { .. }));
        }
    }

    #[test]
    fn test_default_table_is_complete() {
        let parser = DateParser::with_default_patterns();
        assert_eq!(parser.pattern_count(), 10);
        assert_eq!(DateParser::default().pattern_count(), 10);
    }

    #[test]
    fn test_registration() {
        let mut parser = DateParser::with_default_patterns();
        let before = parser.pattern_count();
        assert_matches!(
            parser.register_format(r"^\d{8}$", "%Y%m%d"),
            Err(DateParseError::DuplicatePattern { .. })
        );
        assert_matches!(
            parser.register_format(r"^(\d{4}$", "%Y"),
            Err(DateParseError::InvalidPattern { .. })
        );
        parser
            .register_format(r"^\d{2}/\d{2}/\d{4}$", "%d/%m/%Y")
            .unwrap();
        assert_eq!(parser.pattern_count(), before + 1);
        assert_eq!(parser.parse_at("31/12/2007", now()).unwrap(), at("2007-12-31 00:00:00"));
    }

    #[test]
    fn test_first_registered_pattern_wins() {
        let mut parser = DateParser::empty();
        parser
            .register_modifier(r"^T$", |_, _| Some(at("2000-01-01 00:00:00")))
            .unwrap();
        parser
            .register_modifier(r"^T$|^X$", |_, _| Some(at("1999-01-01 00:00:00")))
            .unwrap();
        assert_eq!(parser.parse_at("T", now()).unwrap(), at("2000-01-01 00:00:00"));
    }
}
