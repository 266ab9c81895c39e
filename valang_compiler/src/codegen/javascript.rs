//! JavaScript validator generation
//!
//! Emits a single expression of the form
//!
//! ```text
//! new ValangValidator('<name>',<install>,new Array(
//!     new ValangValidator.Rule('<field>','not implemented','<message>',function() {return <predicate>}),
//!     ...))
//! ```
//!
//! evaluated against a client-side `ValangValidator` runtime that provides the
//! helper functions named in [`operator_function`]. Custom functions without
//! a client-side name become a call that throws when the rule runs.

use crate::codegen::error::{TranslationError, TranslationResult};
use crate::codegen::messages::MessageSource;
use crate::config::runtime::TranslationPreferences;
use crate::dates::{self, DateParser};
use crate::functions::FunctionRegistry;
use crate::grammar::ast::nodes::*;
use crate::logging::codes;
use crate::{log_success, log_warning};
use chrono::{Datelike, NaiveDateTime, Timelike};
use std::fmt::Write;

/// Client helper for each operator; negated forms call the positive helper under `!`
pub const fn operator_function(operator: Operator) -> &'static str {
    match operator {
        Operator::Equal => "this.equals",
        Operator::NotEqual => "! this.equals",
        Operator::LessThan => "this.lessThan",
        Operator::LessThanOrEqual => "this.lessThanOrEquals",
        Operator::GreaterThan => "this.moreThan",
        Operator::GreaterThanOrEqual => "this.moreThanOrEquals",
        Operator::In => "this.inFunc",
        Operator::NotIn => "! this.inFunc",
        Operator::Between => "this.between",
        Operator::NotBetween => "! this.between",
        Operator::Null => "this.nullFunc",
        Operator::NotNull => "! this.nullFunc",
        Operator::HasText => "this.hasText",
        Operator::HasNoText => "! this.hasText",
        Operator::HasLength => "this.hasLength",
        Operator::HasNoLength => "! this.hasLength",
        Operator::IsBlank => "this.isBlank",
        Operator::IsNotBlank => "! this.isBlank",
        Operator::IsWord => "this.isWord",
        Operator::IsNotWord => "! this.isWord",
        Operator::IsUppercase => "this.isUpper",
        Operator::IsNotUppercase => "! this.isUpper",
        Operator::IsLowercase => "this.isLower",
        Operator::IsNotLowercase => "! this.isLower",
    }
}

pub struct JavaScriptTranslator<'a> {
    functions: &'a FunctionRegistry,
    dates: &'a DateParser,
    preferences: TranslationPreferences,
    /// Fixed "now" for relative date literals; the clock is read when unset
    now: Option<NaiveDateTime>,
    warnings: usize,
}

impl<'a> JavaScriptTranslator<'a> {
    pub fn new(functions: &'a FunctionRegistry) -> Self {
        Self {
            functions,
            dates: dates::shared(),
            preferences: TranslationPreferences::default(),
            now: None,
            warnings: 0,
        }
    }

    pub fn with_dates(mut self, dates: &'a DateParser) -> Self {
        self.dates = dates;
        self
    }

    pub fn with_preferences(mut self, preferences: TranslationPreferences) -> Self {
        self.preferences = preferences;
        self
    }

    /// Resolve relative dates against `now` instead of the clock
    pub fn at(mut self, now: NaiveDateTime) -> Self {
        self.now = Some(now);
        self
    }

    /// Warnings logged by the last translation
    pub fn warnings(&self) -> usize {
        self.warnings
    }

    pub fn translate(
        &mut self,
        rules: &[ValidationRule],
        messages: &dyn MessageSource,
    ) -> TranslationResult<String> {
        let mut out = String::new();
        self.write_validator(&mut out, rules, messages)?;
        Ok(out)
    }

    pub fn write_validator(
        &mut self,
        out: &mut dyn Write,
        rules: &[ValidationRule],
        messages: &dyn MessageSource,
    ) -> TranslationResult<()> {
        self.warnings = 0;

        out.write_str("new ValangValidator(")?;
        write_js_string(out, &self.preferences.validator_name)?;
        write!(out, ",{},new Array(", self.preferences.install_self_with_form)?;
        for (i, rule) in rules.iter().enumerate() {
            if i > 0 {
                out.write_char(',')?;
            }
            self.write_rule(out, rule, messages)?;
        }
        out.write_str("))")?;

        log_success!(codes::success::TRANSLATION_COMPLETE,
            "JavaScript translation completed",
            "validator" => self.preferences.validator_name.as_str(),
            "rules" => rules.len(),
            "warnings" => self.warnings
        );
        Ok(())
    }

    fn write_rule(
        &mut self,
        out: &mut dyn Write,
        rule: &ValidationRule,
        messages: &dyn MessageSource,
    ) -> TranslationResult<()> {
        out.write_str("new ValangValidator.Rule(")?;
        write_js_string(out, &rule.key)?;
        out.write_str(",'not implemented',")?;
        let message = self.error_message(rule, messages);
        write_js_string(out, &message)?;
        out.write_str(",function() {return ")?;

        match &rule.where_clause {
            // A failing guard passes the rule
            Some(guard) => {
                out.write_str("! (")?;
                self.write_predicate(out, guard)?;
                out.write_str(") || (")?;
                self.write_predicate(out, &rule.predicate)?;
                out.write_char(')')?;
            }
            None => self.write_predicate(out, &rule.predicate)?,
        }

        out.write_str("})")?;
        Ok(())
    }

    /// Message arguments are not interpolated on the client
    fn error_message(&mut self, rule: &ValidationRule, messages: &dyn MessageSource) -> String {
        match &rule.error_key {
            Some(key) if !key.is_empty() && !rule.error_args.is_empty() => {
                self.warnings += 1;
                log_warning!(codes::translation::UNTRANSLATED_ARGUMENTS,
                    "Message arguments are not translated; using the default message",
                    "rule" => rule.key.as_str(),
                    "error_key" => key.as_str()
                );
                rule.message.clone()
            }
            Some(key) if !key.is_empty() => messages.message_or(key, &rule.message),
            _ => rule.message.clone(),
        }
    }

    fn write_predicate(&mut self, out: &mut dyn Write, predicate: &Predicate) -> TranslationResult<()> {
        match predicate {
            Predicate::Test(test) => self.write_test(out, test),
            Predicate::And(left, right) => self.write_junction(out, left, right, " && "),
            Predicate::Or(left, right) => self.write_junction(out, left, right, " || "),
            Predicate::Not(inner) => {
                out.write_str("! (")?;
                self.write_predicate(out, inner)?;
                out.write_char(')')?;
                Ok(())
            }
        }
    }

    fn write_junction(
        &mut self,
        out: &mut dyn Write,
        left: &Predicate,
        right: &Predicate,
        joiner: &str,
    ) -> TranslationResult<()> {
        out.write_char('(')?;
        self.write_predicate(out, left)?;
        write!(out, "){}(", joiner)?;
        self.write_predicate(out, right)?;
        out.write_char(')')?;
        Ok(())
    }

    fn write_test(&mut self, out: &mut dyn Write, test: &TestPredicate) -> TranslationResult<()> {
        out.write_str(operator_function(test.operator))?;
        out.write_str("((")?;
        self.write_function(out, &test.left)?;
        out.write_str("), (")?;
        match &test.right {
            Some(right) => self.write_function(out, right)?,
            None => out.write_str("null")?,
        }
        out.write_str("))")?;
        Ok(())
    }

    fn write_function(&mut self, out: &mut dyn Write, function: &Function) -> TranslationResult<()> {
        match function {
            Function::Literal(literal) => write_literal(out, literal)?,
            Function::Property(path) | Function::Collection(path) => {
                write_property(out, path)?;
            }
            Function::Target => out.write_str("this.getTargetBean()")?,
            Function::MapEntry { map, key } => {
                out.write_char('(')?;
                write_property(out, map)?;
                out.write_char('[')?;
                self.write_function(out, key)?;
                out.write_str("])")?;
            }
            Function::DateLiteral(date) => self.write_date(out, date)?,
            Function::EnumLiteral(literal) => write_js_string(out, &literal.member)?,
            Function::List(items) => self.write_array(out, items)?,
            Function::Math { op, left, right } => {
                write!(out, "this.{}((", op.client_name())?;
                self.write_function(out, left)?;
                out.write_str("),(")?;
                self.write_function(out, right)?;
                out.write_str("))")?;
            }
            Function::Length(arg) => self.write_call(out, "this.lengthOf", &[arg])?,
            Function::UpperCase(arg) => self.write_call(out, "this.upperCase", &[arg])?,
            Function::LowerCase(arg) => self.write_call(out, "this.lowerCase", &[arg])?,
            Function::Email(arg) => self.write_call(out, "this.email", &[arg])?,
            Function::InRole(arg) => self.write_call(out, "this.inRole", &[arg])?,
            Function::RegEx { pattern, value } => {
                self.write_call(out, "this.matches", &[pattern, value])?
            }
            Function::Not(arg) => {
                out.write_str("! ")?;
                self.write_function(out, arg)?;
            }
            Function::Custom { name, args } => self.write_custom(out, name, args)?,
        }
        Ok(())
    }

    fn write_call(
        &mut self,
        out: &mut dyn Write,
        helper: &str,
        args: &[&Function],
    ) -> TranslationResult<()> {
        out.write_str(helper)?;
        out.write_char('(')?;
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                out.write_char(',')?;
            }
            self.write_function(out, arg)?;
        }
        out.write_char(')')?;
        Ok(())
    }

    fn write_array(&mut self, out: &mut dyn Write, items: &[Function]) -> TranslationResult<()> {
        out.write_str("new Array(")?;
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                out.write_char(',')?;
            }
            self.write_function(out, item)?;
        }
        out.write_char(')')?;
        Ok(())
    }

    fn write_custom(
        &mut self,
        out: &mut dyn Write,
        name: &str,
        args: &[Function],
    ) -> TranslationResult<()> {
        match self.functions.client_name(name) {
            Some(client_name) => {
                let helper = format!("this.{}", client_name);
                let args: Vec<&Function> = args.iter().collect();
                self.write_call(out, &helper, &args)
            }
            None => {
                self.warnings += 1;
                log_warning!(codes::translation::UNSUPPORTED_FUNCTION,
                    "Custom function has no client-side counterpart",
                    "function" => name
                );
                out.write_str("this._throwError(")?;
                write_js_string(
                    out,
                    &format!("don't know how to handle custom function '{}'", name),
                )?;
                out.write_char(')')?;
                Ok(())
            }
        }
    }

    /// Resolved now; months are zero-based on the client
    fn write_date(&self, out: &mut dyn Write, date: &DateLiteral) -> TranslationResult<()> {
        let resolved = match self.now {
            Some(now) => self.dates.parse_at(&date.raw, now),
            None => self.dates.parse(&date.raw),
        }
        .map_err(|source| TranslationError::Date {
            text: date.raw.clone(),
            source,
        })?;

        write!(
            out,
            "new Date({}, {}, {}, {}, {}, {}, {})",
            resolved.year(),
            resolved.month0(),
            resolved.day(),
            resolved.hour(),
            resolved.minute(),
            resolved.second(),
            resolved.nanosecond() / 1_000_000
        )?;
        Ok(())
    }
}

fn write_property(out: &mut dyn Write, path: &PropertyPath) -> TranslationResult<()> {
    out.write_str("this.getPropertyValue(")?;
    write_js_string(out, &path.to_string())?;
    out.write_char(')')?;
    Ok(())
}

fn write_literal(out: &mut dyn Write, literal: &Literal) -> TranslationResult<()> {
    match literal {
        Literal::String(text) => write_js_string(out, text)?,
        Literal::Number(value) => out.write_str(&decimal_text(value))?,
        Literal::Boolean(value) => write!(out, "{}", value)?,
        Literal::Null => out.write_str("null")?,
    }
    Ok(())
}

/// Plain decimal notation without trailing fraction zeros
fn decimal_text(value: &bigdecimal::BigDecimal) -> String {
    let text = value.to_string();
    if text.contains('.') && !text.contains(['e', 'E']) {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text
    }
}

/// Single-quoted JavaScript string literal
pub fn js_string(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('\'');
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\'' => quoted.push_str("\\'"),
            '\\' => quoted.push_str("\\\\"),
            '/' => quoted.push_str("\\/"),
            '\t' => quoted.push_str("\\t"),
            '\n' => quoted.push_str("\\n"),
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                quoted.push_str("\\n");
            }
            '\u{0c}' => quoted.push_str("\\f"),
            '\u{08}' => quoted.push_str("\\b"),
            '\u{0b}' => quoted.push_str("\\v"),
            '<' => quoted.push_str("\\u003C"),
            '>' => quoted.push_str("\\u003E"),
            '\u{2028}' => quoted.push_str("\\u2028"),
            '\u{2029}' => quoted.push_str("\\u2029"),
            other => quoted.push(other),
        }
    }
    quoted.push('\'');
    quoted
}

fn write_js_string(out: &mut dyn Write, text: &str) -> TranslationResult<()> {
    out.write_str(&js_string(text))?;
    Ok(())
}
