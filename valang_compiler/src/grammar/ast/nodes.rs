//! AST node definitions for Valang rules
//!
//! A rule source compiles to a list of [`ValidationRule`]s. Each rule owns a
//! [`Predicate`] tree whose leaves are [`TestPredicate`]s comparing two
//! [`Function`] operands with an [`Operator`].
//!
//! Design principles:
//! - Closed sets: predicates, operators and functions are enums so every
//!   consumer (evaluator, JavaScript backend, renderer) matches exhaustively
//! - Span tracking: rules and test predicates keep their source span
//! - Serde compatible: the whole tree serialises for tooling and caching
//! - `Display` renders a tree back to rule text that parses to the same tree

use crate::utils::Span;
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::fmt;

// === RULES ===

/// One `{ key : predicate [WHERE guard] : 'message' [: 'errorKey' [: args]] }` block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationRule {
    /// Target key as written (`age`, `customer.name`, `map[Test Key]`, `this`)
    pub key: String,
    pub predicate: Predicate,
    /// Rule is skipped when the guard evaluates to false
    pub where_clause: Option<Predicate>,
    /// Message template with `{0}`, `{1}` placeholders
    pub message: String,
    pub error_key: Option<String>,
    /// Evaluated at failure time to fill the message placeholders
    pub error_args: Vec<Function>,
    pub span: Span,
}

/// Rule key that reports against the target itself rather than a field
pub const GLOBAL_RULE_KEY: &str = "this";

impl ValidationRule {
    /// Error code reported on failure: the error key, falling back to the rule key
    pub fn error_code(&self) -> &str {
        self.error_key.as_deref().unwrap_or(&self.key)
    }

    pub fn is_global(&self) -> bool {
        self.key == GLOBAL_RULE_KEY
    }

    pub fn has_where_clause(&self) -> bool {
        self.where_clause.is_some()
    }
}

impl fmt::Display for ValidationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{} : {}", self.key, self.predicate)?;
        if let Some(guard) = &self.where_clause {
            write!(f, " where {}", guard)?;
        }
        write!(f, " : {}", quote(&self.message))?;
        if let Some(error_key) = &self.error_key {
            write!(f, " : {}", quote(error_key))?;
            if !self.error_args.is_empty() {
                write!(f, " : {}", join(&self.error_args, ", "))?;
            }
        }
        f.write_str("}")
    }
}

// === PREDICATES ===

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Predicate {
    Test(TestPredicate),
    And(Box<Predicate>, Box<Predicate>),
    Or(Box<Predicate>, Box<Predicate>),
    Not(Box<Predicate>),
}

impl Predicate {
    pub fn and(left: Predicate, right: Predicate) -> Self {
        Predicate::And(Box::new(left), Box::new(right))
    }

    pub fn or(left: Predicate, right: Predicate) -> Self {
        Predicate::Or(Box::new(left), Box::new(right))
    }

    pub fn negate(inner: Predicate) -> Self {
        Predicate::Not(Box::new(inner))
    }

    /// Every test predicate in the tree, left to right
    pub fn tests(&self) -> Vec<&TestPredicate> {
        let mut found = Vec::new();
        self.collect_tests(&mut found);
        found
    }

    fn collect_tests<'a>(&'a self, found: &mut Vec<&'a TestPredicate>) {
        match self {
            Predicate::Test(test) => found.push(test),
            Predicate::And(left, right) | Predicate::Or(left, right) => {
                left.collect_tests(found);
                right.collect_tests(found);
            }
            Predicate::Not(inner) => inner.collect_tests(found),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Test(test) => write!(f, "{}", test),
            Predicate::And(left, right) => write!(f, "({} and {})", left, right),
            Predicate::Or(left, right) => write!(f, "({} or {})", left, right),
            Predicate::Not(inner) => write!(f, "not ({})", inner),
        }
    }
}

/// `left OPERATOR [right]`
///
/// `right` is `None` exactly for unary operators. For `BETWEEN` it is a
/// two-element [`Function::List`]; for `IN` a list or a collection reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestPredicate {
    pub left: Function,
    pub operator: Operator,
    pub right: Option<Function>,
    pub span: Span,
}

impl TestPredicate {
    pub fn new(left: Function, operator: Operator, right: Option<Function>, span: Span) -> Self {
        Self {
            left,
            operator,
            right,
            span,
        }
    }
}

impl fmt::Display for TestPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.left, self.operator.spelling())?;
        match (&self.right, self.operator) {
            (None, _) => Ok(()),
            (Some(Function::List(bounds)), Operator::Between | Operator::NotBetween) => {
                write!(f, " {}", join(bounds, " and "))
            }
            (Some(Function::List(items)), _) => write!(f, " {}", join(items, ", ")),
            (Some(right), _) => write!(f, " {}", right),
        }
    }
}

// === OPERATORS ===

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operator {
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    In,
    NotIn,
    Between,
    NotBetween,
    Null,
    NotNull,
    HasText,
    HasNoText,
    HasLength,
    HasNoLength,
    IsBlank,
    IsNotBlank,
    IsWord,
    IsNotWord,
    IsUppercase,
    IsNotUppercase,
    IsLowercase,
    IsNotLowercase,
}

pub const ALL_OPERATORS: &[Operator] = &[
    Operator::Equal,
    Operator::NotEqual,
    Operator::LessThan,
    Operator::LessThanOrEqual,
    Operator::GreaterThan,
    Operator::GreaterThanOrEqual,
    Operator::In,
    Operator::NotIn,
    Operator::Between,
    Operator::NotBetween,
    Operator::Null,
    Operator::NotNull,
    Operator::HasText,
    Operator::HasNoText,
    Operator::HasLength,
    Operator::HasNoLength,
    Operator::IsBlank,
    Operator::IsNotBlank,
    Operator::IsWord,
    Operator::IsNotWord,
    Operator::IsUppercase,
    Operator::IsNotUppercase,
    Operator::IsLowercase,
    Operator::IsNotLowercase,
];

impl Operator {
    /// Canonical upper-case name (`LESS_THAN_OR_EQUAL`)
    pub const fn name(self) -> &'static str {
        match self {
            Self::Equal => "EQUAL",
            Self::NotEqual => "NOT_EQUAL",
            Self::LessThan => "LESS_THAN",
            Self::LessThanOrEqual => "LESS_THAN_OR_EQUAL",
            Self::GreaterThan => "GREATER_THAN",
            Self::GreaterThanOrEqual => "GREATER_THAN_OR_EQUAL",
            Self::In => "IN",
            Self::NotIn => "NOT_IN",
            Self::Between => "BETWEEN",
            Self::NotBetween => "NOT_BETWEEN",
            Self::Null => "NULL",
            Self::NotNull => "NOT_NULL",
            Self::HasText => "HAS_TEXT",
            Self::HasNoText => "HAS_NO_TEXT",
            Self::HasLength => "HAS_LENGTH",
            Self::HasNoLength => "HAS_NO_LENGTH",
            Self::IsBlank => "IS_BLANK",
            Self::IsNotBlank => "IS_NOT_BLANK",
            Self::IsWord => "IS_WORD",
            Self::IsNotWord => "IS_NOT_WORD",
            Self::IsUppercase => "IS_UPPERCASE",
            Self::IsNotUppercase => "IS_NOT_UPPERCASE",
            Self::IsLowercase => "IS_LOWERCASE",
            Self::IsNotLowercase => "IS_NOT_LOWERCASE",
        }
    }

    /// Rule-text spelling that parses back to this operator
    pub const fn spelling(self) -> &'static str {
        match self {
            Self::Equal => "=",
            Self::NotEqual => "!=",
            Self::LessThan => "<",
            Self::LessThanOrEqual => "<=",
            Self::GreaterThan => ">",
            Self::GreaterThanOrEqual => ">=",
            Self::In => "in",
            Self::NotIn => "not in",
            Self::Between => "between",
            Self::NotBetween => "not between",
            Self::Null => "is null",
            Self::NotNull => "is not null",
            Self::HasText => "has text",
            Self::HasNoText => "has no text",
            Self::HasLength => "has length",
            Self::HasNoLength => "has no length",
            Self::IsBlank => "is blank",
            Self::IsNotBlank => "is not blank",
            Self::IsWord => "is word",
            Self::IsNotWord => "is not word",
            Self::IsUppercase => "is uppercase",
            Self::IsNotUppercase => "is not uppercase",
            Self::IsLowercase => "is lowercase",
            Self::IsNotLowercase => "is not lowercase",
        }
    }

    /// Operators that take no right operand
    pub const fn is_unary(self) -> bool {
        matches!(
            self,
            Self::Null
                | Self::NotNull
                | Self::HasText
                | Self::HasNoText
                | Self::HasLength
                | Self::HasNoLength
                | Self::IsBlank
                | Self::IsNotBlank
                | Self::IsWord
                | Self::IsNotWord
                | Self::IsUppercase
                | Self::IsNotUppercase
                | Self::IsLowercase
                | Self::IsNotLowercase
        )
    }

    pub const fn is_ordering(self) -> bool {
        matches!(
            self,
            Self::LessThan | Self::LessThanOrEqual | Self::GreaterThan | Self::GreaterThanOrEqual
        )
    }

    /// Negated forms are evaluated as the logical complement of `positive()`
    pub const fn is_negated(self) -> bool {
        matches!(
            self,
            Self::NotEqual
                | Self::NotIn
                | Self::NotBetween
                | Self::NotNull
                | Self::HasNoText
                | Self::HasNoLength
                | Self::IsNotBlank
                | Self::IsNotWord
                | Self::IsNotUppercase
                | Self::IsNotLowercase
        )
    }

    /// Logical complement: `EQUAL` <-> `NOT_EQUAL`, `LESS_THAN` <-> `GREATER_THAN_OR_EQUAL`
    pub const fn negate(self) -> Self {
        match self {
            Self::Equal => Self::NotEqual,
            Self::NotEqual => Self::Equal,
            Self::LessThan => Self::GreaterThanOrEqual,
            Self::LessThanOrEqual => Self::GreaterThan,
            Self::GreaterThan => Self::LessThanOrEqual,
            Self::GreaterThanOrEqual => Self::LessThan,
            Self::In => Self::NotIn,
            Self::NotIn => Self::In,
            Self::Between => Self::NotBetween,
            Self::NotBetween => Self::Between,
            Self::Null => Self::NotNull,
            Self::NotNull => Self::Null,
            Self::HasText => Self::HasNoText,
            Self::HasNoText => Self::HasText,
            Self::HasLength => Self::HasNoLength,
            Self::HasNoLength => Self::HasLength,
            Self::IsBlank => Self::IsNotBlank,
            Self::IsNotBlank => Self::IsBlank,
            Self::IsWord => Self::IsNotWord,
            Self::IsNotWord => Self::IsWord,
            Self::IsUppercase => Self::IsNotUppercase,
            Self::IsNotUppercase => Self::IsUppercase,
            Self::IsLowercase => Self::IsNotLowercase,
            Self::IsNotLowercase => Self::IsLowercase,
        }
    }

    /// The non-negated form of this operator
    pub const fn positive(self) -> Self {
        if self.is_negated() {
            self.negate()
        } else {
            self
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// === FUNCTIONS ===

/// Value-producing AST node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Function {
    Literal(Literal),
    /// Property of the target: `age`, `customer.name`, `tags[1]`, `rows[].qty`
    Property(PropertyPath),
    /// `this`: the target itself
    Target,
    /// `@map[keyExpr]`: entry of the map at `map` under the evaluated key
    MapEntry {
        map: PropertyPath,
        key: Box<Function>,
    },
    /// `@path`: the collection at `path`, used as an `in` set
    Collection(PropertyPath),
    /// `[...]`: fixed or relative date, resolved at evaluation time
    DateLiteral(DateLiteral),
    /// `['...']`: enum member resolved against the other operand's type
    EnumLiteral(EnumLiteral),
    /// Operand list of `in` and `between`
    List(Vec<Function>),
    Math {
        op: MathOperator,
        left: Box<Function>,
        right: Box<Function>,
    },
    Length(Box<Function>),
    UpperCase(Box<Function>),
    LowerCase(Box<Function>),
    Not(Box<Function>),
    Email(Box<Function>),
    InRole(Box<Function>),
    RegEx {
        pattern: Box<Function>,
        value: Box<Function>,
    },
    /// Host-registered function, resolved by name at evaluation time
    Custom {
        name: String,
        args: Vec<Function>,
    },
}

impl Function {
    pub fn string(text: impl Into<String>) -> Self {
        Function::Literal(Literal::String(text.into()))
    }

    pub fn number(value: BigDecimal) -> Self {
        Function::Literal(Literal::Number(value))
    }

    pub fn property(path: PropertyPath) -> Self {
        Function::Property(path)
    }

    pub fn math(op: MathOperator, left: Function, right: Function) -> Self {
        Function::Math {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Function::Literal(literal) => write!(f, "{}", literal),
            Function::Property(path) => write!(f, "{}", path),
            Function::Target => f.write_str("this"),
            Function::MapEntry { map, key } => write!(f, "@{}[{}]", map, key),
            Function::Collection(path) => write!(f, "@{}", path),
            Function::DateLiteral(date) => write!(f, "[{}]", date.raw),
            Function::EnumLiteral(literal) => write!(f, "['{}']", literal.raw),
            Function::List(items) => write!(f, "{}", join(items, ", ")),
            Function::Math { op, left, right } => {
                write!(f, "({} {} {})", left, op.symbol(), right)
            }
            Function::Length(arg) => write!(f, "length({})", arg),
            Function::UpperCase(arg) => write!(f, "upper({})", arg),
            Function::LowerCase(arg) => write!(f, "lower({})", arg),
            Function::Not(arg) => write!(f, "!({})", arg),
            Function::Email(arg) => write!(f, "email({})", arg),
            Function::InRole(arg) => write!(f, "inRole({})", arg),
            Function::RegEx { pattern, value } => write!(f, "matches({}, {})", pattern, value),
            Function::Custom { name, args } => write!(f, "{}({})", name, join(args, ", ")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MathOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
}

impl MathOperator {
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Modulo => "%",
        }
    }

    /// Helper name used by the client-side runtime (`this.add(..)`)
    pub const fn client_name(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Subtract => "subtract",
            Self::Multiply => "multiply",
            Self::Divide => "divide",
            Self::Modulo => "modulo",
        }
    }
}

// === LITERALS ===

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Literal {
    String(String),
    Number(BigDecimal),
    Boolean(bool),
    Null,
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::String(text) => f.write_str(&quote(text)),
            Literal::Number(value) => write!(f, "{}", value),
            Literal::Boolean(value) => write!(f, "{}", value),
            Literal::Null => f.write_str("null"),
        }
    }
}

/// Date expression text between the brackets, checked at parse time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateLiteral {
    pub raw: String,
}

impl DateLiteral {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }
}

/// `['Type.MEMBER']` or `['MEMBER']`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumLiteral {
    pub raw: String,
    /// Qualifying type name, when written
    pub type_name: Option<String>,
    pub member: String,
}

impl EnumLiteral {
    /// Split `Type.MEMBER` at the last dot; `None` for empty parts or stray whitespace
    pub fn parse(raw: &str) -> Option<Self> {
        let valid_part = |part: &str| {
            !part.is_empty()
                && part
                    .chars()
                    .all(|c| c.is_alphanumeric() || c == '_' || c == '$' || c == '.')
        };

        let (type_name, member) = match raw.rsplit_once('.') {
            Some((type_name, member)) => (Some(type_name), member),
            None => (None, raw),
        };

        if !valid_part(member) || member.contains('.') {
            return None;
        }
        if let Some(type_name) = type_name {
            if !valid_part(type_name) || type_name.split('.').any(str::is_empty) {
                return None;
            }
        }

        Some(Self {
            raw: raw.to_string(),
            type_name: type_name.map(str::to_string),
            member: member.to_string(),
        })
    }
}

// === PROPERTY PATHS ===

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PathSegment {
    /// `.name`
    Field(String),
    /// `[Test Key]`: raw map key
    Key(String),
    /// `[3]`: zero-based list index
    Index(usize),
    /// `[]`: the caller-supplied default index
    DefaultIndex,
}

/// Dotted and bracketed property path
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PropertyPath {
    pub segments: Vec<PathSegment>,
}

impl PropertyPath {
    pub fn new(segments: Vec<PathSegment>) -> Self {
        Self { segments }
    }

    pub fn field(name: impl Into<String>) -> Self {
        Self::new(vec![PathSegment::Field(name.into())])
    }

    /// Parse `customer.name`, `map[Test Key]`, `rows[2].qty`, `rows[]`
    ///
    /// A leading `this.` is dropped. Returns `None` for malformed text.
    pub fn parse(text: &str) -> Option<Self> {
        let mut segments = Vec::new();
        let mut chars = text.char_indices().peekable();
        let mut expect_name = true;

        while let Some(&(start, ch)) = chars.peek() {
            match ch {
                '[' => {
                    chars.next();
                    let mut depth = 1usize;
                    let mut content = String::new();
                    for (_, c) in chars.by_ref() {
                        match c {
                            '[' => depth += 1,
                            ']' => depth -= 1,
                            _ => {}
                        }
                        if depth == 0 {
                            break;
                        }
                        content.push(c);
                    }
                    if depth != 0 || segments.is_empty() {
                        return None;
                    }
                    segments.push(PathSegment::from_bracket(&content));
                    expect_name = false;
                }
                '.' => {
                    if expect_name {
                        return None;
                    }
                    chars.next();
                    expect_name = true;
                }
                _ => {
                    if !expect_name {
                        return None;
                    }
                    let mut end = start;
                    while let Some(&(i, c)) = chars.peek() {
                        if c == '.' || c == '[' {
                            break;
                        }
                        if !(c.is_alphanumeric() || c == '_' || c == '$') {
                            return None;
                        }
                        end = i + c.len_utf8();
                        chars.next();
                    }
                    segments.push(PathSegment::Field(text[start..end].to_string()));
                    expect_name = false;
                }
            }
        }

        if expect_name || segments.is_empty() {
            return None;
        }

        if segments.len() > 1 && segments[0] == PathSegment::Field("this".to_string()) {
            segments.remove(0);
        }

        Some(Self { segments })
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    pub fn uses_default_index(&self) -> bool {
        self.segments.contains(&PathSegment::DefaultIndex)
    }

    /// First field name, used as the error field for a rule
    pub fn root(&self) -> Option<&str> {
        match self.segments.first() {
            Some(PathSegment::Field(name)) => Some(name),
            _ => None,
        }
    }
}

impl PathSegment {
    fn from_bracket(content: &str) -> Self {
        if content.is_empty() {
            PathSegment::DefaultIndex
        } else if content.chars().all(|c| c.is_ascii_digit()) {
            content
                .parse()
                .map(PathSegment::Index)
                .unwrap_or_else(|_| PathSegment::Key(content.to_string()))
        } else {
            PathSegment::Key(content.to_string())
        }
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Field(name) if i == 0 => f.write_str(name)?,
                PathSegment::Field(name) => write!(f, ".{}", name)?,
                PathSegment::Key(key) => write!(f, "[{}]", key)?,
                PathSegment::Index(index) => write!(f, "[{}]", index)?,
                PathSegment::DefaultIndex => f.write_str("[]")?,
            }
        }
        Ok(())
    }
}

// === RENDERING HELPERS ===

/// Single-quoted rule-text string with `\` and `'` escaped
pub fn quote(text: &str) -> String {
    format!("'{}'", text.replace('\\', "\\\\").replace('\'', "\\'"))
}

fn join(items: &[Function], separator: &str) -> String {
    items
        .iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(separator)
}
