//! Declarative show/hide/enable/disable rules between properties.
//!
//! A rule lives on the *source* property. When evaluated, the source's
//! current value is compared against the rule's literal and the resulting
//! [`WidgetControl`] is applied to the *target* property's presentation
//! flags. This is pure flag bookkeeping; no widget is involved.

use std::fmt;
use std::str::FromStr;

use crate::value::Comparison;

/// Relation tested between the source value and the rule literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Equal,
    NotEqual,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
}

impl Relation {
    /// Tests the relation against a three-way comparison result.
    ///
    /// Incomparable and unsupported results never satisfy any relation.
    pub fn holds(self, comparison: Comparison) -> bool {
        let Some(ordering) = comparison.ordering() else {
            return false;
        };
        match self {
            Relation::Equal => ordering.is_eq(),
            Relation::NotEqual => ordering.is_ne(),
            Relation::Less => ordering.is_lt(),
            Relation::LessOrEqual => ordering.is_le(),
            Relation::Greater => ordering.is_gt(),
            Relation::GreaterOrEqual => ordering.is_ge(),
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Relation::Equal => "==",
            Relation::NotEqual => "!=",
            Relation::Less => "<",
            Relation::LessOrEqual => "<=",
            Relation::Greater => ">",
            Relation::GreaterOrEqual => ">=",
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Relation {
    type Err = String;

    /// Accepts the operator symbols and the short names `eq ne lt le gt ge`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "==" | "=" | "eq" => Ok(Relation::Equal),
            "!=" | "ne" => Ok(Relation::NotEqual),
            "<" | "lt" => Ok(Relation::Less),
            "<=" | "le" => Ok(Relation::LessOrEqual),
            ">" | "gt" => Ok(Relation::Greater),
            ">=" | "ge" => Ok(Relation::GreaterOrEqual),
            other => Err(format!("unknown relation {other:?}")),
        }
    }
}

/// Presentation changes a rule can request for its target.
///
/// `SHOW`/`HIDE` drive the hidden flag, `SENSITIVE`/`INSENSITIVE` the
/// enabled state. When both bits of a pair are set, the negative one wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WidgetControl(pub u8);

impl WidgetControl {
    pub const NONE: WidgetControl = WidgetControl(0);
    pub const SHOW: u8 = 1 << 0;
    pub const HIDE: u8 = 1 << 1;
    pub const SENSITIVE: u8 = 1 << 2;
    pub const INSENSITIVE: u8 = 1 << 3;

    pub fn contains(self, bit: u8) -> bool {
        self.0 & bit != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// One `(relation, literal, target, on_match, on_no_match)` rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlRule {
    pub relation: Relation,
    /// Literal parsed with the source property's kind at evaluation time.
    pub test_value: String,
    /// Key of the property whose flags are changed.
    pub target: String,
    pub on_match: WidgetControl,
    pub on_no_match: WidgetControl,
}

impl ControlRule {
    pub fn new(relation: Relation, test_value: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            relation,
            test_value: test_value.into(),
            target: target.into(),
            on_match: WidgetControl::NONE,
            on_no_match: WidgetControl::NONE,
        }
    }

    pub fn on_match(mut self, control: u8) -> Self {
        self.on_match = WidgetControl(control);
        self
    }

    pub fn on_no_match(mut self, control: u8) -> Self {
        self.on_no_match = WidgetControl(control);
        self
    }

    /// Picks the control for a comparison result.
    pub fn outcome(&self, comparison: Comparison) -> WidgetControl {
        if self.relation.holds(comparison) {
            self.on_match
        } else {
            self.on_no_match
        }
    }
}

/// A control to apply to `target`, produced by evaluating a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleOutcome {
    pub source: String,
    pub target: String,
    pub control: WidgetControl,
}
