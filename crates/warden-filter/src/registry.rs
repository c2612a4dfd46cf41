//! Filter panel registry
//!
//! A declarative rule table mapping a column descriptor to the input panel
//! that edits it. Rules are tested in priority order and the final rule
//! always matches, so every column resolves to exactly one panel. Each
//! panel model knows how to turn its current state into wire filters;
//! empty models produce no filters, which is what keeps empty values out
//! of the merge.

use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::LazyLock;

use crate::filter::{Filter, FilterValue, Operator};

static MONEY_FIELD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(amount|balance)$").unwrap());
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Text,
    Number,
    Date,
    Enum,
}

/// Column descriptor handed over by a list view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    pub field: String,
    pub header: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub column_type: Option<ColumnType>,
    /// Option objects for enum columns.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub option_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub option_value: Option<String>,
}

impl Column {
    pub fn new(field: impl Into<String>, header: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            header: header.into(),
            column_type: None,
            options: Vec::new(),
            option_label: None,
            option_value: None,
        }
    }

    pub fn typed(mut self, column_type: ColumnType) -> Self {
        self.column_type = Some(column_type);
        self
    }

    pub fn options(mut self, options: Vec<Value>) -> Self {
        self.options = options;
        self
    }

    pub fn option_label(mut self, label: impl Into<String>) -> Self {
        self.option_label = Some(label.into());
        self
    }
}

/// Which joined entity and field the produced filters target.
#[derive(Debug, Clone)]
pub struct PanelContext {
    pub source: String,
    pub field: String,
}

impl PanelContext {
    pub fn new(source: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            field: field.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelKind {
    Date,
    NumberRange,
    MultiSelect,
    Text,
}

/// Exact date, or an inclusive bound pair. A set `date` wins over bounds.
#[derive(Debug, Clone, Default)]
pub struct DateModel {
    pub date: Option<NaiveDate>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateModel {
    pub fn to_filters(&self, ctx: &PanelContext) -> Vec<Filter> {
        if let Some(date) = self.date {
            return vec![Filter::new(
                ctx.source.as_str(),
                ctx.field.as_str(),
                Operator::Eq,
                ymd(date),
            )];
        }

        let mut out = Vec::new();
        if let Some(from) = self.from {
            out.push(Filter::new(
                ctx.source.as_str(),
                ctx.field.as_str(),
                Operator::Gte,
                day_start_iso(from),
            ));
        }
        if let Some(to) = self.to {
            out.push(Filter::new(
                ctx.source.as_str(),
                ctx.field.as_str(),
                Operator::Lte,
                day_end_iso(to),
            ));
        }
        out
    }
}

/// Single value with a chosen operator, or a min/max pair. A set `single`
/// wins over the pair.
#[derive(Debug, Clone)]
pub struct RangeModel {
    pub min: Option<Decimal>,
    pub max: Option<Decimal>,
    pub single: Option<Decimal>,
    pub single_op: Operator,
}

impl Default for RangeModel {
    fn default() -> Self {
        Self {
            min: None,
            max: None,
            single: None,
            single_op: Operator::Eq,
        }
    }
}

impl RangeModel {
    pub fn to_filters(&self, ctx: &PanelContext) -> Vec<Filter> {
        if let Some(single) = self.single {
            return vec![Filter::new(
                ctx.source.as_str(),
                ctx.field.as_str(),
                self.single_op.clone(),
                money(single),
            )];
        }

        let mut out = Vec::new();
        if let Some(min) = self.min {
            out.push(Filter::new(ctx.source.as_str(), ctx.field.as_str(), Operator::Gte, money(min)));
        }
        if let Some(max) = self.max {
            out.push(Filter::new(ctx.source.as_str(), ctx.field.as_str(), Operator::Lte, money(max)));
        }
        out
    }
}

/// Selected option values of a multi-select; one `=` filter per value.
#[derive(Debug, Clone, Default)]
pub struct EnumModel {
    pub selected: Vec<FilterValue>,
}

impl EnumModel {
    /// `col` supplies the option objects used to attach display labels.
    pub fn to_filters(&self, ctx: &PanelContext, col: &Column) -> Vec<Filter> {
        let labels = option_labels(col);

        self.selected
            .iter()
            .map(|value| {
                let mut filter = Filter::new(
                    ctx.source.as_str(),
                    ctx.field.as_str(),
                    Operator::Eq,
                    value.clone(),
                );
                if let Some(label) = labels.get(&render_value(value)) {
                    filter = filter.display(label.clone());
                }
                filter
            })
            .collect()
    }
}

/// Free-text substring search.
#[derive(Debug, Clone, Default)]
pub struct TextModel {
    pub query: Option<String>,
}

impl TextModel {
    pub fn to_filters(&self, ctx: &PanelContext) -> Vec<Filter> {
        let query = match &self.query {
            Some(q) => WHITESPACE.replace_all(q.trim(), " ").into_owned(),
            None => return Vec::new(),
        };
        if query.is_empty() {
            return Vec::new();
        }

        vec![Filter::new(ctx.source.as_str(), ctx.field.as_str(), Operator::Like, query)]
    }
}

#[derive(Debug, Clone)]
pub enum PanelModel {
    Date(DateModel),
    Range(RangeModel),
    Enum(EnumModel),
    Text(TextModel),
}

impl PanelModel {
    pub fn to_filters(&self, ctx: &PanelContext, col: &Column) -> Vec<Filter> {
        match self {
            PanelModel::Date(m) => m.to_filters(ctx),
            PanelModel::Range(m) => m.to_filters(ctx),
            PanelModel::Enum(m) => m.to_filters(ctx, col),
            PanelModel::Text(m) => m.to_filters(ctx),
        }
    }
}

impl PanelKind {
    pub fn make_model(&self) -> PanelModel {
        match self {
            PanelKind::Date => PanelModel::Date(DateModel::default()),
            PanelKind::NumberRange => PanelModel::Range(RangeModel::default()),
            PanelKind::MultiSelect => PanelModel::Enum(EnumModel::default()),
            PanelKind::Text => PanelModel::Text(TextModel::default()),
        }
    }
}

pub struct Rule {
    pub kind: PanelKind,
    pub icon: &'static str,
    test: fn(&Column) -> bool,
}

fn is_date(col: &Column) -> bool {
    col.column_type == Some(ColumnType::Date)
}

fn is_money_field(col: &Column) -> bool {
    MONEY_FIELD.is_match(&col.field)
}

fn is_number(col: &Column) -> bool {
    col.column_type == Some(ColumnType::Number)
}

fn is_enum(col: &Column) -> bool {
    col.column_type == Some(ColumnType::Enum)
}

fn always(_: &Column) -> bool {
    true
}

/// Priority-ordered; the final rule is a total fallback.
static RULES: &[Rule] = &[
    Rule {
        kind: PanelKind::Date,
        icon: "pi pi-calendar",
        test: is_date,
    },
    Rule {
        kind: PanelKind::NumberRange,
        icon: "pi pi-wallet",
        test: is_money_field,
    },
    Rule {
        kind: PanelKind::NumberRange,
        icon: "pi pi-hashtag",
        test: is_number,
    },
    Rule {
        kind: PanelKind::MultiSelect,
        icon: "pi pi-list",
        test: is_enum,
    },
    Rule {
        kind: PanelKind::Text,
        icon: "pi pi-search",
        test: always,
    },
];

pub fn resolve_for(col: &Column) -> &'static Rule {
    RULES
        .iter()
        .find(|rule| (rule.test)(col))
        .unwrap_or(&RULES[RULES.len() - 1])
}

fn ymd(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn day_start_iso(date: NaiveDate) -> String {
    format!("{}T00:00:00.000Z", ymd(date))
}

fn day_end_iso(date: NaiveDate) -> String {
    format!("{}T23:59:59.999Z", ymd(date))
}

/// Canonical money string: fixed four decimal places, matching what the
/// backend stores.
fn money(value: Decimal) -> String {
    format!("{value:.4}")
}

fn render_value(value: &FilterValue) -> String {
    match value {
        FilterValue::Int(i) => i.to_string(),
        FilterValue::Text(s) => s.clone(),
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}

/// Map rendered option value -> label for filter chip display.
fn option_labels(col: &Column) -> HashMap<String, String> {
    let value_key = match infer_option_value_key(col) {
        Some(key) => key,
        None => return HashMap::new(),
    };
    let label_key = col.option_label.as_deref().unwrap_or("label");

    col.options
        .iter()
        .filter_map(|option| {
            let value = option.get(&value_key)?;
            let rendered = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            let label = match option.get(label_key)? {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            Some((rendered, label))
        })
        .collect()
}

/// Which key of the option objects carries the filter value. Explicit
/// configuration wins, then `id`, then the label key, then the first key
/// every option holds a primitive under.
fn infer_option_value_key(col: &Column) -> Option<String> {
    let options = &col.options;
    if options.is_empty() {
        return None;
    }

    let all_have = |key: &str| options.iter().all(|o| o.get(key).is_some());

    if let Some(explicit) = &col.option_value {
        if all_have(explicit) {
            return Some(explicit.clone());
        }
    }

    if all_have("id") {
        return Some("id".to_string());
    }

    if let Some(label) = &col.option_label {
        if all_have(label) {
            return Some(label.clone());
        }
    }

    let first = options.first()?.as_object()?;
    for key in first.keys() {
        let all_primitive = options.iter().all(|o| {
            matches!(
                o.get(key),
                Some(Value::String(_) | Value::Number(_) | Value::Bool(_))
            )
        });
        if all_primitive {
            return Some(key.clone());
        }
    }

    None
}
