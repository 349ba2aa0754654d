//! Data models for the stock pipeline.
//!
//! The upstream payloads are loosely shaped, so they are kept as raw
//! [`serde_json::Value`]s and read through accessors that fall back to
//! defaults instead of failing.

use serde_json::{Map, Value};
use std::fmt;

/// One of the five stock sections offered by the shop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Gears,
    Seeds,
    Eggs,
    EventShop,
    Cosmetics,
}

impl Category {
    /// All categories in report order.
    pub const ALL: [Category; 5] = [
        Category::Gears,
        Category::Seeds,
        Category::Eggs,
        Category::EventShop,
        Category::Cosmetics,
    ];

    /// Key used in the aggregated JSON object.
    pub fn key(&self) -> &'static str {
        match self {
            Category::Gears => "gears",
            Category::Seeds => "seeds",
            Category::Eggs => "eggs",
            Category::EventShop => "eventShop",
            Category::Cosmetics => "cosmetics",
        }
    }

    /// Value of the `type` query parameter the upstream expects.
    pub fn query_tag(&self) -> &'static str {
        match self {
            Category::Gears => "gears",
            Category::Seeds => "seeds",
            Category::Eggs => "eggs",
            Category::EventShop => "event-shop-stock",
            Category::Cosmetics => "cosmetics",
        }
    }

    /// Section title shown in the report.
    pub fn title(&self) -> &'static str {
        match self {
            Category::Gears => "Gears",
            Category::Seeds => "Seeds",
            Category::Eggs => "Eggs",
            Category::EventShop => "Event Shop",
            Category::Cosmetics => "Cosmetics",
        }
    }

    /// Returns an emoji representation of the category.
    pub fn emoji(&self) -> &'static str {
        match self {
            Category::Gears => "🔧",
            Category::Seeds => "🌱",
            Category::Eggs => "🥚",
            Category::EventShop => "🐝",
            Category::Cosmetics => "🎨",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title())
    }
}

/// A single shop entry, with defaults already applied.
#[derive(Debug, Clone, PartialEq)]
pub struct StockRecord {
    pub name: String,
    pub amount: String,
}

impl StockRecord {
    pub const UNKNOWN_NAME: &'static str = "Unknown";
    pub const ZERO_AMOUNT: &'static str = "0";

    /// Read a record from `{ Data: { Name }, Amount }`.
    ///
    /// Falsy or missing values (absent, null, `""`, `0`, `false`) take the
    /// defaults; anything else is rendered as text.
    pub fn from_value(value: &Value) -> Self {
        let name = value
            .get("Data")
            .and_then(|data| data.get("Name"))
            .and_then(display_truthy)
            .unwrap_or_else(|| Self::UNKNOWN_NAME.to_string());

        let amount = value
            .get("Amount")
            .and_then(display_truthy)
            .unwrap_or_else(|| Self::ZERO_AMOUNT.to_string());

        Self { name, amount }
    }
}

/// Render `value` the way the shop's own frontend interpolates it, or `None`
/// if it is falsy.
///
/// Objects and arrays are truthy and render as `[object Object]` and a
/// comma-joined list. Integers that do not fit an `f64` exactly are printed
/// exactly rather than rounded.
fn display_truthy(value: &Value) -> Option<String> {
    let truthy = match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::Array(_) | Value::Object(_) => true,
    };
    truthy.then(|| display(value))
}

fn display(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::String(s) => s.clone(),
        Value::Number(n) => match (n.as_i64(), n.as_u64(), n.as_f64()) {
            (Some(i), _, _) => i.to_string(),
            (_, Some(u), _) => u.to_string(),
            (_, _, Some(f)) => display_f64(f),
            _ => n.to_string(),
        },
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => display(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

fn display_f64(f: f64) -> String {
    let magnitude = f.abs();
    if magnitude >= 1e21 || (magnitude != 0.0 && magnitude < 1e-6) {
        let formatted = format!("{:e}", f);
        match formatted.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{}e+{}", mantissa, exponent)
            }
            _ => formatted,
        }
    } else if f.fract() == 0.0 {
        format!("{:.0}", f)
    } else {
        f.to_string()
    }
}

/// Records of one category, or `None` when `data.records` is missing or not an array.
pub fn category_records(response: &Value) -> Option<Vec<StockRecord>> {
    response
        .get("data")
        .and_then(|data| data.get("records"))
        .and_then(Value::as_array)
        .map(|records| records.iter().map(StockRecord::from_value).collect())
}

/// Raw responses of all categories for one invocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregatedStock {
    entries: Vec<(Category, Value)>,
}

impl AggregatedStock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the response of `category`, replacing any earlier one.
    pub fn insert(&mut self, category: Category, response: Value) {
        if let Some(entry) = self.entries.iter_mut().find(|(c, _)| *c == category) {
            entry.1 = response;
        } else {
            self.entries.push((category, response));
            self.entries.sort_by_key(|(c, _)| *c);
        }
    }

    pub fn get(&self, category: Category) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, v)| v)
    }

    /// Categories present, in report order.
    pub fn categories(&self) -> Vec<Category> {
        self.entries.iter().map(|(c, _)| *c).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keyed JSON object, e.g. `{"gears": ..., "eventShop": ...}`.
    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .entries
            .iter()
            .map(|(c, v)| (c.key().to_string(), v.clone()))
            .collect();
        Value::Object(map)
    }
}

impl FromIterator<(Category, Value)> for AggregatedStock {
    fn from_iter<I: IntoIterator<Item = (Category, Value)>>(iter: I) -> Self {
        let mut stock = AggregatedStock::new();
        for (category, response) in iter {
            stock.insert(category, response);
        }
        stock
    }
}
