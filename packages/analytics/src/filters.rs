//! WHERE-clause builder shared by both statistics strategies.

use accident_risk_database_models::BoundingBox;
use duckdb::types::Value;

/// Normalises a state filter: trimmed, uppercased, and `None` when empty.
#[must_use]
pub fn normalize_state(state: Option<&str>) -> Option<String> {
    state
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_uppercase)
}

/// Treats blank text filters as absent.
#[must_use]
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}

/// Accumulates `AND`-joined predicates and their positional parameters.
#[derive(Debug, Default, Clone)]
pub struct Filters {
    frags: Vec<String>,
    params: Vec<Value>,
}

impl Filters {
    /// Creates an empty filter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `column = ?` with an uppercased state code, when present.
    #[must_use]
    pub fn state(mut self, column: &str, state: Option<&str>) -> Self {
        if let Some(state) = normalize_state(state) {
            self.frags.push(format!("{column} = ?"));
            self.params.push(Value::Text(state));
        }
        self
    }

    /// Adds a case-insensitive substring match, when present.
    #[must_use]
    pub fn contains(mut self, column: &str, needle: Option<&str>) -> Self {
        if let Some(needle) = non_blank(needle) {
            self.frags.push(format!("{column} ILIKE '%' || ? || '%'"));
            self.params.push(Value::Text(needle.to_string()));
        }
        self
    }

    /// Adds `column = ?` for a text value.
    #[must_use]
    pub fn text_eq(mut self, column: &str, value: &str) -> Self {
        self.frags.push(format!("{column} = ?"));
        self.params.push(Value::Text(value.to_string()));
        self
    }

    /// Adds `column = ?` for an integer value, when present.
    #[must_use]
    pub fn int_eq(mut self, column: &str, value: Option<i64>) -> Self {
        if let Some(value) = value {
            self.frags.push(format!("{column} = ?"));
            self.params.push(Value::BigInt(value));
        }
        self
    }

    /// Adds `column >= ?`.
    #[must_use]
    pub fn at_least(mut self, column: &str, value: i64) -> Self {
        self.frags.push(format!("{column} >= ?"));
        self.params.push(Value::BigInt(value));
        self
    }

    /// Adds an inclusive integer range on `column`.
    #[must_use]
    pub fn int_between(mut self, column: &str, low: i64, high: i64) -> Self {
        self.frags.push(format!("{column} BETWEEN ? AND ?"));
        self.params.push(Value::BigInt(low));
        self.params.push(Value::BigInt(high));
        self
    }

    /// Adds an inclusive bounding-box predicate on a lat/lng column pair.
    #[must_use]
    pub fn within(mut self, bbox: &BoundingBox, lat_column: &str, lng_column: &str) -> Self {
        self.frags.push(format!(
            "{lat_column} BETWEEN ? AND ? AND {lng_column} BETWEEN ? AND ?"
        ));
        self.params.extend([
            Value::Double(bbox.south),
            Value::Double(bbox.north),
            Value::Double(bbox.west),
            Value::Double(bbox.east),
        ]);
        self
    }

    /// Adds a predicate with no parameters.
    #[must_use]
    pub fn raw(mut self, predicate: &str) -> Self {
        self.frags.push(predicate.to_string());
        self
    }

    /// Renders ` WHERE a AND b`, or an empty string with no predicates.
    #[must_use]
    pub fn where_clause(&self) -> String {
        if self.frags.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.frags.join(" AND "))
        }
    }

    /// Appends a trailing parameter (e.g. a `LIMIT`) after the filters.
    #[must_use]
    pub fn with_param(mut self, value: Value) -> Self {
        self.params.push(value);
        self
    }

    /// Parameters in placeholder order.
    #[must_use]
    pub fn params(&self) -> &[Value] {
        &self.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_is_uppercased_and_blank_dropped() {
        assert_eq!(normalize_state(Some(" tx ")), Some("TX".to_string()));
        assert_eq!(normalize_state(Some("")), None);
        assert_eq!(normalize_state(None), None);
    }

    #[test]
    fn empty_filters_render_nothing() {
        let filters = Filters::new().state("state", None).contains("city", Some("  "));
        assert_eq!(filters.where_clause(), "");
        assert!(filters.params().is_empty());
    }

    #[test]
    fn predicates_join_in_order() {
        let filters = Filters::new()
            .int_eq("hour_of_day", Some(8))
            .int_eq("day_of_week", None)
            .state("state", Some("ca"));
        assert_eq!(
            filters.where_clause(),
            " WHERE hour_of_day = ? AND state = ?"
        );
        assert_eq!(
            filters.params(),
            &[Value::BigInt(8), Value::Text("CA".to_string())]
        );
    }

    #[test]
    fn bounding_box_binds_south_north_west_east() {
        let bbox = BoundingBox::new(-98.0, 29.0, -97.0, 30.0);
        let filters = Filters::new().within(&bbox, "start_lat", "start_lng");
        assert_eq!(
            filters.params(),
            &[
                Value::Double(29.0),
                Value::Double(30.0),
                Value::Double(-98.0),
                Value::Double(-97.0)
            ]
        );
    }
}
