//! Collection queries: equality filters, a single ordering, a limit.

use crate::document::Document;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub field: String,
    pub equals: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub collection: String,
    #[serde(default)]
    pub filters: Vec<Filter>,
    #[serde(default)]
    pub order_by: Option<(String, Direction)>,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl Query {
    pub fn collection(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            filters: Vec::new(),
            order_by: None,
            limit: None,
        }
    }

    pub fn where_eq(mut self, field: impl Into<String>, equals: impl Into<Value>) -> Self {
        self.filters.push(Filter {
            field: field.into(),
            equals: equals.into(),
        });
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order_by = Some((field.into(), direction));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, doc: &Document) -> bool {
        doc.path.collection() == self.collection
            && self
                .filters
                .iter()
                .all(|f| doc.data.get(&f.field) == Some(&f.equals))
    }

    /// Filter, order and truncate documents of one collection
    pub fn apply(&self, docs: impl IntoIterator<Item = Document>) -> Vec<Document> {
        let mut selected: Vec<Document> = docs.into_iter().filter(|d| self.matches(d)).collect();

        if let Some((field, direction)) = &self.order_by {
            selected.sort_by(|a, b| {
                let ord = compare_values(a.data.get(field), b.data.get(field));
                let ord = match direction {
                    Direction::Asc => ord,
                    Direction::Desc => ord.reverse(),
                };
                ord.then_with(|| a.id().cmp(b.id()))
            });
        }

        if let Some(limit) = self.limit {
            selected.truncate(limit);
        }

        selected
    }
}

fn type_rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Bool(_)) => 1,
        Some(Value::Number(_)) => 2,
        Some(Value::String(_)) => 3,
        Some(Value::Array(_)) => 4,
        Some(Value::Object(_)) => 5,
    }
}

/// Total order over JSON values: missing/null, booleans, numbers, strings, then
/// structured values by their serialized form.
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(x @ Value::Array(_)), Some(y @ Value::Array(_)))
        | (Some(x @ Value::Object(_)), Some(y @ Value::Object(_))) => x.to_string().cmp(&y.to_string()),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pharmasite_common::DocPath;
    use serde_json::json;

    fn doc(id: &str, data: Value) -> Document {
        Document::new(
            DocPath::new("blogs", id).unwrap(),
            data.as_object().cloned().unwrap(),
        )
    }

    #[test]
    fn test_order_desc_with_limit() {
        let docs = vec![
            doc("a", json!({ "date": "2024-01-01T00:00:00Z" })),
            doc("b", json!({ "date": "2024-03-01T00:00:00Z" })),
            doc("c", json!({ "date": "2024-02-01T00:00:00Z" })),
        ];

        let result = Query::collection("blogs")
            .order_by("date", Direction::Desc)
            .limit(2)
            .apply(docs);

        let ids: Vec<_> = result.iter().map(|d| d.id()).collect();
        assert_eq!(ids, vec!["b", "c"]);
    }

    #[test]
    fn test_filter_and_missing_fields_sort_first() {
        let docs = vec![
            doc("a", json!({ "category": "Tablets", "name": "Zinc" })),
            doc("b", json!({ "category": "Coatings", "name": "HPMC" })),
            doc("c", json!({ "category": "Tablets" })),
        ];

        let result = Query::collection("blogs")
            .where_eq("category", "Tablets")
            .order_by("name", Direction::Asc)
            .apply(docs);

        let ids: Vec<_> = result.iter().map(|d| d.id()).collect();
        assert_eq!(ids, vec!["c", "a"]);
    }
}
