//! Queryable projection of the content store.
//!
//! A [`Query`] is a list of exact-match filters (combined with AND) and a
//! list of sort keys applied in order. Sorting is stable, so documents that
//! tie on every key keep their content store order. Documents missing a sort
//! field go last whichever direction the key sorts in.

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use super::document::ContentDocument;
use super::slug::{Slug, SlugError, ensure_unique};

/// A front matter field the index can filter or sort on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Area,
    Section,
    Title,
    Date,
    Author,
    Description,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Order {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    pub field: Field,
    #[serde(default)]
    pub order: Order,
}

impl SortKey {
    pub fn asc(field: Field) -> Self {
        Self {
            field,
            order: Order::Asc,
        }
    }

    pub fn desc(field: Field) -> Self {
        Self {
            field,
            order: Order::Desc,
        }
    }
}

/// Exact-match predicate on one field. Dates compare as `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub field: Field,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub sort: Vec<SortKey>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, field: Field, value: impl Into<String>) -> Self {
        self.filters.push(Filter {
            field,
            value: value.into(),
        });
        self
    }

    pub fn sort(mut self, key: SortKey) -> Self {
        self.sort.push(key);
        self
    }
}

enum FieldValue<'a> {
    Text(&'a str),
    Date(&'a DateTime<FixedOffset>),
}

impl FieldValue<'_> {
    fn matches(&self, expected: &str) -> bool {
        match self {
            FieldValue::Text(text) => *text == expected,
            FieldValue::Date(date) => date.format("%Y-%m-%d").to_string() == expected,
        }
    }

    fn compare(&self, other: &FieldValue<'_>) -> Ordering {
        match (self, other) {
            (FieldValue::Text(a), FieldValue::Text(b)) => a.cmp(b),
            (FieldValue::Date(a), FieldValue::Date(b)) => a.cmp(b),
            // A field always yields the same variant
            _ => Ordering::Equal,
        }
    }
}

fn field_value(doc: &ContentDocument, field: Field) -> Option<FieldValue<'_>> {
    let fm = &doc.front_matter;
    match field {
        Field::Area => fm.area.as_deref().map(FieldValue::Text),
        Field::Section => fm.section.as_deref().map(FieldValue::Text),
        Field::Title => fm.title.as_deref().map(FieldValue::Text),
        Field::Date => fm.date.as_ref().map(FieldValue::Date),
        Field::Author => fm.author.as_deref().map(FieldValue::Text),
        Field::Description => fm.description.as_deref().map(FieldValue::Text),
    }
}

fn compare_by(a: &ContentDocument, b: &ContentDocument, keys: &[SortKey]) -> Ordering {
    for key in keys {
        let ordering = match (field_value(a, key.field), field_value(b, key.field)) {
            (Some(x), Some(y)) => match key.order {
                Order::Asc => x.compare(&y),
                Order::Desc => y.compare(&x),
            },
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

/// The content index, built once per build from the loaded documents.
#[derive(Debug)]
pub struct ContentIndex {
    documents: Vec<ContentDocument>,
    by_slug: HashMap<Slug, usize>,
}

impl ContentIndex {
    /// Build the index. Fails if two documents derive the same slug.
    pub fn new(documents: Vec<ContentDocument>) -> Result<Self, SlugError> {
        ensure_unique(&documents)?;
        let by_slug = documents
            .iter()
            .enumerate()
            .map(|(i, doc)| (doc.slug.clone(), i))
            .collect();
        Ok(Self { documents, by_slug })
    }

    /// Run a query. No matches is an empty list.
    pub fn query(&self, query: &Query) -> Vec<&ContentDocument> {
        let mut results: Vec<&ContentDocument> = self
            .documents
            .iter()
            .filter(|doc| {
                query.filters.iter().all(|filter| {
                    field_value(doc, filter.field).is_some_and(|v| v.matches(&filter.value))
                })
            })
            .collect();

        if !query.sort.is_empty() {
            results.sort_by(|a, b| compare_by(a, b, &query.sort));
        }

        results
    }

    pub fn get(&self, slug: &Slug) -> Option<&ContentDocument> {
        self.by_slug.get(slug).map(|&i| &self.documents[i])
    }

    /// All documents in content store order.
    pub fn documents(&self) -> &[ContentDocument] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
