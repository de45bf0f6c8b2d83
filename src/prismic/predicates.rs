//! Query predicates and orderings

use chrono::{DateTime, Utc};
use std::fmt;

/// A single query predicate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// `at(path, "value")`
    At { path: String, value: String },
    /// `date.before(path, millis)`, strict
    DateBefore { path: String, millis: i64 },
    /// `date.after(path, millis)`, strict
    DateAfter { path: String, millis: i64 },
}

impl Predicate {
    pub fn at(path: &str, value: &str) -> Self {
        Predicate::At {
            path: path.to_string(),
            value: value.to_string(),
        }
    }

    pub fn date_before(path: &str, date: DateTime<Utc>) -> Self {
        Predicate::DateBefore {
            path: path.to_string(),
            millis: date.timestamp_millis(),
        }
    }

    pub fn date_after(path: &str, date: DateTime<Utc>) -> Self {
        Predicate::DateAfter {
            path: path.to_string(),
            millis: date.timestamp_millis(),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::At { path, value } => {
                let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
                write!(f, "[at({}, \"{}\")]", path, escaped)
            }
            Predicate::DateBefore { path, millis } => {
                write!(f, "[date.before({}, {})]", path, millis)
            }
            Predicate::DateAfter { path, millis } => {
                write!(f, "[date.after({}, {})]", path, millis)
            }
        }
    }
}

/// Build the `q` parameter from a set of predicates
pub fn query_string(predicates: &[Predicate]) -> String {
    let inner: String = predicates.iter().map(|p| p.to_string()).collect();
    format!("[{}]", inner)
}

/// Sort key of a search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ordering {
    pub field: String,
    pub descending: bool,
}

impl Ordering {
    pub fn asc(field: &str) -> Self {
        Self {
            field: field.to_string(),
            descending: false,
        }
    }

    pub fn desc(field: &str) -> Self {
        Self {
            field: field.to_string(),
            descending: true,
        }
    }
}

/// Build the `orderings` parameter
pub fn orderings_string(orderings: &[Ordering]) -> String {
    let fields: Vec<String> = orderings
        .iter()
        .map(|o| {
            if o.descending {
                format!("{} desc", o.field)
            } else {
                o.field.clone()
            }
        })
        .collect();
    format!("[{}]", fields.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_query_string() {
        let date = Utc.with_ymd_and_hms(2021, 2, 1, 0, 0, 0).unwrap();
        let q = query_string(&[
            Predicate::at("document.type", "post"),
            Predicate::date_before("document.first_publication_date", date),
        ]);
        assert_eq!(
            q,
            "[[at(document.type, \"post\")][date.before(document.first_publication_date, 1612137600000)]]"
        );
    }

    #[test]
    fn test_at_escapes_quotes() {
        let p = Predicate::at("my.post.uid", "say \"hi\"");
        assert_eq!(p.to_string(), r#"[at(my.post.uid, "say \"hi\"")]"#);
    }

    #[test]
    fn test_orderings_string() {
        assert_eq!(
            orderings_string(&[Ordering::desc("document.first_publication_date")]),
            "[document.first_publication_date desc]"
        );
        assert_eq!(
            orderings_string(&[
                Ordering::asc("document.first_publication_date"),
                Ordering::desc("my.post.title"),
            ]),
            "[document.first_publication_date,my.post.title desc]"
        );
    }
}
