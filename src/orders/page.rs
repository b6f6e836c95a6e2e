//! Order list pages
//!
//! The list endpoint answers either with a bare array or with a paginated
//! envelope. Both are read through [`ListEnvelope`] and settled into a [`Page`].

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use jiff::civil::Date;
use serde::Deserialize;
use thiserror::Error;

use crate::orders::status::{OrderStatus, StatusVocabulary};

/// Default number of rows per page.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// One page of results.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// Rows on this page
    pub items: Vec<T>,

    /// Zero-based page number
    pub number: u32,

    /// Requested page size
    pub size: u32,

    /// Number of pages
    pub total_pages: u32,

    /// Number of rows across all pages
    pub total_elements: u64,
}

impl<T> Page<T> {
    /// Convert every row, keeping the ones that convert and returning the
    /// errors for the rest. Totals stay as the backend reported them.
    pub fn map_rows<U, E>(self, f: impl FnMut(T) -> Result<U, E>) -> (Page<U>, Vec<E>) {
        let (converted, rejected): (Vec<_>, Vec<_>) =
            self.items.into_iter().map(f).partition(Result::is_ok);

        let page = Page {
            items: converted.into_iter().filter_map(Result::ok).collect(),
            number: self.number,
            size: self.size,
            total_pages: self.total_pages,
            total_elements: self.total_elements,
        };

        (page, rejected.into_iter().filter_map(Result::err).collect())
    }
}

/// Either list shape the backend returns.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ListEnvelope<T> {
    /// A bare array of rows.
    Bare(Vec<T>),

    /// A paginated envelope.
    #[serde(rename_all = "camelCase")]
    Paged {
        /// Rows
        #[serde(default = "Vec::new")]
        content: Vec<T>,

        /// Page count
        #[serde(default)]
        total_pages: Option<u32>,

        /// Row count
        #[serde(default)]
        total_elements: Option<u64>,

        /// Page number
        #[serde(default)]
        number: Option<u32>,

        /// Page size
        #[serde(default)]
        size: Option<u32>,
    },
}

impl<T> ListEnvelope<T> {
    /// The rows alone, whichever shape they came in.
    pub fn into_items(self) -> Vec<T> {
        match self {
            Self::Bare(items) | Self::Paged { content: items, .. } => items,
        }
    }

    /// Settle into a [`Page`], filling gaps from the query that was sent.
    pub fn into_page(self, query: &OrderQuery) -> Page<T> {
        match self {
            Self::Bare(items) => Page {
                number: 0,
                size: u32::try_from(items.len()).unwrap_or(u32::MAX),
                total_pages: 1,
                total_elements: items.len() as u64,
                items,
            },
            Self::Paged {
                content,
                total_pages,
                total_elements,
                number,
                size,
            } => Page {
                number: number.unwrap_or(query.page),
                size: size.unwrap_or(query.size),
                total_pages: total_pages.unwrap_or(1),
                total_elements: total_elements.unwrap_or(content.len() as u64),
                items: content,
            },
        }
    }
}

/// A sort string that is not `key` or `key,asc|desc`.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid sort {0:?}, expected key,asc or key,desc")]
pub struct InvalidSort(pub String);

/// Sort key and direction, written `key,dir` on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOrder {
    /// Field to sort by
    pub key: String,

    /// Descending when `true`
    pub descending: bool,
}

impl Display for SortOrder {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "{},{}",
            self.key,
            if self.descending { "desc" } else { "asc" }
        )
    }
}

impl FromStr for SortOrder {
    type Err = InvalidSort;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (key, direction) = s.split_once(',').unwrap_or((s, "asc"));
        let key = key.trim();

        if key.is_empty() {
            return Err(InvalidSort(s.to_string()));
        }

        let descending = match direction.trim().to_ascii_lowercase().as_str() {
            "asc" => false,
            "desc" => true,
            _ => return Err(InvalidSort(s.to_string())),
        };

        Ok(Self {
            key: key.to_string(),
            descending,
        })
    }
}

/// Filters and paging for the order list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderQuery {
    /// Zero-based page number
    pub page: u32,

    /// Rows per page
    pub size: u32,

    /// Free-text search
    pub search: Option<String>,

    /// Status filter
    pub status: Option<OrderStatus>,

    /// Placement date filter
    pub date: Option<Date>,

    /// Sort order
    pub sort: Option<SortOrder>,
}

impl Default for OrderQuery {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
            search: None,
            status: None,
            date: None,
            sort: None,
        }
    }
}

impl OrderQuery {
    /// Query string pairs. Empty filters are left out.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("page", self.page.to_string()), ("size", self.size.to_string())];

        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            pairs.push(("search", search.to_string()));
        }

        if let Some(status) = self.status {
            pairs.push(("status", status.wire(StatusVocabulary::DisplayLabel).to_string()));
        }

        if let Some(date) = self.date {
            pairs.push(("date", date.to_string()));
        }

        if let Some(sort) = &self.sort {
            pairs.push(("sort", sort.to_string()));
        }

        pairs
    }
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn bare_array_is_one_page() -> TestResult {
        let envelope: ListEnvelope<u32> = serde_json::from_str("[1, 2, 3]")?;
        let page = envelope.into_page(&OrderQuery::default());

        assert_eq!(page.items, vec![1, 2, 3]);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.total_elements, 3);

        Ok(())
    }

    #[test]
    fn paged_envelope_keeps_totals() -> TestResult {
        let envelope: ListEnvelope<u32> =
            serde_json::from_str(r#"{"content": [7], "totalPages": 4, "totalElements": 31}"#)?;
        let query = OrderQuery {
            page: 2,
            ..OrderQuery::default()
        };
        let page = envelope.into_page(&query);

        assert_eq!(page.items, vec![7]);
        assert_eq!(page.number, 2);
        assert_eq!(page.size, DEFAULT_PAGE_SIZE);
        assert_eq!(page.total_pages, 4);
        assert_eq!(page.total_elements, 31);

        Ok(())
    }

    #[test]
    fn map_rows_keeps_the_rows_that_convert() {
        let page = Page {
            items: vec!["1", "x", "3"],
            number: 0,
            size: 10,
            total_pages: 1,
            total_elements: 3,
        };

        let (page, rejected) = page.map_rows(|raw| raw.parse::<u32>().map_err(|_error| raw));

        assert_eq!(page.items, vec![1, 3]);
        assert_eq!(page.total_elements, 3);
        assert_eq!(rejected, vec!["x"]);
    }

    #[test]
    fn rows_come_out_of_either_shape() -> TestResult {
        let bare: ListEnvelope<u32> = serde_json::from_str("[4, 5]")?;
        let paged: ListEnvelope<u32> =
            serde_json::from_str(r#"{"content": [4, 5], "number": 3, "size": 2}"#)?;

        assert_eq!(bare.into_items(), vec![4, 5]);
        assert_eq!(paged.into_items(), vec![4, 5]);

        Ok(())
    }

    #[test]
    fn envelope_without_content_is_empty() -> TestResult {
        let envelope: ListEnvelope<u32> = serde_json::from_str(r#"{"totalPages": 0}"#)?;

        assert!(envelope.into_page(&OrderQuery::default()).items.is_empty());

        Ok(())
    }

    #[test]
    fn query_pairs_skip_empty_filters() -> TestResult {
        let query = OrderQuery {
            page: 1,
            size: 20,
            search: Some("  ".into()),
            status: Some(OrderStatus::Shipping),
            date: Some(date(2025, 3, 9)),
            sort: Some("ngayDatHang,desc".parse()?),
        };

        assert_eq!(
            query.to_query_pairs(),
            vec![
                ("page", "1".to_string()),
                ("size", "20".to_string()),
                ("status", "Đang giao".to_string()),
                ("date", "2025-03-09".to_string()),
                ("sort", "ngayDatHang,desc".to_string()),
            ]
        );

        Ok(())
    }

    #[test]
    fn sort_parsing() -> TestResult {
        assert_eq!(
            "id".parse::<SortOrder>()?,
            SortOrder {
                key: "id".into(),
                descending: false
            }
        );
        assert!("id,sideways".parse::<SortOrder>().is_err());
        assert!(",desc".parse::<SortOrder>().is_err());

        Ok(())
    }
}
