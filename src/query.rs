//! Search query description.
//!
//! A [`Query`] carries every option the search request encodes. Only the
//! query text is required; everything else defaults to the values searchd
//! clients traditionally send.
//!
//! Queries can be built in code:
//!
//! ```
//! use sphinx_client::query::{Query, SearchMode};
//!
//! let query = Query::new("hello world")
//!     .mode(SearchMode::Extended)
//!     .limit(50)
//!     .index("articles");
//! assert_eq!(query.max_matches, 1000);
//! ```
//!
//! or deserialized from a loose JSON description, where unknown keys are
//! ignored:
//!
//! ```
//! use sphinx_client::query::Query;
//!
//! let query: Query = serde_json::from_str(
//!     r#"{"query": "hello", "maxmatches": 50, "indices": "main", "color": "red"}"#,
//! ).unwrap();
//! assert_eq!(query.max_matches, 50);
//! assert_eq!(query.index, "main");
//! ```

use serde::{Deserialize, Serialize};

/// Matching mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SearchMode {
    #[default]
    All,
    Any,
    Phrase,
    Boolean,
    Extended,
    Fullscan,
    Extended2,
}

impl SearchMode {
    /// Wire value.
    pub fn code(self) -> u32 {
        match self {
            SearchMode::All => 0,
            SearchMode::Any => 1,
            SearchMode::Phrase => 2,
            SearchMode::Boolean => 3,
            SearchMode::Extended => 4,
            SearchMode::Fullscan => 5,
            SearchMode::Extended2 => 6,
        }
    }
}

/// Ranking function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RankingMode {
    /// Phrase proximity major factor, BM25 minor one.
    #[serde(rename = "PROXIMITY_BM25")]
    ProximityBm25,
    /// Statistical BM25 only.
    #[default]
    #[serde(rename = "BM25")]
    Bm25,
    /// Every match gets a weight of 1.
    None,
    /// Weighted sum of per-field keyword occurrence counts.
    Wordcount,
    Proximity,
    Matchany,
    Fieldmask,
}

impl RankingMode {
    /// Wire value.
    pub fn code(self) -> u32 {
        match self {
            RankingMode::ProximityBm25 => 0,
            RankingMode::Bm25 => 1,
            RankingMode::None => 2,
            RankingMode::Wordcount => 3,
            RankingMode::Proximity => 4,
            RankingMode::Matchany => 5,
            RankingMode::Fieldmask => 6,
        }
    }
}

/// Result ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortMode {
    #[default]
    Relevance,
    AttrDesc,
    AttrAsc,
    TimeSegments,
    Extended,
    Expr,
}

impl SortMode {
    /// Wire value.
    pub fn code(self) -> u32 {
        match self {
            SortMode::Relevance => 0,
            SortMode::AttrDesc => 1,
            SortMode::AttrAsc => 2,
            SortMode::TimeSegments => 3,
            SortMode::Extended => 4,
            SortMode::Expr => 5,
        }
    }
}

/// Grouping function applied to the group-by attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GroupMode {
    #[default]
    Day,
    Week,
    Month,
    Year,
    Attr,
    Attrpair,
}

impl GroupMode {
    /// Wire value.
    pub fn code(self) -> u32 {
        match self {
            GroupMode::Day => 0,
            GroupMode::Week => 1,
            GroupMode::Month => 2,
            GroupMode::Year => 3,
            GroupMode::Attr => 4,
            GroupMode::Attrpair => 5,
        }
    }
}

/// Default result window size.
pub const DEFAULT_LIMIT: u32 = 20;

/// Default cap on matches kept in server memory.
pub const DEFAULT_MAX_MATCHES: u32 = 1000;

/// Default group sort clause.
pub const DEFAULT_GROUP_SORT: &str = "@group desc";

/// Description of a single search request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Query {
    /// Full-text query.
    pub query: String,
    /// Offset into the result set.
    pub offset: u32,
    /// Number of matches to return.
    pub limit: u32,
    /// Matching mode.
    pub mode: SearchMode,
    /// Ranking mode.
    #[serde(alias = "ranker")]
    pub ranking: RankingMode,
    /// Sort mode.
    pub sort: SortMode,
    /// Sort clause for the attribute/extended/expression sort modes.
    #[serde(alias = "sortby")]
    pub sort_by: String,
    /// Index pattern to search.
    #[serde(alias = "indices")]
    pub index: String,
    /// Per-field weights, in field order.
    pub weights: Vec<i32>,
    /// Grouping function.
    #[serde(alias = "groupmode")]
    pub group_mode: GroupMode,
    /// Group-by attribute (empty disables grouping).
    #[serde(alias = "groupby")]
    pub group_by: String,
    /// Group ordering clause.
    #[serde(alias = "groupsort")]
    pub group_sort: String,
    /// Attribute counted distinct per group.
    #[serde(alias = "groupdistinct")]
    pub group_distinct: String,
    /// Matches kept in server memory.
    #[serde(alias = "maxmatches")]
    pub max_matches: u32,
    /// Select list.
    #[serde(alias = "selectlist")]
    pub select: String,
    /// Comment logged by searchd with the query.
    pub comment: String,
}

impl Default for Query {
    fn default() -> Self {
        Self {
            query: String::new(),
            offset: 0,
            limit: DEFAULT_LIMIT,
            mode: SearchMode::default(),
            ranking: RankingMode::default(),
            sort: SortMode::default(),
            sort_by: String::new(),
            index: "*".to_string(),
            weights: Vec::new(),
            group_mode: GroupMode::default(),
            group_by: String::new(),
            group_sort: DEFAULT_GROUP_SORT.to_string(),
            group_distinct: String::new(),
            max_matches: DEFAULT_MAX_MATCHES,
            select: "*".to_string(),
            comment: String::new(),
        }
    }
}

impl Query {
    /// Create a query for `text` with every other option at its default.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            query: text.into(),
            ..Self::default()
        }
    }

    /// Set the result window.
    pub fn window(mut self, offset: u32, limit: u32) -> Self {
        self.offset = offset;
        self.limit = limit;
        self
    }

    /// Set the number of matches to return.
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    /// Set the matching mode.
    pub fn mode(mut self, mode: SearchMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the ranking mode.
    pub fn ranking(mut self, ranking: RankingMode) -> Self {
        self.ranking = ranking;
        self
    }

    /// Set the sort mode and clause.
    pub fn sort(mut self, sort: SortMode, sort_by: impl Into<String>) -> Self {
        self.sort = sort;
        self.sort_by = sort_by.into();
        self
    }

    /// Set the index pattern.
    pub fn index(mut self, index: impl Into<String>) -> Self {
        self.index = index.into();
        self
    }

    /// Set per-field weights.
    pub fn weights(mut self, weights: impl Into<Vec<i32>>) -> Self {
        self.weights = weights.into();
        self
    }

    /// Group matches by `attribute` using `mode`.
    pub fn group_by(mut self, attribute: impl Into<String>, mode: GroupMode) -> Self {
        self.group_by = attribute.into();
        self.group_mode = mode;
        self
    }

    /// Set the group ordering clause.
    pub fn group_sort(mut self, clause: impl Into<String>) -> Self {
        self.group_sort = clause.into();
        self
    }

    /// Set the attribute counted distinct per group.
    pub fn group_distinct(mut self, attribute: impl Into<String>) -> Self {
        self.group_distinct = attribute.into();
        self
    }

    /// Set the server-side match cap.
    pub fn max_matches(mut self, max_matches: u32) -> Self {
        self.max_matches = max_matches;
        self
    }

    /// Set the select list.
    pub fn select(mut self, select: impl Into<String>) -> Self {
        self.select = select.into();
        self
    }

    /// Attach a comment to the query.
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }
}

impl From<&str> for Query {
    fn from(text: &str) -> Self {
        Query::new(text)
    }
}

impl From<String> for Query {
    fn from(text: String) -> Self {
        Query::new(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let q = Query::new("hello");
        assert_eq!(q.offset, 0);
        assert_eq!(q.limit, 20);
        assert_eq!(q.mode, SearchMode::All);
        assert_eq!(q.ranking, RankingMode::Bm25);
        assert_eq!(q.sort, SortMode::Relevance);
        assert_eq!(q.index, "*");
        assert_eq!(q.group_mode, GroupMode::Day);
        assert_eq!(q.group_sort, "@group desc");
        assert_eq!(q.max_matches, 1000);
        assert_eq!(q.select, "*");
        assert!(q.weights.is_empty());
        assert!(q.comment.is_empty());
    }

    #[test]
    fn test_from_str() {
        let q: Query = "plain text".into();
        assert_eq!(q.query, "plain text");
        assert_eq!(q.limit, DEFAULT_LIMIT);
    }

    #[test]
    fn test_builder_overrides() {
        let q = Query::new("x")
            .window(10, 5)
            .mode(SearchMode::Extended2)
            .ranking(RankingMode::Wordcount)
            .sort(SortMode::AttrDesc, "price")
            .weights(vec![3, 1])
            .group_by("category", GroupMode::Attr)
            .group_sort("@count desc")
            .group_distinct("author")
            .max_matches(50)
            .select("id, price")
            .comment("from tests");

        assert_eq!((q.offset, q.limit), (10, 5));
        assert_eq!(q.mode.code(), 6);
        assert_eq!(q.ranking.code(), 3);
        assert_eq!(q.sort.code(), 1);
        assert_eq!(q.sort_by, "price");
        assert_eq!(q.weights, vec![3, 1]);
        assert_eq!(q.group_mode.code(), 4);
        assert_eq!(q.group_by, "category");
        assert_eq!(q.group_sort, "@count desc");
        assert_eq!(q.group_distinct, "author");
        assert_eq!(q.max_matches, 50);
        assert_eq!(q.select, "id, price");
        assert_eq!(q.comment, "from tests");
    }

    #[test]
    fn test_json_defaults_and_aliases() {
        let q: Query = serde_json::from_str(
            r#"{
                "query": "hello world",
                "maxmatches": 50,
                "groupby": "site",
                "groupmode": "ATTR",
                "selectlist": "id",
                "ranker": "PROXIMITY_BM25",
                "unknown": [1, 2, 3]
            }"#,
        )
        .unwrap();

        assert_eq!(q.query, "hello world");
        assert_eq!(q.max_matches, 50);
        assert_eq!(q.group_by, "site");
        assert_eq!(q.group_mode, GroupMode::Attr);
        assert_eq!(q.select, "id");
        assert_eq!(q.ranking, RankingMode::ProximityBm25);
        assert_eq!(q.limit, 20);
        assert_eq!(q.group_sort, "@group desc");
    }

    #[test]
    fn test_mode_codes() {
        assert_eq!(SearchMode::All.code(), 0);
        assert_eq!(SearchMode::Fullscan.code(), 5);
        assert_eq!(RankingMode::Fieldmask.code(), 6);
        assert_eq!(SortMode::Expr.code(), 5);
        assert_eq!(GroupMode::Attrpair.code(), 5);
    }
}
