//! Catalog search URL → normalized [`FilterSpec`].
//!
//! Users paste the URL of a search they ran on the marketplace website. Only
//! the query string matters; scheme, host and path are ignored once the URL is
//! known to be well formed.

use {
    serde::{Deserialize, Serialize},
    url::Url,
};

pub const DEFAULT_PRICE_MIN: i64 = 0;
pub const DEFAULT_PRICE_MAX: i64 = 9999;
pub const DEFAULT_CURRENCY: &str = "EUR";

/// Rejection of a user-supplied filter URL.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid catalog URL {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid integer for {field}: {value:?}")]
    InvalidNumber { field: &'static str, value: String },
}

/// Normalized search criteria for one channel.
///
/// Field names double as the persisted JSON keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSpec {
    pub search_text: String,
    pub price_min: i64,
    pub price_max: i64,
    pub currency: String,
    pub catalog_ids: Vec<u64>,
    pub brand_ids: Vec<u64>,
    pub status_ids: Vec<u64>,
    pub color_ids: Vec<u64>,
    pub size_ids: Vec<u64>,
    /// Once set, non-privileged reconfiguration of the channel is refused.
    pub readonly: bool,
}

impl Default for FilterSpec {
    fn default() -> Self {
        Self {
            search_text: String::new(),
            price_min: DEFAULT_PRICE_MIN,
            price_max: DEFAULT_PRICE_MAX,
            currency: DEFAULT_CURRENCY.into(),
            catalog_ids: Vec::new(),
            brand_ids: Vec::new(),
            status_ids: Vec::new(),
            color_ids: Vec::new(),
            size_ids: Vec::new(),
            readonly: false,
        }
    }
}

impl FilterSpec {
    #[must_use]
    pub fn with_readonly(mut self, readonly: bool) -> Self {
        self.readonly = readonly;
        self
    }

    /// The five id-lists keyed by their upstream query parameter name.
    pub fn id_lists(&self) -> [(&'static str, &[u64]); 5] {
        [
            ("catalog_ids", self.catalog_ids.as_slice()),
            ("brand_ids", self.brand_ids.as_slice()),
            ("status_ids", self.status_ids.as_slice()),
            ("color_ids", self.color_ids.as_slice()),
            ("size_ids", self.size_ids.as_slice()),
        ]
    }
}

/// Parse a catalog search URL into a [`FilterSpec`].
///
/// Missing parameters fall back to defaults. Id-lists collect every numeric
/// value of every key starting with the list's prefix, so both
/// `brand_ids=5` and `brand_ids[]=5` are understood; non-numeric values are
/// dropped. Only an unparseable URL or a non-integer price is an error.
pub fn parse_filter_url(raw: &str) -> Result<FilterSpec, ParseError> {
    let url = Url::parse(raw.trim()).map_err(|source| ParseError::InvalidUrl {
        url: raw.to_string(),
        source,
    })?;

    // Blank values count as absent.
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(_, v)| !v.is_empty())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    let query = Query { pairs: &pairs };

    Ok(FilterSpec {
        search_text: query.first("search_text").unwrap_or_default().to_string(),
        price_min: query.integer("price_from", DEFAULT_PRICE_MIN)?,
        price_max: query.integer("price_to", DEFAULT_PRICE_MAX)?,
        currency: query
            .first("currency")
            .unwrap_or(DEFAULT_CURRENCY)
            .to_string(),
        catalog_ids: query.ids("catalog"),
        brand_ids: query.ids("brand_ids"),
        status_ids: query.ids("status_ids"),
        color_ids: query.ids("color_ids"),
        size_ids: query.ids("size_ids"),
        readonly: false,
    })
}

struct Query<'a> {
    pairs: &'a [(String, String)],
}

impl Query<'_> {
    fn first(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn integer(&self, field: &'static str, default: i64) -> Result<i64, ParseError> {
        match self.first(field) {
            None => Ok(default),
            Some(value) => value
                .trim()
                .parse()
                .map_err(|_| ParseError::InvalidNumber {
                    field,
                    value: value.to_string(),
                }),
        }
    }

    /// Values are grouped per key, keys in order of first appearance.
    fn ids(&self, prefix: &str) -> Vec<u64> {
        let mut keys: Vec<&str> = Vec::new();
        for (k, _) in self.pairs {
            if k.starts_with(prefix) && !keys.contains(&k.as_str()) {
                keys.push(k.as_str());
            }
        }
        keys.iter()
            .flat_map(|key| self.pairs.iter().filter(move |(k, _)| k.as_str() == *key))
            .filter_map(|(_, v)| parse_id(v))
            .collect()
    }
}

fn parse_id(value: &str) -> Option<u64> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest};

    const BASE: &str = "https://www.vinted.fr/catalog";

    #[test]
    fn parses_full_search() {
        let spec = parse_filter_url(&format!(
            "{BASE}?search_text=shoes&price_from=10&price_to=50&brand_ids=5&brand_ids=7&currency=USD"
        ))
        .unwrap();

        assert_eq!(spec, FilterSpec {
            search_text: "shoes".into(),
            price_min: 10,
            price_max: 50,
            currency: "USD".into(),
            brand_ids: vec![5, 7],
            ..FilterSpec::default()
        });
    }

    #[test]
    fn missing_fields_take_defaults() {
        let spec = parse_filter_url(BASE).unwrap();
        assert_eq!(spec.search_text, "");
        assert_eq!(spec.price_min, 0);
        assert_eq!(spec.price_max, 9999);
        assert_eq!(spec.currency, "EUR");
        assert!(spec.catalog_ids.is_empty());
        assert!(!spec.readonly);
    }

    #[test]
    fn collects_array_style_keys() {
        let spec = parse_filter_url(&format!(
            "{BASE}?catalog[]=1904&brand_ids[]=53&size_ids[]=206&size_ids[]=207&color_ids[]=1&status_ids[]=6"
        ))
        .unwrap();
        assert_eq!(spec.catalog_ids, vec![1904]);
        assert_eq!(spec.brand_ids, vec![53]);
        assert_eq!(spec.size_ids, vec![206, 207]);
        assert_eq!(spec.color_ids, vec![1]);
        assert_eq!(spec.status_ids, vec![6]);
    }

    #[test]
    fn percent_encoded_keys_are_decoded() {
        let spec =
            parse_filter_url(&format!("{BASE}?brand_ids%5B%5D=12&search_text=nike+air%20max"))
                .unwrap();
        assert_eq!(spec.brand_ids, vec![12]);
        assert_eq!(spec.search_text, "nike air max");
    }

    #[test]
    fn ids_grouped_by_key_in_first_seen_order() {
        let spec =
            parse_filter_url(&format!("{BASE}?brand_ids[]=5&brand_ids=7&brand_ids[]=9")).unwrap();
        assert_eq!(spec.brand_ids, vec![5, 9, 7]);
    }

    #[test]
    fn non_numeric_ids_are_skipped() {
        let spec =
            parse_filter_url(&format!("{BASE}?brand_ids=abc&brand_ids=4&color_ids=-1&size_ids=+3"))
                .unwrap();
        assert_eq!(spec.brand_ids, vec![4]);
        assert!(spec.color_ids.is_empty());
        assert!(spec.size_ids.is_empty());
    }

    #[test]
    fn blank_price_falls_back_to_default() {
        let spec = parse_filter_url(&format!("{BASE}?price_from=&price_to=")).unwrap();
        assert_eq!(spec.price_min, DEFAULT_PRICE_MIN);
        assert_eq!(spec.price_max, DEFAULT_PRICE_MAX);
    }

    #[test]
    fn first_value_wins_for_scalar_fields() {
        let spec = parse_filter_url(&format!("{BASE}?currency=GBP&currency=USD")).unwrap();
        assert_eq!(spec.currency, "GBP");
    }

    #[rstest]
    #[case("price_from=ten", "price_from")]
    #[case("price_to=12.5", "price_to")]
    #[case("price_from=5&price_to=lots", "price_to")]
    fn rejects_non_integer_prices(#[case] query: &str, #[case] expected_field: &str) {
        let err = parse_filter_url(&format!("{BASE}?{query}")).unwrap_err();
        match err {
            ParseError::InvalidNumber { field, .. } => assert_eq!(field, expected_field),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[rstest]
    #[case("")]
    #[case("shoes")]
    #[case("www.vinted.fr/catalog?search_text=x")]
    #[case("http://")]
    fn rejects_malformed_urls(#[case] raw: &str) {
        assert!(matches!(
            parse_filter_url(raw),
            Err(ParseError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn parsing_is_deterministic() {
        let raw = format!("{BASE}?search_text=bag&catalog[]=1&catalog[]=2&price_to=80");
        assert_eq!(parse_filter_url(&raw).unwrap(), parse_filter_url(&raw).unwrap());
    }

    #[test]
    fn spec_deserializes_with_defaults() {
        let spec: FilterSpec =
            serde_json::from_str(r#"{"search_text": "coat", "brand_ids": [3]}"#).unwrap();
        assert_eq!(spec.search_text, "coat");
        assert_eq!(spec.brand_ids, vec![3]);
        assert_eq!(spec.price_max, DEFAULT_PRICE_MAX);
        assert_eq!(spec.currency, DEFAULT_CURRENCY);
    }
}
