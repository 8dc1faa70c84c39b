//! Loaders for the static JSON datasets behind the chart pages.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::primitives::parse_numeric_str;
use crate::core::{Dataset, LinkSpec};
use crate::error::{ChartError, ChartResult};

fn parse_json(input: &str, what: &str) -> ChartResult<serde_json::Value> {
    serde_json::from_str(input)
        .map_err(|e| ChartError::InvalidData(format!("failed to parse {what} fixture: {e}")))
}

/// Monthly revenues: `[{ "month": "Jan", "profit": "10" }, ...]`.
///
/// Profits may be numbers or numeric strings; records without a usable profit
/// or month are dropped.
pub fn revenues_from_json(input: &str) -> ChartResult<Dataset> {
    let mut dataset = Dataset::from_json_value(&parse_json(input, "revenues")?)?;
    for record in dataset.records_mut() {
        record.coerce_number("profit");
        record.coerce_category("month");
    }
    dataset.retain_complete(&["profit"]);
    let dataset = dataset
        .filtered(|record| record.text("month").is_some())
        .with_key_field("month");
    debug!(records = dataset.len(), "loaded revenues fixture");
    Ok(dataset)
}

/// Countries for one year of the bubble animation.
#[derive(Debug, Clone, PartialEq)]
pub struct YearFrame {
    pub year: i32,
    pub countries: Dataset,
}

#[derive(Debug, Deserialize)]
struct RawYearFrame {
    year: serde_json::Value,
    countries: serde_json::Value,
}

/// Per-year countries: `[{ "year": "1800", "countries": [{ "country", "continent",
/// "income", "life_exp", "population" }] }]`.
pub fn countries_from_json(input: &str) -> ChartResult<Vec<YearFrame>> {
    let raw: Vec<RawYearFrame> = serde_json::from_str(input)
        .map_err(|e| ChartError::InvalidData(format!("failed to parse countries fixture: {e}")))?;

    let frames = raw
        .into_iter()
        .map(|frame| {
            let year = match &frame.year {
                serde_json::Value::Number(number) => number.as_f64(),
                serde_json::Value::String(text) => parse_numeric_str(text, "year").ok(),
                _ => None,
            }
            .ok_or_else(|| ChartError::MissingField {
                field: "year".to_owned(),
            })?;

            let mut countries = Dataset::from_json_value(&frame.countries)?;
            for record in countries.records_mut() {
                for field in ["income", "life_exp", "population"] {
                    record.coerce_number(field);
                }
                record.coerce_category("continent");
            }
            Ok(YearFrame {
                year: year.round() as i32,
                countries: countries.with_key_field("country"),
            })
        })
        .collect::<ChartResult<Vec<_>>>()?;
    debug!(frames = frames.len(), "loaded countries fixture");
    Ok(frames)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    #[serde(default)]
    pub group: serde_json::Value,
}

impl GraphNode {
    /// Group as text, so numeric and string groups share one color domain.
    #[must_use]
    pub fn group_label(&self) -> String {
        match &self.group {
            serde_json::Value::String(text) => text.clone(),
            other => other.to_string(),
        }
    }
}

/// Node-link graph: `{ "nodes": [{ "id", "group" }], "links": [{ "source", "target", "value" }] }`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GraphFixture {
    pub nodes: Vec<GraphNode>,
    pub links: Vec<LinkSpec>,
}

pub fn graph_from_json(input: &str) -> ChartResult<GraphFixture> {
    let graph: GraphFixture = serde_json::from_str(input)
        .map_err(|e| ChartError::InvalidData(format!("failed to parse graph fixture: {e}")))?;
    debug!(nodes = graph.nodes.len(), links = graph.links.len(), "loaded graph fixture");
    Ok(graph)
}

/// Raw per-coin records keyed by coin name, in file order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CoinFixture {
    pub coins: IndexMap<String, Dataset>,
}

/// Coins: `{ "bitcoin": [{ "date": "28/4/2013", "price_usd": "135.3", ... }], ... }`.
/// Values are kept as loaded; the coin chart cleans them when selected.
pub fn coins_from_json(input: &str) -> ChartResult<CoinFixture> {
    let value = parse_json(input, "coins")?;
    let object = value
        .as_object()
        .ok_or_else(|| ChartError::InvalidData("coins fixture must be a JSON object".to_owned()))?;
    let coins = object
        .iter()
        .map(|(name, records)| Ok((name.clone(), Dataset::from_json_value(records)?)))
        .collect::<ChartResult<IndexMap<_, _>>>()?;
    debug!(coins = coins.len(), "loaded coins fixture");
    Ok(CoinFixture { coins })
}

#[cfg(test)]
mod tests {
    use super::{coins_from_json, countries_from_json, graph_from_json, revenues_from_json};

    #[test]
    fn revenues_parse_numeric_strings() {
        let dataset = revenues_from_json(
            r#"[{"month":"Jan","profit":"10"},{"month":"Feb","profit":30},{"month":"Mar","profit":""}]"#,
        )
        .expect("revenues");
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.records()[0].number("profit"), Some(10.0));
    }

    #[test]
    fn countries_accept_string_years() {
        let frames = countries_from_json(
            r#"[{"year":"1800","countries":[{"country":"A","continent":"asia","income":"500","life_exp":30,"population":1000}]}]"#,
        )
        .expect("countries");
        assert_eq!(frames[0].year, 1800);
        assert_eq!(frames[0].countries.records()[0].number("income"), Some(500.0));
    }

    #[test]
    fn graph_and_coins_load() {
        let graph = graph_from_json(
            r#"{"nodes":[{"id":"a","group":1},{"id":"b","group":"x"}],"links":[{"source":"a","target":"b","value":4}]}"#,
        )
        .expect("graph");
        assert_eq!(graph.nodes[0].group_label(), "1");
        assert_eq!(graph.nodes[1].group_label(), "x");
        assert_eq!(graph.links[0].value, 4.0);

        let coins = coins_from_json(
            r#"{"bitcoin":[{"date":"28/4/2013","price_usd":"135.3"}],"ripple":[]}"#,
        )
        .expect("coins");
        assert_eq!(coins.coins.keys().collect::<Vec<_>>(), vec!["bitcoin", "ripple"]);
        assert!(coins_from_json("[]").is_err());
    }
}
