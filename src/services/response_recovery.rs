use std::error::Error;
use std::fmt;

use log::{debug, error, warn};
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use crate::models::travel_plan::PointOfInterest;

const FALLBACK_OVERVIEW: &str = "未能提取旅游计划概述";
const FALLBACK_POI_NAME: &str = "景点";
const FALLBACK_POI_ADDRESS: &str = "地址未提供";
const FALLBACK_POI_DESCRIPTION: &str = "没有描述";
const FALLBACK_POI_DURATION: &str = "1小时";

/// Every recovery strategy was exhausted. Carries the raw completion text so
/// the caller can log it for diagnosis.
#[derive(Debug)]
pub struct UnparsableResponse {
    raw: String,
}

impl UnparsableResponse {
    fn new(raw: &str) -> Self {
        Self {
            raw: raw.to_string(),
        }
    }

    pub fn raw_content(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for UnparsableResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unable to parse the model response into a travel plan")
    }
}

impl Error for UnparsableResponse {}

/// Plan in the wire format the model is instructed to produce. Days are
/// labelled with a 1-based index; mapping indices onto absolute dates for
/// date-range requests happens in the travel service.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct RecoveredPlan {
    pub overview: String,
    pub daily_plans: Vec<RecoveredDay>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct RecoveredDay {
    pub day: u32,
    pub description: String,
    pub poi_list: Vec<PointOfInterest>,
}

/// Recover a structured plan from raw completion text.
///
/// Strategies are tried strictly in order, each one more permissive than the
/// last: whole-text JSON, fenced code block, outermost brace span, brace span
/// after syntax repair, and finally field-by-field regex extraction. The
/// first strategy that yields a JSON object wins. A parse failure inside one
/// strategy only advances the cascade; exhaustion is the single failure the
/// caller sees.
pub fn recover_plan(content: &str) -> Result<RecoveredPlan, UnparsableResponse> {
    debug!("raw completion content: {}", content);

    let parsed = parse_direct(content)
        .or_else(|| {
            debug!("direct JSON parse failed, looking for a fenced code block");
            parse_fenced_block(content)
        })
        .or_else(|| {
            debug!("no parseable code block, trying the outermost brace span");
            parse_brace_span(content)
        })
        .or_else(|| {
            debug!("brace span did not parse, retrying after syntax repair");
            parse_repaired(content)
        });

    if let Some(value) = parsed {
        // The model produced JSON; if the object is missing required fields
        // that is a malformed plan, not something field extraction can save.
        return serde_json::from_value(value).map_err(|err| {
            error!("model returned JSON with an unusable shape: {}", err);
            UnparsableResponse::new(content)
        });
    }

    debug!("every JSON strategy failed, falling back to field-level extraction");
    if let Some(plan) = extract_by_fields(content) {
        warn!("recovered travel plan via field-level extraction; it may be incomplete");
        return Ok(plan);
    }

    error!("unable to recover a travel plan; raw content: {}", content);
    Err(UnparsableResponse::new(content))
}

/// Strategy 1: the whole text is the JSON object.
fn parse_direct(content: &str) -> Option<Value> {
    serde_json::from_str::<Value>(content)
        .ok()
        .filter(Value::is_object)
}

/// Strategy 2: the object is wrapped in a Markdown code fence, optionally
/// tagged `json`, despite instructions not to.
fn parse_fenced_block(content: &str) -> Option<Value> {
    let fence = Regex::new(r"```(?:json)?\s*([\s\S]*?)\s*```").unwrap();
    let caps = fence.captures(content)?;
    serde_json::from_str::<Value>(caps[1].trim())
        .ok()
        .filter(Value::is_object)
}

/// Strategy 3: prose surrounds an otherwise valid object; take everything
/// from the first `{` to the last `}` inclusive.
fn parse_brace_span(content: &str) -> Option<Value> {
    serde_json::from_str::<Value>(brace_span(content)?)
        .ok()
        .filter(Value::is_object)
}

/// Strategy 4: the brace span has recoverable syntax errors; repair and
/// re-parse.
fn parse_repaired(content: &str) -> Option<Value> {
    let fixed = repair_json(brace_span(content)?);
    serde_json::from_str::<Value>(&fixed)
        .ok()
        .filter(Value::is_object)
}

fn brace_span(content: &str) -> Option<&str> {
    let start = content.find('{')?;
    let end = content.rfind('}')?;
    if end <= start {
        return None;
    }
    Some(&content[start..=end])
}

/// Fixed sequence of textual repairs for the syntax errors models actually
/// produce. Each substitution is applied once, in order, non-recursively.
fn repair_json(snippet: &str) -> String {
    // Unescaped single quotes were meant as string delimiters.
    let mut fixed = replace_unescaped_single_quotes(snippet);

    // Escape sequences left over from the quote conversion.
    fixed = fixed.replace("\\\"", "\"");
    fixed = fixed.replace("\\'", "'");

    // Doubled commas.
    fixed = Regex::new(r",\s*,")
        .unwrap()
        .replace_all(&fixed, ",")
        .into_owned();

    // Trailing commas before a closing brace or bracket.
    fixed = Regex::new(r",\s*\}")
        .unwrap()
        .replace_all(&fixed, "}")
        .into_owned();
    fixed = Regex::new(r",\s*\]")
        .unwrap()
        .replace_all(&fixed, "]")
        .into_owned();

    // Missing commas between adjacent values.
    fixed = Regex::new(r#""\s*\{"#)
        .unwrap()
        .replace_all(&fixed, "\",{")
        .into_owned();
    fixed = Regex::new(r#"\}\s*""#)
        .unwrap()
        .replace_all(&fixed, "},\"")
        .into_owned();

    // Semicolons written where commas belong.
    fixed.replace(';', ",")
}

fn replace_unescaped_single_quotes(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut prev = '\0';
    for c in input.chars() {
        if c == '\'' && prev != '\\' {
            out.push('"');
        } else {
            out.push(c);
        }
        prev = c;
    }
    out
}

/// Strategy 5: no JSON parsing at all. Scan the raw text with anchored
/// per-field patterns, substituting documented fallbacks for fields that do
/// not match. Fails only when no `day` key is found anywhere.
fn extract_by_fields(content: &str) -> Option<RecoveredPlan> {
    let overview =
        capture_string(content, "overview").unwrap_or_else(|| FALLBACK_OVERVIEW.to_string());

    let day_key = Regex::new(r#""day"\s*:\s*(\d+)"#).unwrap();
    let poi_object = Regex::new(r"(?s)\{(.*?)\}").unwrap();

    let mut daily_plans = Vec::new();
    for caps in day_key.captures_iter(content) {
        let day: u32 = match caps[1].parse() {
            Ok(n) => n,
            Err(_) => continue,
        };

        let day_description = Regex::new(&format!(
            r#""day"\s*:\s*{}[^{{]*"description"\s*:\s*"([^"\\]*(?:\\.[^"\\]*)*)""#,
            day
        ))
        .unwrap();
        let description = day_description
            .captures(content)
            .map(|c| c[1].to_string())
            .unwrap_or_else(|| format!("第{}天行程", day));

        let poi_span = Regex::new(&format!(
            r#"(?s)"day"\s*:\s*{}[^{{]*"poi_list"\s*:\s*\[(.*?)\]"#,
            day
        ))
        .unwrap();

        let mut poi_list = Vec::new();
        for span in poi_span.captures_iter(content) {
            for obj in poi_object.captures_iter(&span[1]) {
                poi_list.push(extract_poi(&obj[1]));
            }
        }

        daily_plans.push(RecoveredDay {
            day,
            description,
            poi_list,
        });
    }

    if daily_plans.is_empty() {
        return None;
    }

    Some(RecoveredPlan {
        overview,
        daily_plans,
    })
}

fn extract_poi(src: &str) -> PointOfInterest {
    PointOfInterest {
        name: capture_string(src, "name").unwrap_or_else(|| FALLBACK_POI_NAME.to_string()),
        address: capture_string(src, "address")
            .unwrap_or_else(|| FALLBACK_POI_ADDRESS.to_string()),
        latitude: capture_number(src, "latitude").unwrap_or(0.0),
        longitude: capture_number(src, "longitude").unwrap_or(0.0),
        description: capture_string(src, "description")
            .unwrap_or_else(|| FALLBACK_POI_DESCRIPTION.to_string()),
        recommended_duration: Some(
            capture_string(src, "recommended_duration")
                .unwrap_or_else(|| FALLBACK_POI_DURATION.to_string()),
        ),
    }
}

fn capture_string(src: &str, key: &str) -> Option<String> {
    let re = Regex::new(&format!(
        r#""{}"\s*:\s*"([^"\\]*(?:\\.[^"\\]*)*)""#,
        key
    ))
    .unwrap();
    re.captures(src).map(|c| c[1].to_string())
}

fn capture_number(src: &str, key: &str) -> Option<f64> {
    let re = Regex::new(&format!(
        r#""{}"\s*:\s*(-?[0-9]+(?:\.[0-9]+)?)"#,
        key
    ))
    .unwrap();
    re.captures(src).and_then(|c| c[1].parse().ok())
}
