// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Extraction of metric readings embedded in a line of monitoring output.
//!
//! A reading is a self-closing `<metric ... />` element carrying quoted `name`, `value` and
//! `type` attributes in any order. Everything outside of such elements is ignored.

use crate::errors::ParseError;
use lazy_static::lazy_static;
use regex::Regex;

const TAG_PREFIX: &str = "<metric";
const TAG_SUFFIX: &str = "/>";

lazy_static! {
    static ref METRIC_TAG_REGEX: Regex = build_regex(r"<metric\s.*?/>");
    static ref ATTRIBUTE_REGEX: Regex =
        build_regex(r#"\s+([A-Za-z_:][A-Za-z0-9_:.\-]*)\s*=\s*(?:"([^"<]*)"|'([^'<]*)')"#);
}

#[allow(clippy::expect_used)]
fn build_regex(pattern: &str) -> Regex {
    Regex::new(pattern).expect("failed creating regex")
}

/// One parsed metric reading. Attributes missing from the tag are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metric {
    pub name: String,
    pub value: String,
    pub metric_type: String,
}

impl Metric {
    pub fn new(name: &str, value: &str, metric_type: &str) -> Self {
        Metric {
            name: name.to_string(),
            value: value.to_string(),
            metric_type: metric_type.to_string(),
        }
    }
}

/// Returns every non-overlapping `<metric ... />` substring of `line`, left to right.
pub fn find_tags(line: &str) -> impl Iterator<Item = &str> {
    METRIC_TAG_REGEX.find_iter(line).map(|m| m.as_str())
}

/// Finds and decodes every metric tag in `line`. Malformed tags yield an error in place
/// without affecting the others.
pub fn extract(line: &str) -> impl Iterator<Item = Result<Metric, ParseError>> + '_ {
    find_tags(line).map(parse)
}

/// Decodes a single `<metric ... />` tag.
pub fn parse(tag: &str) -> Result<Metric, ParseError> {
    let body = tag
        .strip_prefix(TAG_PREFIX)
        .and_then(|rest| rest.strip_suffix(TAG_SUFFIX))
        .filter(|body| body.starts_with(char::is_whitespace))
        .ok_or_else(|| ParseError::NotATag(tag.to_string()))?;

    let mut metric = Metric::default();
    let mut seen: Vec<&str> = Vec::with_capacity(3);
    let mut position = 0;

    for captures in ATTRIBUTE_REGEX.captures_iter(body) {
        let (Some(whole), Some(key)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        // attributes must follow each other with nothing but whitespace in between
        if whole.start() != position {
            return Err(ParseError::UnexpectedContent(TAG_PREFIX.len() + position));
        }
        position = whole.end();

        let key = key.as_str();
        if seen.contains(&key) {
            return Err(ParseError::DuplicateAttribute(key.to_string()));
        }
        seen.push(key);

        let raw = captures
            .get(2)
            .or_else(|| captures.get(3))
            .map_or("", |m| m.as_str());
        let value = unescape(raw)?;
        match key {
            "name" => metric.name = value,
            "value" => metric.value = value,
            "type" => metric.metric_type = value,
            _ => {}
        }
    }

    if !body[position..].trim().is_empty() {
        return Err(ParseError::UnexpectedContent(TAG_PREFIX.len() + position));
    }
    if seen.is_empty() {
        return Err(ParseError::NoAttributes);
    }

    Ok(metric)
}

fn unescape(raw: &str) -> Result<String, ParseError> {
    if !raw.contains('&') {
        return Ok(raw.to_string());
    }

    let mut decoded = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(start) = rest.find('&') {
        decoded.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let end = after
            .find(';')
            .ok_or_else(|| ParseError::InvalidEntity(after.to_string()))?;
        let entity = &after[..end];
        decoded.push(
            decode_entity(entity).ok_or_else(|| ParseError::InvalidEntity(entity.to_string()))?,
        );
        rest = &after[end + 1..];
    }
    decoded.push_str(rest);
    Ok(decoded)
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let code = match entity.strip_prefix("#x") {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => entity.strip_prefix('#')?.parse::<u32>().ok()?,
            };
            char::from_u32(code)
        }
    }
}
