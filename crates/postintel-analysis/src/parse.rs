//! Parsers for the structured model responses.
//!
//! Responses are model-generated text, so every pattern here is tolerant:
//! optional `**` emphasis around labels, ASCII `:` or full-width `：`,
//! optional sub-field numbering. Missing sections and fields degrade to
//! empty values; parsing never fails. Only when no section heading is
//! recognizable at all does the whole response land in `summary` so the
//! operator still sees the model's text.

use std::sync::LazyLock;

use regex::Regex;

use crate::templates::TemplateKind;
use crate::types::ExtractionFields;

/// Any `【N、 ...】` section heading; used to find where a section ends.
static SECTION_HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"【[一二三四五六七八九十\d]+、[^】]*】").expect("valid regex"));

static SECTION_ONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"【一、[^】]*】").expect("valid regex"));

static SECTION_TWO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"【二、[^】]*】").expect("valid regex"));

/// Labeled sub-fields of the strategy-analysis section.
static STRATEGY_FIELD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^\s*(?:\d+\s*[\.、])?\s*\*{0,2}(内容定位|视觉策略|文案策略|目标受众|成功归因)[^:：\n]*[:：]\*{0,2}[ \t]*",
    )
    .expect("valid regex")
});

/// Labeled sub-fields of the adapted-script section. The colon is optional
/// because the image-prompt heading sometimes runs straight into a newline.
static SCRIPT_FIELD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^\s*(?:\d+\s*[\.、])?\s*\*{0,2}(策略适配洞察|帖子文案|图片生成提示词)[^:：\n]*[:：]?\*{0,2}[ \t]*",
    )
    .expect("valid regex")
});

/// Per-image ordinal markers: "第一张图片提示词:", "第3张图片提示词：",
/// or the ASCII form "Image 2 Prompt:".
static PROMPT_MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\*{0,2}(?:第[一二三四五六七八九十\d]+张图片提示词|[Ii]mage\s*#?\d+\s*[Pp]rompts?)\s*[:：]?\*{0,2}\s*",
    )
    .expect("valid regex")
});

/// Redundant label prefix the model often repeats inside a prompt body.
static PROMPT_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\*\s]*(?:图片)?提示词\s*[:：]\s*").expect("valid regex"));

static SUCCESS_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\*{0,2}\s*(?:成功归因|Success factors)\s*\*{0,2}\s*[:：]\s*\*{0,2}\s*([^\n]*)")
        .expect("valid regex")
});

static SUCCESS_REMOVAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[^\n]*(?:成功归因|Success factors)\s*\*{0,2}\s*[:：][^\n]*\n?")
        .expect("valid regex")
});

/// Parses a model response with the parser matching its template.
#[must_use]
pub fn parse(template: TemplateKind, text: &str) -> ExtractionFields {
    match template {
        TemplateKind::StrategyScript => parse_strategy_script(text),
        TemplateKind::AnalysisOnly => parse_analysis_only(text),
    }
}

/// Parses a strategy-script response (image / gallery template).
///
/// Section one's first four sub-fields are joined into `summary` as
/// `label: value` paragraphs; the fifth becomes `success_factors`. Section
/// two yields the strategy note, the post copy, and the image prompts
/// (ordinal markers split into `prompt_sequence`, otherwise a single
/// `prompt`).
#[must_use]
pub fn parse_strategy_script(text: &str) -> ExtractionFields {
    let text = text.trim();
    let mut fields = ExtractionFields::default();

    let section_one = section_after(text, &SECTION_ONE_RE);
    let section_two = section_after(text, &SECTION_TWO_RE);
    if section_one.is_none() && section_two.is_none() {
        fields.summary = clean(text);
        return fields;
    }

    if let Some(section) = section_one {
        let mut summary_parts = Vec::new();
        for (label, span) in labeled_spans(section, &STRATEGY_FIELD_RE) {
            let value = clean(span);
            if label == "成功归因" {
                fields.success_factors = value;
            } else if !value.is_empty() {
                summary_parts.push(format!("{label}: {value}"));
            }
        }
        fields.summary = summary_parts.join("\n\n");
    }

    if let Some(section) = section_two {
        for (label, span) in labeled_spans(section, &SCRIPT_FIELD_RE) {
            match label.as_str() {
                "策略适配洞察" => fields.strategy_note = clean(span),
                "帖子文案" => fields.copy_text = clean(span),
                "图片生成提示词" => apply_prompts(&mut fields, span),
                _ => {}
            }
        }
    }

    fields
}

/// Parses an analysis-only response (video template).
///
/// `success_factors` is pulled from the tag-analysis section;
/// `summary` is the full response minus that line.
#[must_use]
pub fn parse_analysis_only(text: &str) -> ExtractionFields {
    let text = text.trim();
    let mut fields = ExtractionFields::default();

    if let Some(section) = section_after(text, &SECTION_TWO_RE) {
        if let Some(value) = SUCCESS_LINE_RE
            .captures(section)
            .and_then(|caps| caps.get(1))
        {
            fields.success_factors = clean(value.as_str());
        }
    }

    fields.summary = clean(&SUCCESS_REMOVAL_RE.replacen(text, 1, ""));
    fields
}

/// Slice of `text` between the end of the first `heading` match and the
/// next section heading (or the end of the text).
fn section_after<'a>(text: &'a str, heading: &Regex) -> Option<&'a str> {
    let found = heading.find(text)?;
    let rest = &text[found.end()..];
    match SECTION_HEADING_RE.find(rest) {
        Some(next) => Some(&rest[..next.start()]),
        None => Some(rest),
    }
}

/// All labeled sub-fields of a section, each with the raw text span running
/// to the start of the next label (or the end of the section).
fn labeled_spans<'a>(section: &'a str, re: &Regex) -> Vec<(String, &'a str)> {
    let marks: Vec<(String, usize, usize)> = re
        .captures_iter(section)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let label = caps.get(1)?;
            Some((label.as_str().to_owned(), whole.start(), whole.end()))
        })
        .collect();

    marks
        .iter()
        .enumerate()
        .map(|(i, (label, _, value_start))| {
            let value_end = marks.get(i + 1).map_or(section.len(), |next| next.1);
            (label.clone(), &section[*value_start..value_end])
        })
        .collect()
}

/// Fills exactly one of `prompt` / `prompt_sequence` from the image-prompt
/// span. Ordinal markers partition the span into an ordered sequence; with
/// no marker the whole span is one consolidated prompt.
fn apply_prompts(fields: &mut ExtractionFields, span: &str) {
    let markers: Vec<regex::Match<'_>> = PROMPT_MARKER_RE.find_iter(span).collect();

    if markers.is_empty() {
        let single = clean(&PROMPT_PREFIX_RE.replace(span.trim(), ""));
        fields.prompt = (!single.is_empty()).then_some(single);
        fields.prompt_sequence = None;
        return;
    }

    let mut sequence = Vec::new();
    for (i, marker) in markers.iter().enumerate() {
        let end = markers.get(i + 1).map_or(span.len(), regex::Match::start);
        let part = &span[marker.end()..end];
        let part = clean(&PROMPT_PREFIX_RE.replace(part.trim_start(), ""));
        if !part.is_empty() {
            sequence.push(part);
        }
    }
    fields.prompt = None;
    fields.prompt_sequence = (!sequence.is_empty()).then_some(sequence);
}

/// Trims whitespace and edge emphasis markers from a recovered value.
fn clean(text: &str) -> String {
    text.trim().trim_matches('*').trim().to_owned()
}

#[cfg(test)]
#[path = "parse_test.rs"]
mod tests;
