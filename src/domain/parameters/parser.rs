//! Parsing of emulator introspection output into parameter descriptors.

use regex::Regex;
use tracing::debug;

use crate::domain::config::ParserProfile;
use crate::domain::{AppError, ParameterDescriptor, ParseWarning, ProbeReport};

/// Header patterns that look configured but never match real introspection output.
const PLACEHOLDER_PATTERNS: [&str; 2] = ["NULL", "NONE"];

/// Compiled parser for one candidate kind's output format.
#[derive(Debug, Clone)]
pub struct ParameterParser {
    header: Regex,
    prefix_separator: String,
    info_delimiter: String,
    type_strip: Vec<char>,
    notes_strip: Vec<char>,
}

impl ParameterParser {
    /// Build a parser from a profile, rejecting unset or placeholder header patterns.
    pub fn new(profile: &ParserProfile) -> Result<Self, AppError> {
        let pattern = profile.header_pattern.as_deref().map(str::trim).unwrap_or_default();
        if pattern.is_empty() {
            return Err(AppError::config_error("header_pattern must be set"));
        }
        if PLACEHOLDER_PATTERNS.iter().any(|placeholder| pattern.eq_ignore_ascii_case(placeholder)) {
            return Err(AppError::config_error(format!(
                "header_pattern '{}' is a placeholder and matches no introspection header",
                pattern
            )));
        }
        let header = Regex::new(pattern).map_err(|e| {
            AppError::config_error(format!("header_pattern '{}' is not a valid regex: {}", pattern, e))
        })?;

        if profile.info_delimiter.is_empty() {
            return Err(AppError::config_error("info_delimiter must not be empty"));
        }

        Ok(Self {
            header,
            prefix_separator: profile.prefix_separator.clone(),
            info_delimiter: profile.info_delimiter.clone(),
            type_strip: profile.type_strip.chars().collect(),
            notes_strip: profile.notes_strip.chars().collect(),
        })
    }

    /// Parse raw probe output for `token` into sorted descriptors plus skipped-line warnings.
    pub fn parse(&self, token: &str, output: &str) -> ProbeReport {
        let prefix = format!("{}{}", token, self.prefix_separator);
        let mut descriptors = Vec::new();
        let mut warnings = Vec::new();

        for (index, raw) in output.lines().enumerate() {
            let line = raw.trim_end_matches('\r');
            if line.trim().is_empty() || self.is_header(line) {
                continue;
            }

            let Some((label, info)) = line.split_once('=') else {
                warnings.push(warning(index, line, "missing '=' separator"));
                continue;
            };

            let name = match label.split_once(prefix.as_str()) {
                Some((_, stripped)) if !token.is_empty() => stripped.trim(),
                _ => label.trim(),
            };
            if name.is_empty() {
                warnings.push(warning(index, line, "empty parameter name"));
                continue;
            }

            let (kind, notes) = info.split_once(self.info_delimiter.as_str()).unwrap_or((info, ""));
            descriptors.push(ParameterDescriptor {
                name: name.to_string(),
                kind: strip(kind, &self.type_strip),
                notes: strip(notes, &self.notes_strip),
            });
        }

        descriptors.sort();
        debug!(token, parsed = descriptors.len(), skipped = warnings.len(), "parsed probe output");

        ProbeReport { token: token.to_string(), descriptors, warnings }
    }

    fn is_header(&self, line: &str) -> bool {
        self.header.find(line).is_some_and(|m| m.start() == 0)
    }
}

fn strip(value: &str, chars: &[char]) -> String {
    value.trim().trim_matches(|c| chars.contains(&c)).trim().to_string()
}

fn warning(index: usize, line: &str, reason: &'static str) -> ParseWarning {
    ParseWarning { line_number: index + 1, line: line.to_string(), reason }
}
