//! Formatting options. Hosts hand the engine either a string-keyed map
//! (unrecognized keys ignored, recognized values validated) or a YAML
//! document deserialized straight into `FormatOptions`.

use crate::error::ConfigError;
use std::{collections::HashMap, io::Read};

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitStyle {
    NoWrap,
    WhenNeeded,
    CompactFirstBreak,
    OnePerLine,
}

impl SplitStyle {
    const ALLOWED: &'static [&'static str] =
        &["no_wrap", "when_needed", "compact_first_break", "one_per_line"];

    fn parse(key: &str, value: &str) -> Result<Self, ConfigError> {
        match value {
            "no_wrap" => Ok(Self::NoWrap),
            "when_needed" => Ok(Self::WhenNeeded),
            "compact_first_break" => Ok(Self::CompactFirstBreak),
            "one_per_line" => Ok(Self::OnePerLine),
            _ => Err(unknown(key, value, Self::ALLOWED)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BracePosition {
    SameLine,
    NextLine,
    NextLineShifted,
}

impl BracePosition {
    const ALLOWED: &'static [&'static str] = &["same_line", "next_line", "next_line_shifted"];

    fn parse(key: &str, value: &str) -> Result<Self, ConfigError> {
        match value {
            "same_line" => Ok(Self::SameLine),
            "next_line" => Ok(Self::NextLine),
            "next_line_shifted" => Ok(Self::NextLineShifted),
            _ => Err(unknown(key, value, Self::ALLOWED)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParenPosition {
    EndOfLine,
    SeparateLine,
}

impl ParenPosition {
    const ALLOWED: &'static [&'static str] = &["end_of_line", "separate_line"];

    fn parse(key: &str, value: &str) -> Result<Self, ConfigError> {
        match value {
            "end_of_line" => Ok(Self::EndOfLine),
            "separate_line" => Ok(Self::SeparateLine),
            _ => Err(unknown(key, value, Self::ALLOWED)),
        }
    }
}

#[derive(Debug, Clone, serde::Deserialize)]
#[serde(default)]
pub struct FormatOptions {
    pub max_line_width: usize,
    pub indent_size: usize,
    /// Continuation indentation in indent units.
    pub continuation_indent: usize,
    pub brace_position_for_block: BracePosition,
    pub brace_position_for_type_declaration: BracePosition,
    pub brace_position_for_lambda_body: BracePosition,
    pub parenthesis_position_in_invocations: ParenPosition,
    pub wrap_arguments_in_invocations: SplitStyle,
    pub wrap_parameters_in_declarations: SplitStyle,
    pub wrap_arithmetic_operators: SplitStyle,
    pub wrap_logical_operators: SplitStyle,
    pub wrap_chained_invocations: SplitStyle,
    pub wrap_superinterfaces: SplitStyle,
    pub wrap_before_arithmetic_operator: bool,
    pub wrap_before_logical_operator: bool,
    pub align_assignments_in_declaration_groups: bool,
    pub join_wrapped_lines: bool,
    pub keep_simple_blocks_on_one_line: bool,
    pub number_of_empty_lines_to_preserve: usize,
    pub insert_new_line_at_end_of_file_if_missing: bool,
    pub format_line_comments: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            max_line_width: 100,
            indent_size: 4,
            continuation_indent: 2,
            brace_position_for_block: BracePosition::SameLine,
            brace_position_for_type_declaration: BracePosition::SameLine,
            brace_position_for_lambda_body: BracePosition::SameLine,
            parenthesis_position_in_invocations: ParenPosition::EndOfLine,
            wrap_arguments_in_invocations: SplitStyle::CompactFirstBreak,
            wrap_parameters_in_declarations: SplitStyle::WhenNeeded,
            wrap_arithmetic_operators: SplitStyle::WhenNeeded,
            wrap_logical_operators: SplitStyle::WhenNeeded,
            wrap_chained_invocations: SplitStyle::CompactFirstBreak,
            wrap_superinterfaces: SplitStyle::WhenNeeded,
            wrap_before_arithmetic_operator: false,
            wrap_before_logical_operator: true,
            align_assignments_in_declaration_groups: false,
            join_wrapped_lines: true,
            keep_simple_blocks_on_one_line: false,
            number_of_empty_lines_to_preserve: 1,
            insert_new_line_at_end_of_file_if_missing: true,
            format_line_comments: true,
        }
    }
}

impl FormatOptions {
    /// Builds options from a string-keyed map. Unrecognized keys are
    /// ignored; recognized keys are validated against their enumerated
    /// value sets.
    pub fn from_map(map: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let mut o = Self::default();
        for (key, value) in map {
            match key.as_str() {
                "max_line_width" => o.max_line_width = number(key, value)?,
                "indentation.size" => o.indent_size = number(key, value)?,
                "continuation_indentation" => o.continuation_indent = number(key, value)?,
                "brace_position_for_block" => {
                    o.brace_position_for_block = BracePosition::parse(key, value)?
                }
                "brace_position_for_type_declaration" => {
                    o.brace_position_for_type_declaration = BracePosition::parse(key, value)?
                }
                "brace_position_for_lambda_body" => {
                    o.brace_position_for_lambda_body = BracePosition::parse(key, value)?
                }
                "parenthesis_position_in_invocations" => {
                    o.parenthesis_position_in_invocations = ParenPosition::parse(key, value)?
                }
                "wrap_arguments_in_invocations" => {
                    o.wrap_arguments_in_invocations = SplitStyle::parse(key, value)?
                }
                "wrap_parameters_in_declarations" => {
                    o.wrap_parameters_in_declarations = SplitStyle::parse(key, value)?
                }
                "wrap_arithmetic_operators" => {
                    o.wrap_arithmetic_operators = SplitStyle::parse(key, value)?
                }
                "wrap_logical_operators" => {
                    o.wrap_logical_operators = SplitStyle::parse(key, value)?
                }
                "wrap_chained_invocations" => {
                    o.wrap_chained_invocations = SplitStyle::parse(key, value)?
                }
                "wrap_superinterfaces" => {
                    o.wrap_superinterfaces = SplitStyle::parse(key, value)?
                }
                "wrap_before_arithmetic_operator" => {
                    o.wrap_before_arithmetic_operator = boolean(key, value)?
                }
                "wrap_before_logical_operator" => {
                    o.wrap_before_logical_operator = boolean(key, value)?
                }
                "align_assignments_in_declaration_groups" => {
                    o.align_assignments_in_declaration_groups = boolean(key, value)?
                }
                "join_wrapped_lines" => o.join_wrapped_lines = boolean(key, value)?,
                "keep_simple_blocks_on_one_line" => {
                    o.keep_simple_blocks_on_one_line = boolean(key, value)?
                }
                "number_of_empty_lines_to_preserve" => {
                    o.number_of_empty_lines_to_preserve = number(key, value)?
                }
                "insert_new_line_at_end_of_file_if_missing" => {
                    o.insert_new_line_at_end_of_file_if_missing = boolean(key, value)?
                }
                "format_line_comments" => o.format_line_comments = boolean(key, value)?,
                _ => {}
            }
        }
        Ok(o)
    }

    pub fn from_yaml(reader: impl Read) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_reader(reader)
    }

    /// One continuation level in spaces.
    pub(crate) fn continuation_spaces(&self) -> usize {
        self.continuation_indent * self.indent_size
    }
}

fn unknown(key: &str, value: &str, allowed: &'static [&'static str]) -> ConfigError {
    ConfigError::UnknownValue {
        key: key.to_string(),
        value: value.to_string(),
        allowed,
    }
}

fn number(key: &str, value: &str) -> Result<usize, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidNumber {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn boolean(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(unknown(key, value, &["true", "false"])),
    }
}

/// A wrapping style option resolved into its concrete parts, built once
/// per construct instead of decoding flags at every call site.
#[derive(Debug, Clone, Copy)]
pub(crate) struct WrapSpec {
    pub split_style: SplitStyle,
    pub force: bool,
    pub indent_by_one: bool,
    pub indent_on_column: bool,
}

impl WrapSpec {
    pub(crate) fn new(split_style: SplitStyle) -> Self {
        Self {
            split_style,
            force: false,
            indent_by_one: false,
            indent_on_column: false,
        }
    }
}
