//! Minimal `node.toml` parser
//!
//! Handles only the subset the node configuration needs. It does NOT
//! support the full TOML grammar.
//!
//! Supported:
//! - `[section]` headers
//! - `key = integer` pairs, decimal or `0x` hex, `_` separators allowed
//! - Comments (`# ...`), full-line or trailing
//!
//! Keys that are not present keep their default value.

use super::types::{ConfigError, NodeConfig};

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Line is neither a header nor a `key = value` pair
    Syntax { line: usize },
    /// Header names a section this node does not have
    UnknownSection { line: usize },
    /// Key not valid in the current section
    UnknownKey { line: usize },
    /// Value is not an integer
    InvalidValue { line: usize },
    /// Integer does not fit the field
    OutOfRange { line: usize },
    /// Values parsed but do not make a usable configuration
    Invalid(ConfigError),
}

impl From<ConfigError> for ParseError {
    fn from(err: ConfigError) -> Self {
        ParseError::Invalid(err)
    }
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Loop,
    Graph,
    Display,
    Server,
}

/// Parse `node.toml` text into a validated [`NodeConfig`]
pub fn parse_config(input: &str) -> Result<NodeConfig, ParseError> {
    let mut config = NodeConfig::default();
    let mut section = Section::Root;

    for (index, raw) in input.lines().enumerate() {
        let line_no = index + 1;
        let line = strip_comment(raw).trim();

        if line.is_empty() {
            continue;
        }

        if let Some(header) = line.strip_prefix('[') {
            let name = header
                .strip_suffix(']')
                .ok_or(ParseError::Syntax { line: line_no })?;
            section = parse_section(name.trim())
                .ok_or(ParseError::UnknownSection { line: line_no })?;
            continue;
        }

        let (key, value) = line
            .split_once('=')
            .ok_or(ParseError::Syntax { line: line_no })?;
        let value = parse_int(value.trim()).ok_or(ParseError::InvalidValue { line: line_no })?;

        apply(&mut config, section, key.trim(), value, line_no)?;
    }

    config.validate()?;
    Ok(config)
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
    }
}

fn parse_section(name: &str) -> Option<Section> {
    match name {
        "loop" => Some(Section::Loop),
        "graph" => Some(Section::Graph),
        "display" => Some(Section::Display),
        "server" => Some(Section::Server),
        _ => None,
    }
}

/// Parse a non-negative integer literal
fn parse_int(text: &str) -> Option<u32> {
    let (digits, radix) = match text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
    {
        Some(hex) => (hex, 16),
        None => (text, 10),
    };

    if digits.is_empty() || digits.starts_with('_') || digits.ends_with('_') {
        return None;
    }

    let mut value: u32 = 0;
    for c in digits.chars() {
        if c == '_' {
            continue;
        }
        let digit = c.to_digit(radix)?;
        value = value.checked_mul(radix)?.checked_add(digit)?;
    }
    Some(value)
}

fn narrow<T: TryFrom<u32>>(value: u32, line: usize) -> Result<T, ParseError> {
    T::try_from(value).map_err(|_| ParseError::OutOfRange { line })
}

fn apply(
    config: &mut NodeConfig,
    section: Section,
    key: &str,
    value: u32,
    line: usize,
) -> Result<(), ParseError> {
    match (section, key) {
        (Section::Loop, "debounce_ms") => config.timing.debounce_ms = value,
        (Section::Loop, "update_interval_ms") => config.timing.update_interval_ms = value,
        (Section::Loop, "link_retry_ms") => config.timing.link_retry_ms = value,
        (Section::Graph, "top") => config.graph.top = narrow(value, line)?,
        (Section::Graph, "height") => config.graph.height = narrow(value, line)?,
        (Section::Display, "i2c_address") => config.display.i2c_address = narrow(value, line)?,
        (Section::Server, "port") => config.server.port = narrow(value, line)?,
        _ => return Err(ParseError::UnknownKey { line }),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHIPPED: &str = include_str!("../../../telenode-firmware/node.toml");

    #[test]
    fn test_shipped_config() {
        let config = parse_config(SHIPPED).unwrap();
        assert_eq!(config, NodeConfig::default());
    }

    #[test]
    fn test_empty_input_uses_defaults() {
        assert_eq!(parse_config(""), Ok(NodeConfig::default()));
    }

    #[test]
    fn test_overrides() {
        let config = parse_config("[server]\nport = 8_080\n[display]\ni2c_address = 0x3d\n").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.display.i2c_address, 0x3D);
        assert_eq!(config.timing.debounce_ms, 50);
    }

    #[test]
    fn test_unknown_section() {
        assert_eq!(
            parse_config("[loop]\ndebounce_ms = 10\n[wifi]\n"),
            Err(ParseError::UnknownSection { line: 3 })
        );
    }

    #[test]
    fn test_key_in_wrong_section() {
        assert_eq!(
            parse_config("[graph]\nport = 81\n"),
            Err(ParseError::UnknownKey { line: 2 })
        );
        assert_eq!(
            parse_config("port = 81\n"),
            Err(ParseError::UnknownKey { line: 1 })
        );
    }

    #[test]
    fn test_invalid_values() {
        assert_eq!(
            parse_config("[server]\nport = \"81\"\n"),
            Err(ParseError::InvalidValue { line: 2 })
        );
        assert_eq!(
            parse_config("[server]\nport = -1\n"),
            Err(ParseError::InvalidValue { line: 2 })
        );
        assert_eq!(
            parse_config("[server]\nport = 70000\n"),
            Err(ParseError::OutOfRange { line: 2 })
        );
        assert_eq!(
            parse_config("[loop\n"),
            Err(ParseError::Syntax { line: 1 })
        );
    }

    #[test]
    fn test_out_of_range_geometry_rejected() {
        assert_eq!(
            parse_config("[graph]\ntop = 30\nheight = 40\n"),
            Err(ParseError::Invalid(ConfigError::PlotOutOfBounds))
        );
    }

    #[test]
    fn test_parse_int() {
        assert_eq!(parse_int("0"), Some(0));
        assert_eq!(parse_int("1_000"), Some(1000));
        assert_eq!(parse_int("0xff"), Some(255));
        assert_eq!(parse_int("0x"), None);
        assert_eq!(parse_int("_1"), None);
        assert_eq!(parse_int("99999999999"), None);
    }
}
