//! Terminal geometry

use tracing::debug;

const DEFAULT_WIDTH: u16 = 80;
const DEFAULT_HEIGHT: u16 = 25;

/// Terminal dimensions in character cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalSize {
    pub width: u16,
    pub height: u16,
}

impl Default for TerminalSize {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }
}

impl TerminalSize {
    /// Query the attached terminal, falling back to `LINES`/`COLUMNS`
    pub fn current() -> Self {
        match crossterm::terminal::size() {
            Ok((width, height)) if width > 0 && height > 0 => Self { width, height },
            Ok(_) | Err(_) => {
                debug!("Terminal size unavailable, using environment");
                Self::from_env_values(
                    std::env::var("LINES").ok().as_deref(),
                    std::env::var("COLUMNS").ok().as_deref(),
                )
            }
        }
    }

    /// Build a size from raw `LINES` and `COLUMNS` values
    pub fn from_env_values(lines: Option<&str>, columns: Option<&str>) -> Self {
        let parse = |value: Option<&str>, default: u16| {
            value
                .and_then(|v| v.trim().parse::<u16>().ok())
                .filter(|v| *v > 0)
                .unwrap_or(default)
        };

        Self {
            width: parse(columns, DEFAULT_WIDTH),
            height: parse(lines, DEFAULT_HEIGHT),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_values() {
        let size = TerminalSize::from_env_values(Some("40"), Some("132"));
        assert_eq!(size, TerminalSize { width: 132, height: 40 });
    }

    #[test]
    fn test_env_values_fallback() {
        assert_eq!(
            TerminalSize::from_env_values(None, Some("wide")),
            TerminalSize::default()
        );
        assert_eq!(TerminalSize::from_env_values(Some("0"), None).height, 25);
    }
}
