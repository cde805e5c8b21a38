use std::fmt::Display;

use console::{style, StyledObject};

fn styled(text: impl Display) -> StyledObject<String> {
    style(text.to_string())
}

/// Section titles and resource labels.
pub fn bright(text: impl Display) -> StyledObject<String> {
    styled(text).bright()
}

/// "No data" and month-only notices.
pub fn bright_yellow(text: impl Display) -> StyledObject<String> {
    bright(text).yellow()
}

pub fn bright_green(text: impl Display) -> StyledObject<String> {
    bright(text).green()
}

/// Usage errors and failed metrics, printed to stderr.
pub fn bright_red(text: impl Display) -> StyledObject<String> {
    bright(text).red()
}

pub fn cyan(text: impl Display) -> StyledObject<String> {
    styled(text).cyan()
}

pub fn dim(text: impl Display) -> StyledObject<String> {
    styled(text).dim()
}

pub fn magenta_bold(text: impl Display) -> StyledObject<String> {
    styled(text).magenta().bold()
}
