//! CLI parsing helpers for clap value parsers.

/// Parse a run label. Labels name a directory, so they must be a single
/// non-empty path component.
pub(super) fn parse_label(s: &str) -> Result<String, String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(String::from("label must not be empty"));
    }
    if trimmed.contains(['/', '\\']) || matches!(trimmed, "." | "..") {
        return Err(format!("label '{s}' must be a single path component"));
    }
    Ok(trimmed.to_owned())
}

pub(super) fn parse_flash_size(s: &str) -> Result<i64, String> {
    let value: i64 = s
        .parse()
        .map_err(|_| format!("{s} is not a valid number"))?;
    if (1..=super::MAX_FLASH_MB).contains(&value) {
        Ok(value)
    } else {
        Err(format!(
            "flash size must be between 1 and {} MB",
            super::MAX_FLASH_MB
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("default", Ok("default"))]
    #[case(" smoke ", Ok("smoke"))]
    #[case("", Err(()))]
    #[case("..", Err(()))]
    #[case("a/b", Err(()))]
    fn labels(#[case] input: &str, #[case] expected: Result<&str, ()>) {
        assert_eq!(parse_label(input).as_deref().map_err(|_| ()), expected);
    }

    #[rstest]
    #[case("16", Ok(16))]
    #[case("0", Err(()))]
    #[case("4096", Err(()))]
    #[case("many", Err(()))]
    fn flash_sizes(#[case] input: &str, #[case] expected: Result<i64, ()>) {
        assert_eq!(parse_flash_size(input).map_err(|_| ()), expected);
    }
}
