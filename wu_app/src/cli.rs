/// Picks the configuration path from an argument list, falling back to `default`
///
/// The first positional argument after the program name wins.
pub fn config_path_from<I>(args: I, default: &str) -> String
where
    I: IntoIterator<Item = String>,
{
    args.into_iter().nth(1).filter(|arg| !arg.is_empty()).unwrap_or_else(|| default.to_string())
}

/// Parses the configuration path from the process arguments
pub fn config_path(default: &str) -> String {
    config_path_from(std::env::args(), default)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_default_when_no_argument() {
        assert_eq!(config_path_from(args(&["wu_demo"]), "config/demo.toml"), "config/demo.toml");
    }

    #[test]
    fn test_first_argument_wins() {
        assert_eq!(config_path_from(args(&["wu_demo", "custom.toml", "ignored"]), "config/demo.toml"), "custom.toml");
    }

    #[test]
    fn test_empty_argument_falls_back() {
        assert_eq!(config_path_from(args(&["wu_demo", ""]), "config/demo.toml"), "config/demo.toml");
    }
}
