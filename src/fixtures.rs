#[cfg(test)]
pub mod test {
    use crate::dispatch::{Subcommand, Subcommands};
    use crate::registry::Registry;
    use crate::setting::Setting;

    /// Settings shared by the unit tests.
    pub fn test_settings() -> Vec<Setting> {
        vec![
            Setting::boolean("verbose", "Print more output.").alias('v'),
            Setting::boolean("color", "Colorize output.").default_value(true),
            Setting::string("output", "Write output to FILE.")
                .alias('o')
                .metavar("FILE"),
            Setting::string_list("pattern", "Pattern to search for.")
                .alias('e')
                .metavar("PATTERN"),
            Setting::integer("jobs", "Number of parallel jobs.")
                .alias('j')
                .default_value(1_i64),
            Setting::bytesize("max-size", "Skip files larger than SIZE."),
            Setting::choice("mode", ["fast", "slow"], "Search strategy."),
            Setting::boolean("help", "Show this help and exit.")
                .alias('h')
                .immediate(),
            Setting::boolean("dump-config", "Write the resolved configuration and exit.")
                .immediate(),
            Setting::string("generate-manpage", "Fill a manual page TEMPLATE and exit.")
                .metavar("TEMPLATE")
                .immediate(),
        ]
    }

    pub fn test_registry() -> Registry {
        let mut registry = Registry::new();
        registry.register_all(test_settings()).unwrap();
        registry
    }

    pub fn test_subcommands() -> Subcommands {
        let mut subcommands = Subcommands::new();
        subcommands
            .add(Subcommand::new("search", "Search files for patterns.").usage("[FILE]..."))
            .unwrap();
        subcommands
            .add(Subcommand::new("print", "Print matching lines.").usage("FILE"))
            .unwrap();
        subcommands
    }

    #[test]
    fn fixture_registry_builds() {
        let registry = test_registry();
        assert_eq!(registry.len(), test_settings().len());
        assert_eq!(test_subcommands().names().count(), 3);
    }
}
