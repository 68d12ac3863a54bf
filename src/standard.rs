//! Settings every program gets unless turned off with
//! [`ClisetBuilder::standard_settings`](crate::ClisetBuilder::standard_settings).

use crate::setting::Setting;

pub const HELP: &str = "help";
pub const VERSION: &str = "version";
pub const DUMP_CONFIG: &str = "dump-config";
pub const DUMP_SETTING_NAMES: &str = "dump-setting-names";
pub const GENERATE_MANPAGE: &str = "generate-manpage";
pub const CONFIG: &str = "config";
pub const NO_DEFAULT_CONFIGS: &str = "no-default-configs";
pub const OUTPUT: &str = "output";
pub const LOG: &str = "log";
pub const LOG_LEVEL: &str = "log-level";

pub const CONFIG_GROUP: &str = "Configuration files and settings";
pub const LOGGING_GROUP: &str = "Logging";

/// Accepted `log-level` values, most verbose first.
pub const LOG_LEVELS: [&str; 6] = ["debug", "info", "warning", "error", "critical", "fatal"];

/// The standard settings. `version` is included only when the program has one.
pub fn standard_settings(with_version: bool) -> Vec<Setting> {
    let mut settings = vec![Setting::boolean(HELP, "show this help message and exit")
        .alias('h')
        .immediate()];
    if with_version {
        settings.push(
            Setting::boolean(VERSION, "show program's version number and exit").immediate(),
        );
    }
    settings.extend([
        Setting::string(OUTPUT, "write output to FILE, instead of standard output")
            .metavar("FILE"),
        Setting::string(GENERATE_MANPAGE, "fill in manual page TEMPLATE")
            .metavar("TEMPLATE")
            .immediate(),
        Setting::string_list(CONFIG, "add FILE to config files")
            .metavar("FILE")
            .group(CONFIG_GROUP),
        Setting::boolean(NO_DEFAULT_CONFIGS, "clear list of configuration files to read")
            .group(CONFIG_GROUP),
        Setting::boolean(DUMP_CONFIG, "write out the entire current configuration")
            .immediate()
            .group(CONFIG_GROUP),
        Setting::boolean(DUMP_SETTING_NAMES, "write out all names of settings and quit")
            .immediate()
            .group(CONFIG_GROUP),
        Setting::string(LOG, "write log entries to FILE")
            .metavar("FILE")
            .group(LOGGING_GROUP),
        Setting::choice(LOG_LEVEL, LOG_LEVELS, "log at given level")
            .metavar("LEVEL")
            .default_value("info")
            .group(LOGGING_GROUP),
    ]);
    settings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registry;

    #[test]
    fn standard_settings_register() {
        let mut registry = Registry::new();
        registry.register_all(standard_settings(true)).unwrap();
        assert!(registry.contains(VERSION));
        assert!(registry.get(HELP).unwrap().is_immediate());
        assert_eq!(registry.short_flag('h'), registry.index_of(HELP));
        assert_eq!(
            registry.get(LOG_LEVEL).unwrap().default(),
            &crate::Value::from("info")
        );
        assert_eq!(
            registry.get(LOG).unwrap().group_name(),
            Some(LOGGING_GROUP)
        );
    }

    #[test]
    fn version_only_when_known() {
        let names: Vec<_> = standard_settings(false)
            .iter()
            .map(|s| s.name().to_string())
            .collect();
        assert!(!names.iter().any(|n| n == VERSION));
        assert!(names.iter().any(|n| n == NO_DEFAULT_CONFIGS));
    }
}
