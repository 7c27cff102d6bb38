//! `check` subcommand: validate the config file and report every problem.

use std::path::Path;

use netled_lib::NetledError;

use super::{CheckOutput, Config, Result};

fn check_config(config: &Config, warnings: Vec<String>) -> CheckOutput {
    let errors: Vec<String> = match config.validate() {
        Ok(()) => Vec::new(),
        Err(errors) => errors.iter().map(|e| e.to_string()).collect(),
    };
    CheckOutput {
        // A file that failed to parse was replaced by defaults
        valid: errors.is_empty() && warnings.is_empty(),
        warnings,
        errors,
    }
}

pub(super) fn cmd_check(json: bool, config_path: Option<&Path>) -> Result<()> {
    let (config, warnings) = super::load_config_with_warnings(config_path);
    let output = check_config(&config, warnings);

    if json {
        super::print_json(&output)?;
    } else {
        for w in &output.warnings {
            println!("warning: {w}");
        }
        for e in &output.errors {
            println!("error: {e}");
        }
        if output.valid {
            println!("Config OK ({} binding(s)).", config.bindings.len());
        }
    }

    if output.valid {
        Ok(())
    } else {
        Err(NetledError::Config(format!(
            "{} problem(s) found",
            output.errors.len() + output.warnings.len()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netled_lib::config::Binding;

    #[test]
    fn default_config_is_valid() {
        let out = check_config(&Config::default(), vec![]);
        assert!(out.valid);
        assert!(out.errors.is_empty());
    }

    #[test]
    fn parse_warning_makes_config_invalid() {
        let out = check_config(&Config::default(), vec!["parse error".into()]);
        assert!(!out.valid);
        assert_eq!(out.warnings, vec!["parse error"]);
    }

    #[test]
    fn reports_each_validation_error() {
        let config = Config {
            event_poll_ms: 0,
            bindings: vec![Binding {
                interval: 1,
                ..Binding::new("a", "eth0")
            }],
            ..Config::default()
        };
        let out = check_config(&config, vec![]);
        assert!(!out.valid);
        assert_eq!(out.errors.len(), 2);
        assert!(out.errors.iter().any(|e| e.contains("event_poll_ms")));
        assert!(out.errors.iter().any(|e| e.contains("interval")));
    }
}
