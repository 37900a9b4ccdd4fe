//! Config command for printing the effective configuration.

use std::io::Write;

use anyhow::Result;

use crate::Config;

/// Prints the configuration with the app key redacted.
pub fn run<W: Write>(writer: &mut W, config: &Config) -> Result<()> {
    let app_key = if config.app_key.is_some() {
        "[REDACTED]"
    } else {
        "(not set)"
    };
    writeln!(writer, "app_key:              {app_key}")?;
    writeln!(
        writer,
        "host:                 {}",
        config.host.as_deref().unwrap_or("(not set)")
    )?;
    writeln!(
        writer,
        "app_version:          {}",
        config.app_version.as_deref().unwrap_or("(not set)")
    )?;
    writeln!(
        writer,
        "request_timeout_secs: {}",
        config.request_timeout_secs
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use insta::assert_snapshot;

    use super::*;

    #[test]
    fn config_output_redacts_app_key() {
        let config = Config {
            app_key: Some("secret".to_string()),
            host: Some("https://stats.example.com".to_string()),
            app_version: None,
            request_timeout_secs: 10,
        };
        let mut output = Vec::new();

        run(&mut output, &config).unwrap();

        assert_snapshot!(String::from_utf8(output).unwrap(), @r"
        app_key:              [REDACTED]
        host:                 https://stats.example.com
        app_version:          (not set)
        request_timeout_secs: 10
        ");
    }
}
