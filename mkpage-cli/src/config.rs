use std::path::PathBuf;
use std::time::Duration;

use mkpage::error::Result;
use mkpage::resolve::{KeyValues, ResolverConfig};
use mkpage::templating::TemplateSet;

/// The environment variable listing template paths, colon-delimited.
pub const TEMPLATES_VAR: &str = "MKPAGE_TEMPLATES";

#[derive(Debug)]
pub struct Templates {
    pub set: TemplateSet,
    /// Whether `set` holds the built-in templates.
    pub builtin: bool,
}

impl Templates {
    /// Templates from `paths`, else from `$MKPAGE_TEMPLATES`, else the
    /// built-in ones.
    pub fn discover(paths: &[PathBuf]) -> Result<Self> {
        let from_env = std::env::var(TEMPLATES_VAR).unwrap_or_default();
        let paths: Vec<PathBuf> = match paths.is_empty() {
            false => paths.to_vec(),
            true => from_env.split(':')
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from)
                .collect(),
        };

        if paths.is_empty() {
            log::debug!("using built-in templates");
            return Ok(Templates { set: TemplateSet::defaults(), builtin: true });
        }

        log::debug!("reading templates from {paths:?}");
        Ok(Templates { set: TemplateSet::read_files(&paths)?, builtin: false })
    }
}

pub fn resolver_config(timeout: Option<u64>) -> ResolverConfig {
    let mut config = ResolverConfig::default();
    if let Some(seconds) = timeout {
        config.timeout = Duration::from_secs(seconds);
    }

    config
}

/// Parses `key=value` pairs. Later duplicates replace earlier ones.
pub fn key_values(pairs: &[String]) -> Result<KeyValues> {
    let mut kv = KeyValues::new();
    for pair in pairs {
        let Some((key, value)) = pair.split_once('=') else {
            return mkpage::err! {
                "data sources must be `key=value` pairs",
                "argument" => pair,
            };
        };

        kv.insert(key.trim().to_string(), value.to_string());
    }

    Ok(kv)
}

#[cfg(test)]
mod config_tests {
    use super::*;

    #[test]
    fn parses_key_value_pairs() {
        let pairs = ["title=text:Hi".to_string(), "body=markdown:a=b".into(), "title=text:Bye".into()];
        let kv = key_values(&pairs).unwrap();
        assert_eq!(kv.len(), 2);
        assert_eq!(kv["title"], "text:Bye");
        assert_eq!(kv["body"], "markdown:a=b");

        assert!(key_values(&["no-equals-sign".to_string()]).is_err());
    }

    #[test]
    fn explicit_timeouts() {
        assert_eq!(resolver_config(None).timeout, Duration::from_secs(30));
        assert_eq!(resolver_config(Some(5)).timeout, Duration::from_secs(5));
    }
}
