use crate::{
    config::{ClientConfig, RuntimeConfig},
    storage::{FileStore, CREDENTIALS_FILE},
};
use anyhow::Result;
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Settings shared by every subcommand.
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub config: ClientConfig,
    pub credentials_path: PathBuf,
    pub output: OutputFormat,
}

impl GlobalArgs {
    /// Applies command-line overrides on top of [`ClientConfig::load`].
    ///
    /// # Errors
    /// Returns an error when no credentials location can be determined.
    pub fn new(
        server_url: Option<&str>,
        api_base: Option<&str>,
        config_dir: Option<&str>,
        json: bool,
    ) -> Result<Self> {
        let mut config = ClientConfig::load();
        config.apply(RuntimeConfig::new(server_url, api_base));

        let credentials_path = match config_dir.map(str::trim).filter(|dir| !dir.is_empty()) {
            Some(dir) => PathBuf::from(dir).join(CREDENTIALS_FILE),
            None => FileStore::default_location()?,
        };

        Ok(Self {
            config,
            credentials_path,
            output: if json {
                OutputFormat::Json
            } else {
                OutputFormat::Text
            },
        })
    }

    #[must_use]
    pub fn store(&self) -> FileStore {
        FileStore::new(&self.credentials_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn test_global_args() -> Result<()> {
        let args = GlobalArgs::new(
            Some("https://admin.tld"),
            Some("/api"),
            Some("/tmp/crewadmin"),
            true,
        )?;
        assert_eq!(args.config.server_url, "https://admin.tld");
        assert_eq!(
            args.credentials_path,
            PathBuf::from("/tmp/crewadmin").join(CREDENTIALS_FILE)
        );
        assert_eq!(args.output, OutputFormat::Json);
        assert_eq!(args.store().path(), args.credentials_path.as_path());
        Ok(())
    }

    #[test]
    fn blank_config_dir_falls_back_to_home() {
        temp_env::with_vars(
            [
                ("CREWADMIN_CONFIG_DIR", None::<&str>),
                ("HOME", Some("/home/tester")),
            ],
            || {
                let args = GlobalArgs::new(None, None, Some("  "), false).ok();
                assert_eq!(
                    args.map(|args| args.credentials_path),
                    Some(PathBuf::from("/home/tester/.config/crewadmin").join(CREDENTIALS_FILE))
                );
            },
        );
    }
}
