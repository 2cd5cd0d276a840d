use crate::culture::Culture;
use crate::error::{Error, Result};
use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, error};

/// Default location of the settings file.
pub const DEFAULT_SETTINGS_FILE: &str = "settings.xml";

/// Run-wide settings shared read-only by every file task.
///
/// Loaded from XML with [`Settings::load`] or built with [`Settings::builder()`]:
///
/// ```xml
/// <Settings>
///   <SourceCultureName>ru-RU</SourceCultureName>
///   <Verbose>true</Verbose>
/// </Settings>
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename = "Settings", default)]
#[non_exhaustive]
pub struct Settings {
    /// Culture used to parse numbers and dates; empty selects the invariant culture
    #[serde(rename = "SourceCultureName")]
    pub source_culture_name: String,

    /// Enables informational per-file logging
    #[serde(rename = "Verbose")]
    pub verbose: bool,
}

impl Settings {
    /// Creates a new settings builder.
    ///
    /// # Examples
    ///
    /// ```
    /// use lineconv::Settings;
    ///
    /// let settings = Settings::builder()
    ///     .source_culture_name("en-GB")
    ///     .verbose(true)
    ///     .build()
    ///     .expect("valid settings");
    /// ```
    #[must_use]
    pub fn builder() -> SettingsBuilder {
        SettingsBuilder::default()
    }

    /// Loads settings from an XML file.
    ///
    /// A missing file is not an error: it is logged and defaults are returned.
    /// The culture name is not checked here; an unknown culture fails each file
    /// task that uses it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigLoad`] if the file exists but cannot be read or
    /// parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                error!("{}", Error::config_missing(path));
                return Ok(Self::default());
            }
            Err(e) => return Err(Error::config_load(path, e.to_string())),
        };

        let settings: Self =
            quick_xml::de::from_str(&content).map_err(|e| Error::config_load(path, e.to_string()))?;

        debug!("Loaded settings from {}: {:?}", path.display(), settings);
        Ok(settings)
    }

    /// Resolves the configured culture.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownCulture`] if the name is not recognized.
    pub fn culture(&self) -> Result<Culture> {
        Culture::from_name(&self.source_culture_name)
    }

    /// Validates the settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the culture name is unknown.
    pub fn validate(&self) -> Result<()> {
        self.culture().map(|_| ())
    }
}

/// Builder for creating [`Settings`].
#[derive(Debug, Default)]
pub struct SettingsBuilder {
    source_culture_name: Option<String>,
    verbose: bool,
}

impl SettingsBuilder {
    /// Sets the culture name.
    #[must_use]
    pub fn source_culture_name(mut self, name: impl Into<String>) -> Self {
        self.source_culture_name = Some(name.into());
        self
    }

    /// Enables or disables verbose logging.
    #[must_use]
    pub const fn verbose(mut self, enabled: bool) -> Self {
        self.verbose = enabled;
        self
    }

    /// Builds the settings.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails.
    pub fn build(self) -> Result<Settings> {
        let settings = Settings {
            source_culture_name: self.source_culture_name.unwrap_or_default(),
            verbose: self.verbose,
        };

        settings.validate()?;
        Ok(settings)
    }
}
