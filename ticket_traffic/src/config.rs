//! This module controls configuration parsing from the end user, providing a
//! convenience mechanism for the rest of the program. Every field has a
//! default, and the defaults give the generator's stock
//! behavior: target `http://localhost:9000`, jitter below 10ms, capacities
//! below 500, names shorter than 50 letters.
use std::{
    fs, io,
    path::{Path, PathBuf},
};

use http::Uri;
use serde::{Deserialize, Serialize};

use crate::stage::{poller, producer, saturator};

/// Errors produced by [`Config`]
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Error for a serde [`serde_yaml`].
    #[error("Failed to deserialize yaml: {0}")]
    SerdeYaml(#[from] serde_yaml::Error),
    /// Error reading config file
    #[error("Failed to read config file {path:?}: {source}")]
    ReadFile {
        /// File path
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: Box<io::Error>,
    },
}

fn default_target_uri() -> Uri {
    Uri::from_static("http://localhost:9000")
}

fn default_maximum_name_length() -> usize {
    50
}

/// Main configuration struct for this program
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// The base URI of the ticketing service
    #[serde(with = "http_serde::uri", default = "default_target_uri")]
    pub target_uri: Uri,
    /// The seed for random operations, drawn from the operating system if
    /// absent
    #[serde(default)]
    pub seed: Option<[u8; 32]>,
    /// Exclusive upper bound on the length of generated event and ticket
    /// names
    #[serde(default = "default_maximum_name_length")]
    pub maximum_name_length: usize,
    /// The event producer
    #[serde(default)]
    pub producer: producer::Config,
    /// The ticket saturator
    #[serde(default)]
    pub saturator: saturator::Config,
    /// The event poller
    #[serde(default)]
    pub poller: poller::Config,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_uri: default_target_uri(),
            seed: None,
            maximum_name_length: default_maximum_name_length(),
            producer: producer::Config::default(),
            saturator: saturator::Config::default(),
            poller: poller::Config::default(),
        }
    }
}

impl Config {
    /// Parse configuration from YAML. Blank input is the default
    /// configuration.
    ///
    /// # Errors
    ///
    /// Function will error if `contents` is not valid YAML for [`Config`].
    pub fn parse(contents: &str) -> Result<Self, Error> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(contents)?)
    }

    /// Load configuration from the file at `path`.
    ///
    /// # Errors
    ///
    /// Function will error if the file cannot be read or does not parse.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path).map_err(|source| Error::ReadFile {
            path: path.to_path_buf(),
            source: Box::new(source),
        })?;
        Self::parse(&contents)
    }
}
