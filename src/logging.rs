use std::{io, path};

use log::*;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    #[serde(alias = "off")]
    Quiet,
    #[default]
    #[serde(alias = "warn")]
    Normal,
    #[serde(alias = "info")]
    Verbose,
    #[serde(alias = "debug")]
    VeryVerbose,
}

impl From<Verbosity> for LevelFilter {
    fn from(verbosity: Verbosity) -> Self {
        match verbosity {
            Verbosity::Quiet => Self::Off,
            Verbosity::Normal => Self::Warn,
            Verbosity::Verbose => Self::Info,
            Verbosity::VeryVerbose => Self::Debug,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum InitLoggerError {
    #[error("failed to open log file: {0}")]
    OpenLogFile(#[from] io::Error),
    #[error("failed to set logger (another logger has already been registered): {0}")]
    SetLog(#[from] log::SetLoggerError),
}

/// Installs a stderr logger, plus an append-mode file logger if `log_file`
/// is given. Libraries embedding the search normally bring their own logger;
/// this is for applications that don't.
pub fn init_logger(
    verbosity: Verbosity,
    log_file: Option<&path::Path>,
) -> Result<(), InitLoggerError> {
    let level_filter: LevelFilter = verbosity.into();

    let mut loggers: Vec<Box<dyn simplelog::SharedLogger>> = vec![simplelog::TermLogger::new(
        level_filter,
        simplelog::Config::default(),
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    )];

    if let Some(path) = log_file {
        loggers.push(simplelog::WriteLogger::new(
            level_filter,
            simplelog::Config::default(),
            std::fs::File::options()
                .append(true)
                .create(true)
                .open(path)?,
        ));
    }

    simplelog::CombinedLogger::init(loggers)?;

    Ok(())
}
