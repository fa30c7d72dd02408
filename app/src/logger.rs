use crate::error::{BlescanError, BlescanResult};

use humantime::format_rfc3339_seconds;
use std::{path::Path, time::SystemTime};

#[derive(Clone, PartialEq)]
pub enum LoggerType {
    Interactive,
    Command,
}

/// The interactive screen logs to a file so log lines don't tear the device
/// list. One-shot commands log to stdout.
pub fn init_logger(
    log_type: LoggerType,
    filter: log::LevelFilter,
    log_file: &Path,
) -> BlescanResult<()> {
    let logger = fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "{} [{}] {} - {}",
                format_rfc3339_seconds(SystemTime::now()),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(filter);

    let logger = match log_type {
        LoggerType::Interactive => {
            let logger = logger.chain(fern::log_file(log_file)?);
            if log::LevelFilter::Debug == filter {
                logger.chain(std::io::stdout())
            } else {
                logger
            }
        }
        LoggerType::Command => logger.chain(std::io::stdout()),
    };

    logger.apply().map_err(|_| BlescanError::LoggerError)
}
