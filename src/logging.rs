use anyhow::Result;
use clap::ValueEnum;

#[derive(Copy, Clone, Debug, ValueEnum)]
#[clap(rename_all = "lower")]
pub enum LoggingMode {
    Stderr,
    Stdout,
}

pub fn init_logging(mode: LoggingMode, debug: bool) -> Result<()> {
    let level = if debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    let mut dispatch = fern::Dispatch::new()
        .level(level)
        // keep HTTP client internals out of the step log
        .level_for("reqwest", log::LevelFilter::Warn)
        .level_for("hyper_util", log::LevelFilter::Warn)
        .level_for("rustls", log::LevelFilter::Warn)
        .format(|out, message, record| {
            let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
            let thread_id = format!("{:?}", std::thread::current().id());
            let module = record.module_path().unwrap_or(record.target());
            let line = record
                .line()
                .map(|line| line.to_string())
                .unwrap_or_else(|| "?".to_string());
            out.finish(format_args!(
                "[{}] [{}] [{}] [{}:{}] [{}]",
                record.level(),
                timestamp,
                thread_id,
                module,
                line,
                message
            ))
        });

    dispatch = match mode {
        LoggingMode::Stderr => dispatch.chain(std::io::stderr()),
        LoggingMode::Stdout => dispatch.chain(std::io::stdout()),
    };

    dispatch.apply()?;
    Ok(())
}
