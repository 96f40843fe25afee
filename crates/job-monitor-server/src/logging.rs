use std::io::Write;

/// Installs the process logger. `RUST_LOG`, when set, takes precedence over
/// the `debug` flag.
pub fn init_logging(debug: bool) {
    let filter = if debug { "debug" } else { "info" };

    let result = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter))
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {} [{}] - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .try_init();

    if result.is_err() {
        log::debug!("logger already initialized");
    }
}
