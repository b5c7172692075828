use corpus_prep::cli::PrepCli;
use corpus_prep::constants::LOG_PREFIX;
use tracing::error;
use tracing_subscriber::EnvFilter;

fn init_logging(verbosity: u8) {
    let default_level = if verbosity > 0 { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = match PrepCli::parse_args(std::env::args_os()) {
        Ok(Some(cli)) => cli,
        Ok(None) => return,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(err.exit_code());
        }
    };
    init_logging(cli.verbosity());

    if let Err(err) = cli.execute() {
        error!(code = err.exit_code(), "{LOG_PREFIX} {err}");
        std::process::exit(err.exit_code());
    }
}
