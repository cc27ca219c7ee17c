static EXIT_OK: i32 = 0;

/// The build was aborted, failed, or some unexpected error occurred.
static EXIT_ERR_ABORTED: i32 = 1;

/// The user interrupted the wizard with Ctrl+C or closed its input.
static EXIT_ERR_INTERRUPTED: i32 = 130;

fn main() {
    let cli: teemake::args::Cli = teemake::args::Cli::get_args();

    let logger: Option<teemake::logging::Logger> =
        match teemake::logging::Logger::init(cli.log_level()) {
            Ok(n) => Some(n),
            Err(err) => {
                eprintln!("Cannot initialize logging: {err}");
                None
            }
        };

    if let Err(err) = ctrlc::set_handler(|| {
        println!();
        println!("{}", console::style(teemake::text::CANCELLED).yellow());
        std::process::exit(EXIT_ERR_INTERRUPTED);
    }) {
        log::warn!("Cannot install interrupt handler: {err}");
    }

    let config_path: std::path::PathBuf = teemake::config::Config::default_fs_path();
    let config: teemake::config::Config = teemake::config::Config::load_or_default(&config_path);

    let base_dir: std::path::PathBuf = match std::env::current_dir() {
        Ok(n) => n,
        Err(err) => {
            log::error!("Unrecoverable error: Cannot resolve working directory: {err}");
            std::process::exit(EXIT_ERR_ABORTED);
        }
    };
    let session: teemake::wizard::Session = teemake::wizard::Session {
        host: teemake::pipeline::Host::detect(),
        base_dir,
        verbose: cli.verbose,
    };
    log::debug!(
        "Detected package manager {}, {} CPUs",
        session.host.package_manager,
        session.host.cpu_count
    );

    let mut term: teemake::tty::Terminal<std::io::StdinLock<'static>, std::io::Stdout> =
        teemake::tty::Terminal::stdio();
    let timeout: std::time::Duration = config.command_timeout();
    match teemake::wizard::run(
        &mut term,
        session,
        &config,
        logger.as_ref(),
        &teemake::wizard::SystemPreflight,
        |verbose| teemake::proc::Runner::new(verbose, timeout),
    ) {
        Ok(Some(_)) => std::process::exit(EXIT_OK),
        Ok(None) => std::process::exit(EXIT_ERR_ABORTED),
        Err(err) if err.is_interrupt() => {
            println!();
            println!("{}", console::style(teemake::text::CANCELLED).yellow());
            std::process::exit(EXIT_ERR_INTERRUPTED);
        }
        Err(err) => {
            log::error!(
                "Unrecoverable error: {}",
                teemake::util::aggregate_error_tree(&err, 2).trim_end()
            );
            std::process::exit(EXIT_ERR_ABORTED);
        }
    }
}
