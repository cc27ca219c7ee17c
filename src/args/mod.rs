//! Abstractions related to the inputs of the CLI program.

#[derive(clap::Parser)]
#[command(
    name = env!("CARGO_PKG_NAME"),
    version,
    about = "Interactive wizard that builds a Teeworlds (or derivative) game server from source."
)]
pub struct Cli {
    /// Log debug output from the start and preselect detailed build logs.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn get_args() -> Self {
        return <Cli as clap::Parser>::parse();
    }

    pub fn log_level(&self) -> log::LevelFilter {
        if self.verbose {
            return log::LevelFilter::Debug;
        }
        return log::LevelFilter::Info;
    }
}
