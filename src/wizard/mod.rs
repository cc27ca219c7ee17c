//! The interactive flow, step by step: folder name, game mode, build options,
//! log verbosity, confirmation, build and finally the server configuration.
//!
//! Every step re-prompts on invalid input. A run ends either with the path of
//! a finished build directory or with none when it was aborted.

use crate::catalog::{GameMode, PackageManager};
use crate::options::{Applied, BuildPlan, Command, Customization};
use crate::pipeline::{Host, Layout, Pipeline};
use crate::proc::Exec;
use crate::tty::Terminal;

/// State shared by the steps of one run.
#[derive(Debug, Clone)]
pub struct Session {
    pub host: Host,
    /// Directory in which the server's folder is created.
    pub base_dir: std::path::PathBuf,
    pub verbose: bool,
}

/// What the user chose in the first steps, consumed once by the build.
#[derive(Debug, Clone)]
pub struct BuildRequest {
    pub server_name: String,
    pub mode: &'static GameMode,
    pub plan: BuildPlan,
}

/// Checks carried out right before building.
pub trait Preflight {
    fn free_disk_space_mb(&self, dir: &std::path::Path) -> Result<u64, crate::system::Error>;
    fn has_cached_elevation(&self) -> bool;
    fn request_elevation(&self) -> bool;
}

/// [`Preflight`] against the real system.
pub struct SystemPreflight;

impl Preflight for SystemPreflight {
    fn free_disk_space_mb(&self, dir: &std::path::Path) -> Result<u64, crate::system::Error> {
        return crate::system::free_disk_space_mb(dir);
    }

    fn has_cached_elevation(&self) -> bool {
        return crate::system::has_cached_elevation();
    }

    fn request_elevation(&self) -> bool {
        return crate::system::request_elevation();
    }
}

/// Whether `name` is usable as a folder name: 1 to 64 characters out of
/// `[A-Za-z0-9_-]`, and nothing that could traverse paths.
///
/// ```rust
/// assert!(teemake::wizard::validate_server_name("my_server-1"));
/// assert!(!teemake::wizard::validate_server_name("../etc"));
/// assert!(!teemake::wizard::validate_server_name(""));
/// ```
pub fn validate_server_name(name: &str) -> bool {
    if name.contains("..") || name.contains('/') || name.contains('\\') {
        return false;
    }
    if name.is_empty() || name.len() > crate::constants::SERVER_NAME_LEN_MAX {
        return false;
    }
    let regex: regex::Regex =
        regex::Regex::new("^[A-Za-z0-9_-]+$").expect("regex should be valid");
    return regex.is_match(name);
}

fn screen<R: std::io::BufRead, W: std::io::Write>(
    term: &mut Terminal<R, W>,
    heading: &str,
) -> Result<(), crate::tty::Error> {
    term.clear_screen()?;
    term.say(console::style(crate::text::BANNER).cyan().bold())?;
    term.say(format!(
        "  {} {}",
        console::style(crate::text::INFOTEXT).bold(),
        console::style("| Teeworlds server build wizard").dim()
    ))?;
    term.blank()?;
    term.say(console::style(heading).cyan().bold())?;
    term.blank()?;
    return Ok(());
}

pub fn step_server_name<R: std::io::BufRead, W: std::io::Write>(
    term: &mut Terminal<R, W>,
) -> Result<String, crate::tty::Error> {
    loop {
        screen(term, "Step 1/5: Folder Name")?;
        let name: String = term.ask("Enter Folder Name", None)?;
        if validate_server_name(&name) {
            log::debug!("Server name: {name}");
            return Ok(name);
        }
        term.blank()?;
        term.say(console::style(crate::text::NAME_RULES).red())?;
        term.pause("Press Enter to try again...")?;
    }
}

pub fn step_game_mode<R: std::io::BufRead, W: std::io::Write>(
    term: &mut Terminal<R, W>,
) -> Result<&'static GameMode, crate::tty::Error> {
    let modes: &'static [GameMode] = crate::catalog::modes();
    loop {
        screen(term, "Step 2/5: Game Mode Selection")?;
        term.say(console::style("Available Game Modes:").bold())?;
        term.blank()?;
        term.say(format!("  {:<4} {:<12} {}", "#", "Mode", "Description"))?;
        for (index, mode) in modes.iter().enumerate() {
            term.say(format!(
                "  {:<4} {:<12} {}",
                console::style(index + 1).cyan(),
                console::style(mode.name).bold(),
                console::style(mode.description).dim()
            ))?;
        }
        term.blank()?;

        let choice: String = term.ask(&format!("Select a mode (1-{})", modes.len()), None)?;
        if let Ok(index) = choice.parse::<usize>() {
            if index >= 1 && index <= modes.len() {
                let mode: &'static GameMode = &modes[index - 1];
                log::debug!("Game mode: {}", mode.name);
                return Ok(mode);
            }
        }
        term.blank()?;
        term.say(console::style("Invalid choice. Please try again.").red())?;
        term.pause("Press Enter to continue...")?;
    }
}

fn show_options<R: std::io::BufRead, W: std::io::Write>(
    term: &mut Terminal<R, W>,
    customization: &Customization,
) -> Result<(), crate::tty::Error> {
    term.say(console::style("Available Build Options:").bold())?;
    term.blank()?;
    term.say(format!(
        "  {:<4} {:<22} {:<35} {}",
        "#", "Option", "Description", "Current"
    ))?;
    for (position, option) in customization.options().iter().enumerate() {
        let current: &str = customization.value(position).unwrap_or(option.default);
        let current: console::StyledObject<&str> = if customization.is_changed(position) {
            console::style(current).green().bold()
        } else {
            console::style(current)
        };
        term.say(format!(
            "  {:<4} {:<22} {:<35} {}",
            console::style(position + 1).cyan(),
            console::style(option.flag).bold(),
            console::style(option.description).dim(),
            current
        ))?;
    }
    term.blank()?;
    term.say(console::style("Instructions:").cyan())?;
    for line in crate::text::OPTION_INSTRUCTIONS {
        term.say(line)?;
    }
    term.blank()?;
    return Ok(());
}

/// Offer to customize the mode's CMake options and derive the build plan.
pub fn step_build_options<R: std::io::BufRead, W: std::io::Write>(
    term: &mut Terminal<R, W>,
    mode: &'static GameMode,
) -> Result<BuildPlan, crate::tty::Error> {
    screen(term, "Step 3/5: Build Options")?;
    if !term.confirm("Do you want to customize build options?", Some(false))? {
        term.blank()?;
        term.say(console::style("✓ Using default build options").cyan())?;
        return Ok(BuildPlan::defaults(mode));
    }

    if crate::catalog::build_options(mode).is_empty() {
        term.blank()?;
        term.say(
            console::style(format!("No customizable options available for {}", mode.name))
                .yellow(),
        )?;
        term.pause("Press Enter to continue...")?;
        return Ok(BuildPlan::defaults(mode));
    }

    let mut customization: Customization = Customization::new(mode);
    loop {
        screen(term, "Step 3/5: Build Options Customization")?;
        show_options(term, &customization)?;
        let input: String = term.ask("Enter option (number or name) or 'done'", None)?;
        match customization.apply(Command::parse(&input)) {
            Applied::Finished => break,
            Applied::Set { flag, value } => {
                log::debug!("Build option {flag} set to {value}");
                term.say(console::style(format!("✓ Set {flag} = {value}")).green())?;
            }
            Applied::NinjaEnabled => {
                term.say(console::style("✓ Enabled Ninja generator").green())?;
            }
            Applied::InvalidBoolean { flag } => {
                term.say(
                    console::style(format!(
                        "Invalid boolean value for {flag}. Use ON/OFF, YES/NO, TRUE/FALSE, or 1/0"
                    ))
                    .red(),
                )?;
                term.pause("Press Enter to continue...")?;
            }
            Applied::IndexOutOfRange { count } => {
                term.say(
                    console::style(format!("Invalid option number. Must be 1-{count}")).red(),
                )?;
                term.pause("Press Enter to continue...")?;
            }
            Applied::UnknownOption { name } => {
                log::warn!("Ignoring build option not known for {}: {name}", mode.name);
                term.say(
                    console::style(format!(
                        "Warning: {name} is not in the standard options list"
                    ))
                    .yellow(),
                )?;
                term.pause("Press Enter to continue...")?;
            }
            Applied::Malformed => {
                term.say(
                    console::style("Invalid format. Use <#>=<value>, <option>=<value>, or 'done'")
                        .red(),
                )?;
                term.say(console::style("Examples: 1=ON, -DMYSQL=ON, -GNinja, done").cyan())?;
                term.pause("Press Enter to continue...")?;
            }
        }
    }

    let plan: BuildPlan = customization.finish();
    if plan == BuildPlan::defaults(mode) {
        term.blank()?;
        term.say(console::style("No changes made, using defaults").cyan())?;
        term.pause("Press Enter to continue...")?;
    } else {
        log::debug!("CMake command: {}", plan.cmake_args.join(" "));
    }
    return Ok(plan);
}

pub fn step_verbose<R: std::io::BufRead, W: std::io::Write>(
    term: &mut Terminal<R, W>,
    default: bool,
) -> Result<bool, crate::tty::Error> {
    screen(term, "Step 4/5: Build Configuration")?;
    return term.confirm("Show detailed build logs?", Some(default));
}

fn show_summary<R: std::io::BufRead, W: std::io::Write>(
    term: &mut Terminal<R, W>,
    session: &Session,
    request: &BuildRequest,
) -> Result<(), crate::tty::Error> {
    let rows: [(&str, String); 5] = [
        ("Server Name:", request.server_name.clone()),
        ("Game Mode:", request.mode.name.to_string()),
        (
            "Build System:",
            if request.plan.use_ninja { "Ninja" } else { "Make" }.to_string(),
        ),
        ("Package Manager:", session.host.package_manager.to_string()),
        (
            "Verbose Logs:",
            if session.verbose { "Yes" } else { "No" }.to_string(),
        ),
    ];
    let border: String = "─".repeat(48);
    term.say(console::style(format!("╭─ Build Configuration {}╮", "─".repeat(26))).magenta())?;
    for (label, value) in rows {
        term.say(format!(
            "{} {} {}",
            console::style("│").magenta(),
            console::style(format!("{label:<17}")).bold(),
            value
        ))?;
    }
    term.say(console::style(format!("╰{border}╯")).magenta())?;
    term.blank()?;
    return Ok(());
}

fn check_disk_space<R: std::io::BufRead, W: std::io::Write, P: Preflight>(
    term: &mut Terminal<R, W>,
    preflight: &P,
    dir: &std::path::Path,
    min_mb: u64,
) -> Result<bool, crate::tty::Error> {
    let available_mb: u64 = match preflight.free_disk_space_mb(dir) {
        Ok(n) => n,
        Err(err) => {
            log::warn!(
                "Could not check disk space: {}",
                crate::util::aggregate_error_tree(&err, 2).trim_end()
            );
            return Ok(true);
        }
    };
    if available_mb < min_mb {
        term.say(console::style("✗ Insufficient disk space").red())?;
        term.say(format!("  Required: {min_mb}MB, Available: {available_mb}MB"))?;
        return Ok(false);
    }
    term.say(
        console::style(format!(
            "✓ Disk space check passed ({available_mb}MB available)"
        ))
        .green(),
    )?;
    return Ok(true);
}

fn ensure_elevation<R: std::io::BufRead, W: std::io::Write, P: Preflight>(
    term: &mut Terminal<R, W>,
    preflight: &P,
    privileged: bool,
) -> Result<bool, crate::tty::Error> {
    if privileged {
        term.say(console::style("✓ Running as root").green())?;
        return Ok(true);
    }
    if preflight.has_cached_elevation() {
        term.say(console::style("✓ Sudo privileges detected (cached)").green())?;
        return Ok(true);
    }
    term.say(console::style("Sudo privileges required for dependencies").yellow())?;
    if preflight.request_elevation() {
        term.say(console::style("✓ Sudo access granted").green())?;
        return Ok(true);
    }
    term.say(console::style("✗ Authentication failed").red())?;
    return Ok(false);
}

/// Show the summary and run the preflight checks. `false` means the run is
/// aborted, either because a check failed or the user declined to start.
pub fn step_confirm<R: std::io::BufRead, W: std::io::Write, P: Preflight>(
    term: &mut Terminal<R, W>,
    session: &Session,
    request: &BuildRequest,
    preflight: &P,
    config: &crate::config::Config,
) -> Result<bool, crate::tty::Error> {
    screen(term, "Step 4/5: Configuration Summary")?;
    show_summary(term, session, request)?;

    if !check_disk_space(term, preflight, &session.base_dir, config.min_disk_space_mb)? {
        term.pause("Press Enter to exit...")?;
        return Ok(false);
    }
    if !ensure_elevation(term, preflight, session.host.privileged)? {
        term.pause("Press Enter to exit...")?;
        return Ok(false);
    }

    term.blank()?;
    if !term.confirm("Start building now?", Some(true))? {
        term.say(console::style("Build cancelled.").yellow())?;
        return Ok(false);
    }
    return Ok(true);
}

/// Steps 1 to 3: what to build.
pub fn collect_request<R: std::io::BufRead, W: std::io::Write>(
    term: &mut Terminal<R, W>,
) -> Result<BuildRequest, crate::tty::Error> {
    let server_name: String = step_server_name(term)?;
    let mode: &'static GameMode = step_game_mode(term)?;
    let plan: BuildPlan = step_build_options(term, mode)?;
    return Ok(BuildRequest {
        server_name,
        mode,
        plan,
    });
}

/// Step 5: install dependencies and build. Returns the build directory, or
/// `None` if a stage failed or the user gave up.
pub fn execute<R: std::io::BufRead, W: std::io::Write, E: Exec>(
    term: &mut Terminal<R, W>,
    runner: &mut E,
    session: &Session,
    request: BuildRequest,
    config: &crate::config::Config,
) -> Result<Option<std::path::PathBuf>, crate::error::Error> {
    screen(term, "Step 5/5: Building Server")?;
    let mode: &'static GameMode = request.mode;
    let use_ninja: bool = request.plan.use_ninja;
    let layout: Layout = Layout::new(&session.base_dir, &request.server_name);
    let mut pipeline: Pipeline<E> = Pipeline::new(
        runner,
        mode,
        request.plan,
        session.host,
        config.max_build_jobs,
    );

    if session.host.package_manager == PackageManager::Unknown {
        term.say(
            console::style("✗ Unsupported package manager. Please install dependencies manually:")
                .red(),
        )?;
        term.say(format!(
            "  Example (APT): {}",
            crate::pipeline::manual_install_hint(mode, use_ninja)
        ))?;
        term.blank()?;
        if !term.confirm("Continue anyway? (dependencies must be installed)", None)? {
            term.say(console::style("Failed to install dependencies").red())?;
            return Ok(None);
        }
    } else if let Err(err) = pipeline.install_dependencies() {
        log::error!("{}", crate::util::aggregate_error_tree(&err, 2).trim_end());
        term.say(console::style("Failed to install dependencies").red())?;
        term.pause("Press Enter to exit...")?;
        return Ok(None);
    }

    match pipeline.build(&layout) {
        Ok(build_dir) => return Ok(Some(build_dir)),
        Err(err @ crate::pipeline::Error::Stage(_))
        | Err(err @ crate::pipeline::Error::NotCloned(_)) => {
            term.say(console::style(format!("✗ {err}")).red())?;
            return Ok(None);
        }
        Err(err) => return Err(err.into()),
    }
}

/// After a successful build: basic, advanced (falls back to basic) or no
/// configuration. Returns the written file, if any. A failed write is
/// reported but leaves the build intact.
pub fn configure_server<R: std::io::BufRead, W: std::io::Write>(
    term: &mut Terminal<R, W>,
    mode: &'static GameMode,
    build_dir: &std::path::Path,
) -> Result<Option<std::path::PathBuf>, crate::tty::Error> {
    screen(term, "Server Configuration")?;
    term.say(console::style("Choose Configuration Type:").bold())?;
    term.blank()?;
    let choices: [(&str, &str); 3] = [
        (
            "Basic Configuration",
            "Configure essential settings (name, port, players, gametype)",
        ),
        (
            "Advanced Configuration",
            "Configure all available settings (coming soon)",
        ),
        ("No Configuration", "Skip configuration - use default settings"),
    ];
    for (index, (name, description)) in choices.iter().enumerate() {
        term.say(format!(
            "  {:<4} {:<24} {}",
            console::style(index + 1).cyan(),
            console::style(name).bold(),
            console::style(description).dim()
        ))?;
    }
    term.blank()?;

    loop {
        let choice: String = term.ask("Select configuration type (1-3)", Some("1"))?;
        match choice.parse::<usize>() {
            Ok(1) => break,
            Ok(2) => {
                if crate::catalog::advanced_settings(mode).is_empty() {
                    term.say(
                        console::style("Advanced configuration is not yet implemented.").yellow(),
                    )?;
                    term.say(console::style("Falling back to basic configuration...").cyan())?;
                    term.blank()?;
                }
                break;
            }
            Ok(3) => {
                term.say(
                    console::style("Skipping configuration - server will use default settings.")
                        .cyan(),
                )?;
                return Ok(None);
            }
            Ok(_) => term.say(console::style("Invalid choice. Please select 1-3.").red())?,
            Err(_) => term.say(console::style("Invalid input. Please enter a number.").red())?,
        }
    }

    if crate::catalog::basic_settings(mode).is_empty() {
        term.say(
            console::style(format!("No configuration settings found for {}", mode.name)).red(),
        )?;
        return Ok(None);
    }

    screen(term, "Basic Configuration")?;
    match crate::server_config::basic_configuration(term, mode, build_dir) {
        Ok(path) => {
            term.blank()?;
            term.say(
                console::style(format!(
                    "✓ Configuration saved to: {}",
                    path.to_string_lossy()
                ))
                .green(),
            )?;
            return Ok(Some(path));
        }
        Err(crate::server_config::Error::Tty(err)) => return Err(err),
        Err(err) => {
            log::error!(
                "Failed to save configuration: {}",
                crate::util::aggregate_error_tree(&err, 2).trim_end()
            );
            term.say(console::style(format!("✗ Failed to save configuration: {err}")).red())?;
            return Ok(None);
        }
    }
}

fn show_completion<R: std::io::BufRead, W: std::io::Write>(
    term: &mut Terminal<R, W>,
    server_name: &str,
    config_file: Option<&std::path::Path>,
) -> Result<(), crate::tty::Error> {
    screen(term, "✓ Installation Complete!")?;
    term.say(format!("  Server:   {}", console::style(server_name).bold()))?;
    term.say(format!(
        "  Location: {}",
        console::style(format!("./{server_name}/{}/", crate::constants::DIR_NAME_BUILD)).bold()
    ))?;
    let config_name: String = match config_file.and_then(|n| n.file_name()) {
        Some(n) => n.to_string_lossy().into_owned(),
        None => "your_config.cfg".to_string(),
    };
    if config_file.is_some() {
        term.say(format!("  Config:   {}", console::style(&config_name).bold()))?;
    }
    term.blank()?;
    term.say(console::style("To start your server:").cyan())?;
    term.say(format!(
        "  cd {server_name}/{}",
        crate::constants::DIR_NAME_BUILD
    ))?;
    term.say(format!("  ./<server binary> -f {config_name}"))?;
    term.blank()?;
    term.say(console::style("Enjoy your Teeworlds server!").cyan())?;
    return Ok(());
}

/// The whole run. `Ok(Some(_))` is a finished build, `Ok(None)` an aborted
/// one. `make_runner` receives the final verbosity once the user chose it.
pub fn run<R, W, P, E, F>(
    term: &mut Terminal<R, W>,
    mut session: Session,
    config: &crate::config::Config,
    logger: Option<&crate::logging::Logger>,
    preflight: &P,
    make_runner: F,
) -> Result<Option<std::path::PathBuf>, crate::error::Error>
where
    R: std::io::BufRead,
    W: std::io::Write,
    P: Preflight,
    E: Exec,
    F: FnOnce(bool) -> E,
{
    let request: BuildRequest = collect_request(term)?;

    session.verbose = step_verbose(term, session.verbose)?;
    if session.verbose {
        if let Some(logger) = logger {
            if let Err(err) = logger.set_level(log::LevelFilter::Debug) {
                log::warn!("Cannot raise log level: {err}");
            }
        }
    }

    if !step_confirm(term, &session, &request, preflight, config)? {
        return Ok(None);
    }

    let server_name: String = request.server_name.clone();
    let mode: &'static GameMode = request.mode;
    let mut runner: E = make_runner(session.verbose);
    let build_dir: std::path::PathBuf = match execute(term, &mut runner, &session, request, config)? {
        Some(n) => n,
        None => {
            term.blank()?;
            term.say(console::style("Build failed. Please check the errors above.").red())?;
            return Ok(None);
        }
    };

    screen(term, "✓ BUILD COMPLETE!")?;
    term.say(format!(
        "Server build finished in: {}",
        console::style(format!("./{server_name}")).bold()
    ))?;
    term.blank()?;
    term.pause("Press Enter to configure server...")?;

    let config_file: Option<std::path::PathBuf> = configure_server(term, mode, &build_dir)?;
    show_completion(term, &server_name, config_file.as_deref())?;
    return Ok(Some(build_dir));
}

#[cfg(test)]
mod tests {
    use super::*;

    type Scripted = Terminal<std::io::Cursor<Vec<u8>>, Vec<u8>>;

    fn scripted(input: &str) -> Scripted {
        return Terminal::new(std::io::Cursor::new(input.as_bytes().to_vec()), Vec::new());
    }

    fn output(term: Scripted) -> String {
        return String::from_utf8(term.into_output()).unwrap();
    }

    fn mode(name: &str) -> &'static GameMode {
        return crate::catalog::mode_by_name(name).unwrap();
    }

    fn session(package_manager: PackageManager, privileged: bool, base_dir: &std::path::Path) -> Session {
        return Session {
            host: Host {
                package_manager,
                privileged,
                cpu_count: 4,
            },
            base_dir: base_dir.to_path_buf(),
            verbose: false,
        };
    }

    struct FakePreflight {
        free_mb: u64,
        cached: bool,
        granted: bool,
    }

    impl Preflight for FakePreflight {
        fn free_disk_space_mb(&self, _: &std::path::Path) -> Result<u64, crate::system::Error> {
            return Ok(self.free_mb);
        }
        fn has_cached_elevation(&self) -> bool {
            return self.cached;
        }
        fn request_elevation(&self) -> bool {
            return self.granted;
        }
    }

    struct NoExec {
        calls: usize,
    }

    impl Exec for NoExec {
        fn run(&mut self, _: &str, _: &[String]) -> crate::proc::Outcome {
            self.calls += 1;
            return crate::proc::Outcome::failed("not expected to run");
        }
    }

    #[test]
    fn test_server_name_validation() {
        let longest: String = "x".repeat(64);
        let too_long: String = "x".repeat(65);
        for name in ["a", "myserver", "My_Server-2", longest.as_str()] {
            assert!(validate_server_name(name), "{name}");
        }
        for name in [
            "",
            "..",
            "a..b",
            "a/b",
            "a\\b",
            "/abs",
            "with space",
            "ünï",
            "semi;colon",
            "dot.name",
            too_long.as_str(),
        ] {
            assert!(!validate_server_name(name), "{name}");
        }
    }

    #[test]
    fn test_server_name_reprompts_until_valid() {
        let mut term: Scripted = scripted("../etc\n\nmyserver\n");
        assert_eq!(step_server_name(&mut term).unwrap(), "myserver");
        assert!(output(term).contains(crate::text::NAME_RULES));
    }

    #[test]
    fn test_game_mode_reprompts_until_in_range() {
        let mut term: Scripted = scripted("0\n\nfour\n\n2\n");
        assert_eq!(step_game_mode(&mut term).unwrap().name, "DDNet");
        assert_eq!(
            output(term).matches("Invalid choice. Please try again.").count(),
            2
        );
    }

    #[test]
    fn test_build_options_declined_uses_defaults() {
        let mut term: Scripted = scripted("\n");
        let plan: BuildPlan = step_build_options(&mut term, mode("Teeworlds")).unwrap();
        assert_eq!(plan, BuildPlan::defaults(mode("Teeworlds")));
    }

    #[test]
    fn test_build_options_customized() {
        let mut term: Scripted =
            scripted("y\n-DMYSQL=maybe\n\n-DNOPE=ON\n\n-DMYSQL=on\n-GNinja\ndone\n");
        let plan: BuildPlan = step_build_options(&mut term, mode("DDNet")).unwrap();
        assert!(plan.use_ninja);
        assert_eq!(
            plan.cmake_args,
            vec![
                "cmake",
                "../source/",
                "-DCLIENT=OFF",
                "-DSERVER=ON",
                "-DMYSQL=ON",
                "-GNinja"
            ]
        );
        let printed: String = output(term);
        assert!(printed.contains("Invalid boolean value for -DMYSQL"));
        assert!(printed.contains("Warning: -DNOPE is not in the standard options list"));
    }

    #[test]
    fn test_build_options_opened_without_changes() {
        let mut term: Scripted = scripted("y\ndone\n\n");
        let plan: BuildPlan = step_build_options(&mut term, mode("zCatch")).unwrap();
        assert_eq!(plan, BuildPlan::defaults(mode("zCatch")));
        assert!(output(term).contains("No changes made, using defaults"));
    }

    #[test]
    fn test_confirm_aborts_on_low_disk_space() {
        let dir: tempfile::TempDir = tempfile::tempdir().unwrap();
        let request: BuildRequest = BuildRequest {
            server_name: "myserver".into(),
            mode: mode("Teeworlds"),
            plan: BuildPlan::defaults(mode("Teeworlds")),
        };
        let preflight: FakePreflight = FakePreflight {
            free_mb: 100,
            cached: true,
            granted: true,
        };
        let mut term: Scripted = scripted("\n");
        let proceed: bool = step_confirm(
            &mut term,
            &session(PackageManager::Apt, false, dir.path()),
            &request,
            &preflight,
            &crate::config::Config::default(),
        )
        .unwrap();
        assert!(!proceed);
        let printed: String = output(term);
        assert!(printed.contains("Required: 2000MB, Available: 100MB"));
        assert!(printed.contains("Package Manager:"));
    }

    #[test]
    fn test_confirm_requires_elevation_grant() {
        let dir: tempfile::TempDir = tempfile::tempdir().unwrap();
        let request: BuildRequest = BuildRequest {
            server_name: "myserver".into(),
            mode: mode("Teeworlds"),
            plan: BuildPlan::defaults(mode("Teeworlds")),
        };
        let denied: FakePreflight = FakePreflight {
            free_mb: 50_000,
            cached: false,
            granted: false,
        };
        let mut term: Scripted = scripted("\n");
        let user: Session = session(PackageManager::Apt, false, dir.path());
        let config: crate::config::Config = crate::config::Config::default();
        assert!(!step_confirm(&mut term, &user, &request, &denied, &config).unwrap());
        assert!(output(term).contains("✗ Authentication failed"));

        let granted: FakePreflight = FakePreflight {
            free_mb: 50_000,
            cached: false,
            granted: true,
        };
        let mut term: Scripted = scripted("\n");
        assert!(step_confirm(&mut term, &user, &request, &granted, &config).unwrap());

        let mut term: Scripted = scripted("n\n");
        let root: Session = session(PackageManager::Apt, true, dir.path());
        assert!(!step_confirm(&mut term, &root, &request, &denied, &config).unwrap());
        assert!(output(term).contains("✓ Running as root"));
    }

    #[test]
    fn test_unknown_package_manager_declined_aborts_before_any_command() {
        let dir: tempfile::TempDir = tempfile::tempdir().unwrap();
        let request: BuildRequest = BuildRequest {
            server_name: "myserver".into(),
            mode: mode("zCatch"),
            plan: BuildPlan::defaults(mode("zCatch")),
        };
        let mut runner: NoExec = NoExec { calls: 0 };
        let mut term: Scripted = scripted("n\n");
        let result: Option<std::path::PathBuf> = execute(
            &mut term,
            &mut runner,
            &session(PackageManager::Unknown, false, dir.path()),
            request,
            &crate::config::Config::default(),
        )
        .unwrap();
        assert_eq!(result, None);
        assert_eq!(runner.calls, 0);
        assert!(output(term).contains("Example (APT): build-essential cmake"));
        assert!(!dir.path().join("myserver").exists());
    }

    #[test]
    fn test_failed_install_aborts_build() {
        let dir: tempfile::TempDir = tempfile::tempdir().unwrap();
        let request: BuildRequest = BuildRequest {
            server_name: "myserver".into(),
            mode: mode("Teeworlds"),
            plan: BuildPlan::defaults(mode("Teeworlds")),
        };
        let mut runner: NoExec = NoExec { calls: 0 };
        let mut term: Scripted = scripted("\n");
        let result: Option<std::path::PathBuf> = execute(
            &mut term,
            &mut runner,
            &session(PackageManager::Dnf, true, dir.path()),
            request,
            &crate::config::Config::default(),
        )
        .unwrap();
        assert_eq!(result, None);
        assert_eq!(runner.calls, 1);
        assert!(output(term).contains("Failed to install dependencies"));
    }

    #[test]
    fn test_basic_configuration_written_to_build_dir() {
        let dir: tempfile::TempDir = tempfile::tempdir().unwrap();
        let mut term: Scripted = scripted("1\nX\n\n\n\n\n");
        let written: Option<std::path::PathBuf> =
            configure_server(&mut term, mode("Teeworlds"), dir.path()).unwrap();
        assert_eq!(written, Some(dir.path().join("basic_config.cfg")));
        let content: String = std::fs::read_to_string(dir.path().join("basic_config.cfg")).unwrap();
        assert!(content.contains("// Game Mode: Teeworlds\n"));
        assert!(content.contains("sv_name \"X\"\n"));
        assert!(content.contains("sv_port 8303\n"));
        assert!(content.contains("sv_max_clients 16\n"));
        assert!(content.contains("sv_gametype \"dm\"\n"));
    }

    #[test]
    fn test_advanced_configuration_falls_back_to_basic() {
        let dir: tempfile::TempDir = tempfile::tempdir().unwrap();
        let mut term: Scripted = scripted("7\nabc\n2\n\n\n\n\n\n");
        let written: Option<std::path::PathBuf> =
            configure_server(&mut term, mode("DDNet"), dir.path()).unwrap();
        assert!(written.is_some());
        let printed: String = output(term);
        assert!(printed.contains("Invalid choice. Please select 1-3."));
        assert!(printed.contains("Invalid input. Please enter a number."));
        assert!(printed.contains("Advanced configuration is not yet implemented."));
    }

    #[test]
    fn test_skip_configuration_writes_nothing() {
        let dir: tempfile::TempDir = tempfile::tempdir().unwrap();
        let mut term: Scripted = scripted("3\n");
        assert_eq!(
            configure_server(&mut term, mode("zCatch"), dir.path()).unwrap(),
            None
        );
        assert!(!dir.path().join("basic_config.cfg").exists());
    }

    #[test]
    fn test_failed_write_is_reported_not_fatal() {
        let dir: tempfile::TempDir = tempfile::tempdir().unwrap();
        let missing: std::path::PathBuf = dir.path().join("not-built");
        let mut term: Scripted = scripted("1\n\n\n\n\n\n");
        assert_eq!(
            configure_server(&mut term, mode("zCatch"), &missing).unwrap(),
            None
        );
        assert!(output(term).contains("✗ Failed to save configuration"));
    }

    #[test]
    fn test_non_utf8_name_is_reprompted() {
        let mut term: Scripted = Terminal::new(
            std::io::Cursor::new(b"caf\xe9\n\nmyserver\n".to_vec()),
            Vec::new(),
        );
        assert_eq!(step_server_name(&mut term).unwrap(), "myserver");
        assert!(output(term).contains(crate::text::NAME_RULES));
    }

    #[test]
    fn test_full_run_with_detailed_logs() {
        let _lock = crate::system::CWD_LOCK.lock().unwrap_or_else(|n| n.into_inner());
        let dir: tempfile::TempDir = tempfile::tempdir().unwrap();
        let before: std::path::PathBuf = std::env::current_dir().unwrap();
        let logger: crate::logging::Logger =
            crate::logging::Logger::init(log::LevelFilter::Info).unwrap();
        let preflight: FakePreflight = FakePreflight {
            free_mb: 50_000,
            cached: false,
            granted: false,
        };
        let runner_verbose: std::cell::Cell<Option<bool>> = std::cell::Cell::new(None);

        // name, mode, no customization, detailed logs, start, continue,
        // basic config with defaults, confirm
        let mut term: Scripted = scripted("myserver\n1\n\ny\n\n\n1\n\n\n\n\n\n");
        let result: Option<std::path::PathBuf> = run(
            &mut term,
            session(PackageManager::Apt, true, dir.path()),
            &crate::config::Config::default(),
            Some(&logger),
            &preflight,
            |verbose| {
                runner_verbose.set(Some(verbose));
                crate::pipeline::tests::Recorder::new()
            },
        )
        .unwrap();

        let build_dir: std::path::PathBuf = dir.path().join("myserver").join("server");
        assert_eq!(result, Some(build_dir.clone()));
        assert_eq!(runner_verbose.get(), Some(true));
        assert_eq!(log::max_level(), log::LevelFilter::Debug);
        assert!(dir.path().join("myserver").join("source").join(".git").is_dir());
        let content: String = std::fs::read_to_string(build_dir.join("basic_config.cfg")).unwrap();
        assert!(content.contains("sv_name \"My Teeworlds Server\"\n"));
        assert_eq!(std::env::current_dir().unwrap(), before);

        let printed: String = output(term);
        assert!(printed.contains("✓ Running as root"));
        assert!(printed.contains("BUILD COMPLETE!"));
        assert!(printed.contains("Installation Complete!"));
    }

    #[test]
    fn test_closed_input_propagates() {
        let mut term: Scripted = scripted("myserver\n");
        match collect_request(&mut term) {
            Err(crate::tty::Error::InputClosed) => {}
            _ => panic!("expected error InputClosed"),
        }
    }
}
