//! The build itself: install system packages, clone the sources, configure
//! with CMake and compile. Each stage runs only if the previous one
//! succeeded.

use crate::catalog::{GameMode, PackageManager};
use crate::options::BuildPlan;
use crate::proc::{Exec, Outcome};
use crate::system::WorkingDir;

#[derive(Debug)]
pub enum Error {
    /// An external command failed. Contains the stage description and the
    /// command's standard error.
    Stage((String, String)),
    /// Clone reported success but left no repository behind.
    NotCloned(std::path::PathBuf),
    CreateDir((std::path::PathBuf, std::io::Error)),
    System(crate::system::Error),
}
impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Stage(_) => None,
            Error::NotCloned(_) => None,
            Error::CreateDir((_, err)) => Some(err),
            Error::System(err) => Some(err),
        }
    }
}
impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Stage((stage, _)) => write!(f, "{stage} failed"),
            Error::NotCloned(dir) => write!(
                f,
                "git repository not properly cloned into {}",
                dir.to_string_lossy()
            ),
            Error::CreateDir((dir, _)) => {
                write!(f, "failed to create directory {}", dir.to_string_lossy())
            }
            Error::System(_) => write!(f, "cannot run build stage"),
        }
    }
}
impl From<crate::system::Error> for Error {
    fn from(value: crate::system::Error) -> Self {
        Self::System(value)
    }
}

/// Facts about the host that shape the commands.
#[derive(Debug, Clone, Copy)]
pub struct Host {
    pub package_manager: PackageManager,
    pub privileged: bool,
    pub cpu_count: usize,
}

impl Host {
    pub fn detect() -> Self {
        return Self {
            package_manager: crate::system::detect_package_manager(),
            privileged: crate::system::is_privileged(),
            cpu_count: crate::system::cpu_count(),
        };
    }
}

/// Directories of one server build: `<name>/source` for the clone and
/// `<name>/server` for the build output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub root: std::path::PathBuf,
    pub source: std::path::PathBuf,
    pub build: std::path::PathBuf,
}

impl Layout {
    pub fn new(base_dir: &std::path::Path, server_name: &str) -> Self {
        let root: std::path::PathBuf = base_dir.join(server_name);
        return Self {
            source: root.join(crate::constants::DIR_NAME_SOURCE),
            build: root.join(crate::constants::DIR_NAME_BUILD),
            root,
        };
    }

    pub fn create(&self) -> Result<(), Error> {
        for dir in [&self.source, &self.build] {
            std::fs::create_dir_all(dir).map_err(|err| Error::CreateDir((dir.clone(), err)))?;
            log::debug!("Created {}", dir.to_string_lossy());
        }
        return Ok(());
    }
}

fn split_packages(packages: &str) -> impl Iterator<Item = String> + '_ {
    return packages.split_whitespace().map(|n| n.to_string());
}

/// Full install command for the host's package manager, escalated with
/// `sudo` unless already privileged. `None` if the manager is unknown.
pub fn install_command(host: &Host, mode: &GameMode, use_ninja: bool) -> Option<Vec<String>> {
    let manager: PackageManager = host.package_manager;
    let install_args: &[&str] = manager.install_args()?;
    let base: &str = crate::catalog::BASE_PACKAGES.for_manager(manager)?;
    let specific: &str = mode.packages.for_manager(manager)?;

    let mut argv: Vec<String> = Vec::new();
    if !host.privileged {
        argv.push(crate::constants::EXECUTABLE_SUDO.to_string());
    }
    argv.push(manager.executable().to_string());
    argv.extend(install_args.iter().map(|n| n.to_string()));
    argv.extend(split_packages(base));
    argv.extend(split_packages(specific));
    if use_ninja {
        argv.push(manager.ninja_package().to_string());
    }
    return Some(argv);
}

/// Packages to install by hand when no supported package manager is found,
/// named as on APT based systems.
pub fn manual_install_hint(mode: &GameMode, use_ninja: bool) -> String {
    let mut packages: Vec<String> = split_packages(crate::catalog::BASE_PACKAGES.apt)
        .chain(split_packages(mode.packages.apt))
        .collect::<Vec<String>>();
    if use_ninja {
        packages.push(PackageManager::Apt.ninja_package().to_string());
    }
    return packages.join(" ");
}

pub fn clone_command(mode: &GameMode) -> Vec<String> {
    return vec![
        "git".to_string(),
        "clone".to_string(),
        "--recursive".to_string(),
        mode.url.to_string(),
        ".".to_string(),
    ];
}

/// Number of parallel `make` jobs: one per CPU, at most `max_jobs`.
///
/// ```rust
/// assert_eq!(teemake::pipeline::build_jobs(64, 16), 16);
/// assert_eq!(teemake::pipeline::build_jobs(4, 16), 4);
/// assert_eq!(teemake::pipeline::build_jobs(0, 16), 1);
/// ```
pub fn build_jobs(cpu_count: usize, max_jobs: usize) -> usize {
    return cpu_count.min(max_jobs).max(1);
}

pub fn compile_command(use_ninja: bool, jobs: usize) -> Vec<String> {
    if use_ninja {
        return vec!["ninja".to_string()];
    }
    return vec!["make".to_string(), format!("-j{jobs}")];
}

/// Runs the stages for one selected mode and plan.
pub struct Pipeline<'run, E: Exec> {
    runner: &'run mut E,
    mode: &'static GameMode,
    plan: BuildPlan,
    host: Host,
    max_jobs: usize,
}

impl<'run, E: Exec> Pipeline<'run, E> {
    pub fn new(
        runner: &'run mut E,
        mode: &'static GameMode,
        plan: BuildPlan,
        host: Host,
        max_jobs: usize,
    ) -> Self {
        return Self {
            runner,
            mode,
            plan,
            host,
            max_jobs,
        };
    }

    fn stage(&mut self, description: String, argv: &[String]) -> Result<(), Error> {
        let outcome: Outcome = self.runner.run(&description, argv);
        if !outcome.success {
            log::error!("{description} failed");
            return Err(Error::Stage((description, outcome.stderr)));
        }
        return Ok(());
    }

    /// Install base, mode and optionally Ninja packages in one command.
    /// Must not be called for an unknown package manager.
    pub fn install_dependencies(&mut self) -> Result<(), Error> {
        let description: String = format!(
            "Installing dependencies for {}{}",
            self.mode.name,
            if self.plan.use_ninja { " with Ninja" } else { "" }
        );
        let argv: Vec<String> = match install_command(&self.host, self.mode, self.plan.use_ninja)
        {
            Some(n) => n,
            None => {
                return Err(Error::Stage((
                    description,
                    format!("unsupported package manager: {}", self.host.package_manager),
                )))
            }
        };
        return self.stage(description, &argv);
    }

    /// Clone, configure and compile inside `layout`, returning the build
    /// directory. The working directory is the same afterwards as before,
    /// whatever the outcome.
    pub fn build(&mut self, layout: &Layout) -> Result<std::path::PathBuf, Error> {
        layout.create()?;
        log::debug!("Source path: {}", layout.source.to_string_lossy());
        log::debug!("Build path: {}", layout.build.to_string_lossy());

        {
            let _cwd: WorkingDir = WorkingDir::enter(&layout.source)?;
            self.stage(format!("Downloading {}", self.mode.name), &clone_command(self.mode))?;
        }
        if !layout.source.join(".git").exists() {
            log::error!("Git repository not properly cloned");
            return Err(Error::NotCloned(layout.source.clone()));
        }
        println!("{}", console::style("✓ Repository validated").green());

        {
            let _cwd: WorkingDir = WorkingDir::enter(&layout.build)?;
            let cmake_args: Vec<String> = self.plan.cmake_args.clone();
            self.stage("Initializing build system".to_string(), &cmake_args)?;
        }

        {
            let _cwd: WorkingDir = WorkingDir::enter(&layout.build)?;
            let jobs: usize = build_jobs(self.host.cpu_count, self.max_jobs);
            let description: String = if self.plan.use_ninja {
                "Compiling binary with Ninja".to_string()
            } else {
                format!("Compiling binary (using {jobs} cores)")
            };
            self.stage(description, &compile_command(self.plan.use_ninja, jobs))?;
        }

        return Ok(layout.build.clone());
    }
}
