//! Running external commands: one at a time, with a hard timeout, captured
//! output, and either a spinner or live output for the user.

/// Result of running one external command. Launch failures and timeouts are
/// reported here too, never as a separate error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl Outcome {
    pub fn failed(stderr: impl Into<String>) -> Self {
        return Self {
            success: false,
            stdout: String::new(),
            stderr: stderr.into(),
        };
    }
}

pub trait Exec {
    /// Run `argv` (program first) in the current working directory.
    /// `description` names the step to the user.
    fn run(&mut self, description: &str, argv: &[String]) -> Outcome;
}

/// [`Exec`] implementation that spawns real processes.
pub struct Runner {
    verbose: bool,
    timeout: std::time::Duration,
}

impl Runner {
    pub fn new(verbose: bool, timeout: std::time::Duration) -> Self {
        return Self { verbose, timeout };
    }

    fn spinner(&self, description: &str) -> indicatif::ProgressBar {
        let spinner: indicatif::ProgressBar = indicatif::ProgressBar::new_spinner();
        if let Ok(style) = indicatif::ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "✓"])
            .template("{spinner:.cyan} {msg} [{elapsed_precise}]")
        {
            spinner.set_style(style);
        }
        spinner.set_message(description.to_string());
        spinner.enable_steady_tick(std::time::Duration::from_millis(100));
        return spinner;
    }
}

impl Exec for Runner {
    fn run(&mut self, description: &str, argv: &[String]) -> Outcome {
        log::debug!("Running command: {}", argv.join(" "));

        let spinner: Option<indicatif::ProgressBar> = if self.verbose {
            println!("\n{} {}", console::style("ℹ").cyan(), description);
            println!("{}\n", console::style(format!("Running: {}", argv.join(" "))).dim());
            None
        } else {
            Some(self.spinner(description))
        };

        let outcome: Outcome = spawn_and_wait(argv, self.timeout, self.verbose);

        if let Some(spinner) = spinner {
            spinner.finish_and_clear();
        }

        if outcome.success {
            println!("{}", console::style(format!("✓ {description}")).green());
        } else {
            println!("{}", console::style(format!("✗ {description}")).red());
            if !self.verbose {
                let tail: Vec<&str> = crate::util::tail_lines(
                    &outcome.stderr,
                    crate::constants::STDERR_TAIL_LINES,
                );
                if !tail.is_empty() {
                    println!("\n{}", console::style("Error output:").red());
                    for line in tail {
                        println!("  {}", console::style(line).dim());
                    }
                }
            }
        }

        return outcome;
    }
}

/// Spawn `argv` with piped output and wait at most `timeout` for it to exit.
/// With `echo`, output lines are printed as they arrive.
pub fn spawn_and_wait(argv: &[String], timeout: std::time::Duration, echo: bool) -> Outcome {
    let (program, args): (&String, &[String]) = match argv.split_first() {
        Some(n) => n,
        None => return Outcome::failed("empty command"),
    };

    let mut command: std::process::Command = std::process::Command::new(program);
    command.args(args);
    command.stdin(std::process::Stdio::null());
    command.stdout(std::process::Stdio::piped());
    command.stderr(std::process::Stdio::piped());

    let mut child: std::process::Child = match command.spawn() {
        Ok(n) => n,
        Err(err) => {
            log::debug!("Could not launch {program}: {err}");
            return Outcome::failed(err.to_string());
        }
    };

    let (stdout_thread, stderr_thread): (
        std::thread::JoinHandle<String>,
        std::thread::JoinHandle<String>,
    ) = collect_child_output(&mut child, echo);

    let status: Option<std::process::ExitStatus> =
        match wait_timeout::ChildExt::wait_timeout(&mut child, timeout) {
            Ok(n) => n,
            Err(err) => {
                let _ = child.kill();
                let _ = child.wait();
                return Outcome::failed(err.to_string());
            }
        };

    let status: std::process::ExitStatus = match status {
        Some(n) => n,
        None => {
            let _ = child.kill();
            let _ = child.wait();
            // Grandchildren may still hold the pipes open: leave the readers
            // detached instead of joining them.
            drop(stdout_thread);
            drop(stderr_thread);
            log::warn!("{program} timed out after {} seconds", timeout.as_secs());
            return Outcome::failed(format!(
                "Command timed out after {} seconds",
                timeout.as_secs()
            ));
        }
    };

    let stdout: String = stdout_thread.join().unwrap_or_default();
    let stderr: String = stderr_thread.join().unwrap_or_default();
    log::debug!("{program} exited with {status}");

    return Outcome {
        success: status.success(),
        stdout,
        stderr,
    };
}

/// Read the child's piped output line by line on two threads, trace logging
/// every line. The threads yield the accumulated output once the streams
/// close.
fn collect_child_output(
    child: &mut std::process::Child,
    echo: bool,
) -> (
    std::thread::JoinHandle<String>,
    std::thread::JoinHandle<String>,
) {
    let stdout: Option<std::process::ChildStdout> = child.stdout.take();
    let stderr: Option<std::process::ChildStderr> = child.stderr.take();

    let stdout_thread: std::thread::JoinHandle<String> = std::thread::spawn(move || {
        let mut output: String = String::new();
        if let Some(out) = stdout {
            let reader: std::io::BufReader<std::process::ChildStdout> =
                std::io::BufReader::new(out);
            for line in std::io::BufRead::lines(reader).map_while(Result::ok) {
                log::trace!("{line}");
                if echo {
                    println!("{line}");
                }
                output.push_str(&line);
                output.push('\n');
            }
        }
        return output;
    });

    let stderr_thread: std::thread::JoinHandle<String> = std::thread::spawn(move || {
        let mut output: String = String::new();
        if let Some(err) = stderr {
            let reader: std::io::BufReader<std::process::ChildStderr> =
                std::io::BufReader::new(err);
            for line in std::io::BufRead::lines(reader).map_while(Result::ok) {
                log::trace!("{line}");
                if echo {
                    eprintln!("{}", console::style(&line).yellow());
                }
                output.push_str(&line);
                output.push('\n');
            }
        }
        return output;
    });

    return (stdout_thread, stderr_thread);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        return args.iter().map(|n| n.to_string()).collect();
    }

    #[test]
    fn test_captures_output_and_status() {
        let outcome: Outcome = spawn_and_wait(
            &argv(&["sh", "-c", "echo out; echo err >&2"]),
            std::time::Duration::from_secs(10),
            false,
        );
        assert!(outcome.success);
        assert_eq!(outcome.stdout, "out\n");
        assert_eq!(outcome.stderr, "err\n");
    }

    #[test]
    fn test_nonzero_exit_is_failure() {
        let outcome: Outcome = spawn_and_wait(
            &argv(&["sh", "-c", "exit 3"]),
            std::time::Duration::from_secs(10),
            false,
        );
        assert!(!outcome.success);
    }

    #[test]
    fn test_launch_failure_is_captured() {
        let outcome: Outcome = spawn_and_wait(
            &argv(&["teemake-no-such-program-for-sure"]),
            std::time::Duration::from_secs(10),
            false,
        );
        assert!(!outcome.success);
        assert!(!outcome.stderr.is_empty());
    }

    #[test]
    fn test_timeout_kills_child() {
        let started: std::time::Instant = std::time::Instant::now();
        let outcome: Outcome = spawn_and_wait(
            &argv(&["sleep", "30"]),
            std::time::Duration::from_secs(1),
            false,
        );
        assert!(!outcome.success);
        assert_eq!(outcome.stderr, "Command timed out after 1 seconds");
        assert!(started.elapsed() < std::time::Duration::from_secs(20));
    }

    #[test]
    fn test_empty_command() {
        let outcome: Outcome = spawn_and_wait(&[], std::time::Duration::from_secs(1), false);
        assert_eq!(outcome, Outcome::failed("empty command"));
    }
}
