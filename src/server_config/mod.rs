//! The game server's own configuration file written after a build: value
//! validation, serialization, and the interactive collection of values.

use crate::catalog::{ConfigSetting, GameMode};

/// Keys whose values are written unquoted.
pub static NUMERIC_KEYS: [&str; 2] = ["sv_port", "sv_max_clients"];

#[derive(Debug)]
pub enum Error {
    Write((std::path::PathBuf, std::io::Error)),
    Tty(crate::tty::Error),
}
impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Write((_, err)) => Some(err),
            Error::Tty(err) => Some(err),
        }
    }
}
impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Write((path, _)) => write!(f, "cannot write {}", path.to_string_lossy()),
            Error::Tty(_) => write!(f, "cannot collect configuration values"),
        }
    }
}
impl From<crate::tty::Error> for Error {
    fn from(value: crate::tty::Error) -> Self {
        Self::Tty(value)
    }
}

/// Check a value entered for `key`. Only the port and the player cap are
/// range checked, everything else is accepted as is.
///
/// ```rust
/// assert!(teemake::server_config::validate("sv_port", "8303").is_ok());
/// assert!(teemake::server_config::validate("sv_port", "80").is_err());
/// assert!(teemake::server_config::validate("sv_name", "").is_ok());
/// ```
pub fn validate(key: &str, value: &str) -> Result<(), String> {
    match key {
        "sv_port" => return validate_range(value, 1024, 65535, "Port"),
        "sv_max_clients" => return validate_range(value, 1, 256, "Max clients"),
        _ => return Ok(()),
    }
}

fn validate_range(value: &str, min: i64, max: i64, what: &str) -> Result<(), String> {
    let number: i64 = match value.trim().parse::<i64>() {
        Ok(n) => n,
        Err(_) => return Err(format!("{what} must be a valid number")),
    };
    if number < min || number > max {
        return Err(format!("{what} must be between {min} and {max}"));
    }
    return Ok(());
}

/// Backslash-escape `\` and `"` so a value stays one quoted console
/// argument.
///
/// ```rust
/// assert_eq!(teemake::server_config::escape(r#"a"b\c"#), r#"a\"b\\c"#);
/// ```
pub fn escape(value: &str) -> String {
    let mut escaped: String = String::with_capacity(value.len());
    for c in value.chars() {
        if c == '\\' || c == '"' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    return escaped;
}

/// Serialize settings in order, numeric keys unquoted, after a comment
/// header naming the generator and the game mode.
pub fn render(mode_name: &str, entries: &[(String, String)]) -> String {
    let mut rendered: String = String::new();
    rendered.push_str("// Teeworlds Server Configuration\n");
    rendered.push_str(&format!("// Generated by {}\n", crate::text::INFOTEXT));
    rendered.push_str(&format!("// Game Mode: {mode_name}\n"));
    rendered.push('\n');
    for (key, value) in entries {
        if NUMERIC_KEYS.contains(&key.as_str()) {
            rendered.push_str(&format!("{key} {}\n", value.trim()));
        } else {
            rendered.push_str(&format!("{key} \"{}\"\n", escape(value)));
        }
    }
    return rendered;
}

/// Write the rendered settings to `file_name` inside `dir`.
pub fn write(
    dir: &std::path::Path,
    file_name: &str,
    mode_name: &str,
    entries: &[(String, String)],
) -> Result<std::path::PathBuf, Error> {
    let path: std::path::PathBuf = dir.join(file_name);
    std::fs::write(&path, render(mode_name, entries))
        .map_err(|err| Error::Write((path.clone(), err)))?;
    log::info!("Configuration saved to {}", path.to_string_lossy());
    return Ok(path);
}

/// Prompt for every setting until each passes validation, then show a
/// summary and ask for confirmation; start over if it is declined.
pub fn collect<R: std::io::BufRead, W: std::io::Write>(
    term: &mut crate::tty::Terminal<R, W>,
    settings: &[ConfigSetting],
) -> Result<Vec<(String, String)>, crate::tty::Error> {
    loop {
        term.say(console::style("Enter configuration values:").cyan())?;
        term.blank()?;
        let mut entries: Vec<(String, String)> = Vec::with_capacity(settings.len());
        for setting in settings {
            loop {
                if !setting.description.is_empty() {
                    term.say(format!("  {}", console::style(setting.description).dim()))?;
                }
                let value: String = term.ask(setting.prompt, Some(setting.default))?;
                match validate(setting.key, &value) {
                    Ok(()) => {
                        entries.push((setting.key.to_string(), value));
                        break;
                    }
                    Err(reason) => term.say(console::style(reason).red())?,
                }
            }
            term.blank()?;
        }

        term.say(console::style("Configuration Summary:").cyan().bold())?;
        term.blank()?;
        for (setting, (_, value)) in settings.iter().zip(entries.iter()) {
            term.say(format!(
                "  {:<20} {}",
                console::style(setting.prompt).bold(),
                console::style(value).cyan()
            ))?;
        }
        term.blank()?;

        if term.confirm("Are these values correct?", Some(true))? {
            return Ok(entries);
        }
        term.say(console::style("Let's re-enter the configuration...").cyan())?;
        term.blank()?;
    }
}

/// Collect the mode's basic settings and save them as
/// `basic_config.cfg` in `build_dir`.
pub fn basic_configuration<R: std::io::BufRead, W: std::io::Write>(
    term: &mut crate::tty::Terminal<R, W>,
    mode: &GameMode,
    build_dir: &std::path::Path,
) -> Result<std::path::PathBuf, Error> {
    let entries: Vec<(String, String)> = collect(term, crate::catalog::basic_settings(mode))?;
    return write(
        build_dir,
        crate::constants::FILE_NAME_BASIC_CONFIG,
        mode.name,
        &entries,
    );
}
