//! Customization of a game mode's CMake options through free-text commands
//! such as `1=ON`, `-DMYSQL=ON`, `-GNinja` or `done`, and derivation of the
//! final CMake command line from the result.

use crate::catalog::{BuildOption, GameMode, OptionKind};
use crate::constants::{FALSY_TOKENS, FLAG_CLIENT, FLAG_NINJA, FLAG_SERVER, TRUTHY_TOKENS};

/// Finalized build configuration, consumed once by the build pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildPlan {
    /// Complete CMake command line, starting with `cmake`.
    pub cmake_args: Vec<String>,
    pub use_ninja: bool,
}

impl BuildPlan {
    /// The mode's declared defaults, untouched.
    pub fn defaults(mode: &GameMode) -> Self {
        return Self {
            cmake_args: mode.default_cmake_args(),
            use_ninja: false,
        };
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Selector {
    /// 1-based position in the option table.
    Index(usize),
    Name(String),
}

/// One line of user input in the customization loop.
#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Done,
    Assign { selector: Selector, value: String },
    EnableNinja,
    Malformed,
}

impl Command {
    pub fn parse(input: &str) -> Self {
        let input: &str = input.trim();
        if input.is_empty() || input.eq_ignore_ascii_case("done") {
            return Command::Done;
        }
        if let Some((selector, value)) = input.split_once('=') {
            let selector: &str = selector.trim();
            let value: String = value.trim().to_string();
            if !selector.is_empty() && selector.chars().all(|n| n.is_ascii_digit()) {
                return match selector.parse::<usize>() {
                    Ok(index) => Command::Assign {
                        selector: Selector::Index(index),
                        value,
                    },
                    // More digits than fit a usize can only be out of range.
                    Err(_) => Command::Assign {
                        selector: Selector::Index(usize::MAX),
                        value,
                    },
                };
            }
            return Command::Assign {
                selector: Selector::Name(selector.to_string()),
                value,
            };
        }
        if input == FLAG_NINJA {
            return Command::EnableNinja;
        }
        return Command::Malformed;
    }
}

/// What applying a command did, for the caller to report.
#[derive(Debug, PartialEq, Eq)]
pub enum Applied {
    Finished,
    Set { flag: &'static str, value: String },
    NinjaEnabled,
    /// Boolean value outside the accepted token set. Nothing changed.
    InvalidBoolean { flag: &'static str },
    /// Index outside `1..=count`. Nothing changed.
    IndexOutOfRange { count: usize },
    /// Name not in the option table. Accepted with a warning, nothing
    /// recorded.
    UnknownOption { name: String },
    Malformed,
}

/// Normalize a boolean option value to `ON`/`OFF`, or `None` if it is not
/// one of the accepted tokens.
///
/// ```rust
/// assert_eq!(teemake::options::normalize_boolean("yes"), Some("ON"));
/// assert_eq!(teemake::options::normalize_boolean("0"), Some("OFF"));
/// assert_eq!(teemake::options::normalize_boolean("maybe"), None);
/// ```
pub fn normalize_boolean(value: &str) -> Option<&'static str> {
    let upper: String = value.trim().to_ascii_uppercase();
    if TRUTHY_TOKENS.contains(&upper.as_str()) {
        return Some("ON");
    }
    if FALSY_TOKENS.contains(&upper.as_str()) {
        return Some("OFF");
    }
    return None;
}

/// Normalize a generator option value: truthy tokens enable it, anything
/// else disables it.
pub fn normalize_generator(value: &str) -> &'static str {
    let upper: String = value.trim().to_ascii_uppercase();
    if TRUTHY_TOKENS.contains(&upper.as_str()) {
        return "ON";
    }
    return "OFF";
}

/// Current values of a mode's options during customization.
pub struct Customization {
    mode: &'static GameMode,
    values: Vec<String>,
}

impl Customization {
    pub fn new(mode: &'static GameMode) -> Self {
        let values: Vec<String> = mode
            .build_options
            .iter()
            .map(|n| n.default.to_string())
            .collect::<Vec<String>>();
        return Self { mode, values };
    }

    pub fn options(&self) -> &'static [BuildOption] {
        return self.mode.build_options;
    }

    /// Current value of the option at 0-based `position`.
    pub fn value(&self, position: usize) -> Option<&str> {
        return self.values.get(position).map(|n| n.as_str());
    }

    pub fn is_changed(&self, position: usize) -> bool {
        return match (self.options().get(position), self.values.get(position)) {
            (Some(option), Some(value)) => option.default != value,
            _ => false,
        };
    }

    pub fn use_ninja(&self) -> bool {
        return self
            .position_of(FLAG_NINJA)
            .and_then(|n| self.value(n))
            .map(|n| n == "ON")
            .unwrap_or(false);
    }

    fn position_of(&self, flag: &str) -> Option<usize> {
        return self.options().iter().position(|n| n.flag == flag);
    }

    pub fn apply(&mut self, command: Command) -> Applied {
        match command {
            Command::Done => return Applied::Finished,
            Command::Malformed => return Applied::Malformed,
            Command::EnableNinja => {
                return match self.position_of(FLAG_NINJA) {
                    Some(position) => {
                        self.values[position] = "ON".to_string();
                        Applied::NinjaEnabled
                    }
                    None => Applied::UnknownOption {
                        name: FLAG_NINJA.to_string(),
                    },
                };
            }
            Command::Assign { selector, value } => {
                let position: usize = match selector {
                    Selector::Index(index) => {
                        let count: usize = self.options().len();
                        if index < 1 || index > count {
                            return Applied::IndexOutOfRange { count };
                        }
                        index - 1
                    }
                    Selector::Name(name) => match self.position_of(&name) {
                        Some(n) => n,
                        None => return Applied::UnknownOption { name },
                    },
                };
                return self.set(position, &value);
            }
        }
    }

    fn set(&mut self, position: usize, value: &str) -> Applied {
        let option: &'static BuildOption = &self.mode.build_options[position];
        let normalized: String = match option.kind {
            OptionKind::Generator => normalize_generator(value).to_string(),
            OptionKind::Boolean => match normalize_boolean(value) {
                Some(n) => n.to_string(),
                None => return Applied::InvalidBoolean { flag: option.flag },
            },
            OptionKind::String => value.to_string(),
        };
        self.values[position] = normalized.clone();
        return Applied::Set {
            flag: option.flag,
            value: normalized,
        };
    }

    /// Derive the final plan. Without any change from the declared defaults
    /// the mode's default argument list is returned unmodified.
    pub fn finish(self) -> BuildPlan {
        let mut overrides: Vec<String> = Vec::new();
        let mut overridden_flags: Vec<&'static str> = Vec::new();
        for (position, option) in self.options().iter().enumerate() {
            if !self.is_changed(position) {
                continue;
            }
            let value: &str = &self.values[position];
            match option.kind {
                OptionKind::Generator => {
                    if value == "ON" {
                        overrides.push(option.flag.to_string());
                    }
                }
                OptionKind::Boolean | OptionKind::String => {
                    overrides.push(format!("{}={}", option.flag, value));
                }
            }
            overridden_flags.push(option.flag);
        }

        if overridden_flags.is_empty() {
            return BuildPlan::defaults(self.mode);
        }

        let use_ninja: bool = self.use_ninja();
        let mut cmake_args: Vec<String> = self
            .mode
            .default_cmake_args()
            .into_iter()
            .filter(|arg| !overridden_flags.iter().any(|flag| defines(arg, flag)))
            .collect::<Vec<String>>();
        cmake_args.extend(overrides);

        for (flag, value) in [(FLAG_CLIENT, "OFF"), (FLAG_SERVER, "ON")] {
            if !cmake_args.iter().any(|arg| defines(arg, flag)) {
                cmake_args.push(format!("{flag}={value}"));
            }
        }

        return BuildPlan {
            cmake_args,
            use_ninja,
        };
    }
}

/// Whether a command line argument sets `flag`, e.g. `-DSERVER=ON` sets
/// `-DSERVER`.
fn defines(arg: &str, flag: &str) -> bool {
    return arg == flag || arg.strip_prefix(flag).is_some_and(|n| n.starts_with('='));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn teeworlds() -> &'static GameMode {
        return crate::catalog::mode_by_name("Teeworlds").expect("Teeworlds should be in the catalog");
    }

    fn ddnet() -> &'static GameMode {
        return crate::catalog::mode_by_name("DDNet").expect("DDNet should be in the catalog");
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse(""), Command::Done);
        assert_eq!(Command::parse("  DONE "), Command::Done);
        assert_eq!(Command::parse("-GNinja"), Command::EnableNinja);
        assert_eq!(
            Command::parse("3 = on"),
            Command::Assign {
                selector: Selector::Index(3),
                value: "on".into()
            }
        );
        assert_eq!(
            Command::parse("-DMYSQL=ON"),
            Command::Assign {
                selector: Selector::Name("-DMYSQL".into()),
                value: "ON".into()
            }
        );
        assert_eq!(Command::parse("enable mysql"), Command::Malformed);
    }

    #[test]
    fn test_boolean_tokens_any_case() {
        for token in ["on", "Yes", "TRUE", "1"] {
            assert_eq!(normalize_boolean(token), Some("ON"), "{token}");
        }
        for token in ["off", "No", "FALSE", "0"] {
            assert_eq!(normalize_boolean(token), Some("OFF"), "{token}");
        }
        for token in ["", "2", "enabled", "y"] {
            assert_eq!(normalize_boolean(token), None, "{token}");
        }
    }

    #[test]
    fn test_invalid_boolean_keeps_prior_value() {
        let mut customization: Customization = Customization::new(teeworlds());
        assert_eq!(
            customization.apply(Command::parse("4=yes")),
            Applied::Set {
                flag: "-DTOOLS",
                value: "ON".into()
            }
        );
        assert_eq!(
            customization.apply(Command::parse("4=sometimes")),
            Applied::InvalidBoolean { flag: "-DTOOLS" }
        );
        assert_eq!(customization.value(3), Some("ON"));
    }

    #[test]
    fn test_generator_treats_unknown_tokens_as_off() {
        let mut customization: Customization = Customization::new(teeworlds());
        customization.apply(Command::parse("-GNinja=true"));
        assert!(customization.use_ninja());
        customization.apply(Command::parse("6=whatever"));
        assert!(!customization.use_ninja());
    }

    #[test]
    fn test_index_out_of_range() {
        let mut customization: Customization = Customization::new(teeworlds());
        assert_eq!(
            customization.apply(Command::parse("0=ON")),
            Applied::IndexOutOfRange { count: 6 }
        );
        assert_eq!(
            customization.apply(Command::parse("99999999999999999999999=ON")),
            Applied::IndexOutOfRange { count: 6 }
        );
    }

    #[test]
    fn test_unknown_name_is_warned_not_recorded() {
        let mut customization: Customization = Customization::new(teeworlds());
        assert_eq!(
            customization.apply(Command::parse("-DMYSQL=ON")),
            Applied::UnknownOption {
                name: "-DMYSQL".into()
            }
        );
        assert_eq!(customization.finish(), BuildPlan::defaults(teeworlds()));
    }

    #[test]
    fn test_no_changes_yields_defaults() {
        let customization: Customization = Customization::new(ddnet());
        let plan: BuildPlan = customization.finish();
        assert_eq!(
            plan.cmake_args,
            vec!["cmake", "../source/", "-DCLIENT=OFF", "-DSERVER=ON"]
        );
        assert!(!plan.use_ninja);
    }

    #[test]
    fn test_change_and_revert_yields_defaults() {
        let mut customization: Customization = Customization::new(ddnet());
        customization.apply(Command::parse("-DMYSQL=ON"));
        customization.apply(Command::parse("4=off"));
        assert_eq!(customization.finish(), BuildPlan::defaults(ddnet()));
    }

    #[test]
    fn test_overrides_appended_after_defaults() {
        let mut customization: Customization = Customization::new(ddnet());
        customization.apply(Command::parse("-DMYSQL=yes"));
        customization.apply(Command::parse("-GNinja"));
        let plan: BuildPlan = customization.finish();
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
        assert!(plan.use_ninja);
    }

    #[test]
    fn test_overridden_default_flag_replaced_not_duplicated() {
        let mut customization: Customization = Customization::new(teeworlds());
        customization.apply(Command::parse("1=ON"));
        let plan: BuildPlan = customization.finish();
        assert_eq!(
            plan.cmake_args,
            vec!["cmake", "../source/", "-DSERVER=ON", "-DCLIENT=ON"]
        );
    }

    #[test]
    fn test_defines_matches_whole_flag_only() {
        assert!(defines("-DSERVER=ON", "-DSERVER"));
        assert!(defines("-GNinja", "-GNinja"));
        assert!(!defines("-DSERVERX=ON", "-DSERVER"));
    }
}
