//! Static texts.

/// The program's version info text.
pub static INFOTEXT: &'static str =
    concat!(env!("CARGO_PKG_NAME"), " v", env!("CARGO_PKG_VERSION"));

/// Banner drawn on top of every wizard screen.
pub static BANNER: &'static str = r#"
  ████████╗███████╗███████╗███╗   ███╗ █████╗ ██╗  ██╗███████╗
  ╚══██╔══╝██╔════╝██╔════╝████╗ ████║██╔══██╗██║ ██╔╝██╔════╝
     ██║   █████╗  █████╗  ██╔████╔██║███████║█████╔╝ █████╗
     ██║   ██╔══╝  ██╔══╝  ██║╚██╔╝██║██╔══██║██╔═██╗ ██╔══╝
     ██║   ███████╗███████╗██║ ╚═╝ ██║██║  ██║██║  ██╗███████╗
     ╚═╝   ╚══════╝╚══════╝╚═╝     ╚═╝╚═╝  ╚═╝╚═╝  ╚═╝╚══════╝"#;

/// How to use the build option customization loop.
pub static OPTION_INSTRUCTIONS: [&'static str; 4] = [
    "  • Use number: <#>=<value>  → Example: 1=ON",
    "  • Use name: <option>=<value>  → Example: -DMYSQL=ON",
    "  • For Ninja: <#>=ON/OFF or -GNinja",
    "  • Type done when finished",
];

pub static NAME_RULES: &'static str =
    "Invalid name. Use alphanumeric characters, - or _ only (1-64 chars, no path separators).";

pub static CANCELLED: &'static str = "⚠  Build cancelled by user";
