//! Static registry of the supported game modes: where their sources live,
//! which system packages they need, and which CMake options and server
//! settings they expose.

/// System package managers the installer knows how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    Apt,
    Dnf,
    Yum,
    Pacman,
    Zypper,
    Unknown,
}

impl PackageManager {
    /// Known managers in detection priority order.
    pub const DETECTION_ORDER: [PackageManager; 5] = [
        PackageManager::Apt,
        PackageManager::Dnf,
        PackageManager::Yum,
        PackageManager::Pacman,
        PackageManager::Zypper,
    ];

    /// Name of the manager's executable as found on `PATH`.
    pub fn executable(&self) -> &'static str {
        return match self {
            PackageManager::Apt => "apt-get",
            PackageManager::Dnf => "dnf",
            PackageManager::Yum => "yum",
            PackageManager::Pacman => "pacman",
            PackageManager::Zypper => "zypper",
            PackageManager::Unknown => "unknown",
        };
    }

    /// Arguments that follow the executable to install packages without
    /// asking for confirmation. `None` for [`PackageManager::Unknown`].
    pub fn install_args(&self) -> Option<&'static [&'static str]> {
        return match self {
            PackageManager::Apt
            | PackageManager::Dnf
            | PackageManager::Yum
            | PackageManager::Zypper => Some(&["install", "-y"][..]),
            PackageManager::Pacman => Some(&["-S", "--noconfirm"][..]),
            PackageManager::Unknown => None,
        };
    }

    /// Name of the package providing the Ninja build tool.
    pub fn ninja_package(&self) -> &'static str {
        return match self {
            PackageManager::Pacman | PackageManager::Zypper => "ninja",
            _ => "ninja-build",
        };
    }
}

impl std::fmt::Display for PackageManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.executable())
    }
}

/// Space separated package lists, one per supported package manager.
#[derive(Debug)]
pub struct Packages {
    pub apt: &'static str,
    pub dnf: &'static str,
    pub yum: &'static str,
    pub pacman: &'static str,
    pub zypper: &'static str,
}

impl Packages {
    pub fn for_manager(&self, manager: PackageManager) -> Option<&'static str> {
        return match manager {
            PackageManager::Apt => Some(self.apt),
            PackageManager::Dnf => Some(self.dnf),
            PackageManager::Yum => Some(self.yum),
            PackageManager::Pacman => Some(self.pacman),
            PackageManager::Zypper => Some(self.zypper),
            PackageManager::Unknown => None,
        };
    }
}

/// Toolchain and libraries every mode needs regardless of its own packages.
pub static BASE_PACKAGES: Packages = Packages {
    apt: "build-essential cmake git python3 libfreetype6-dev libsdl2-dev",
    dnf: "gcc gcc-c++ make cmake git python3 freetype-devel SDL2-devel",
    yum: "gcc gcc-c++ make cmake git python3 freetype-devel SDL2-devel",
    pacman: "base-devel cmake git python freetype2 sdl2",
    zypper: "gcc gcc-c++ make cmake git python3 freetype2-devel libSDL2-devel",
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    Boolean,
    String,
    /// A CMake generator switch such as `-GNinja`: present or absent, never
    /// written as `flag=value`.
    Generator,
}

#[derive(Debug)]
pub struct BuildOption {
    pub flag: &'static str,
    pub description: &'static str,
    pub default: &'static str,
    pub kind: OptionKind,
}

#[derive(Debug)]
pub struct ConfigSetting {
    pub key: &'static str,
    pub prompt: &'static str,
    pub default: &'static str,
    pub description: &'static str,
}

/// One server variant that can be built.
#[derive(Debug)]
pub struct GameMode {
    pub name: &'static str,
    pub description: &'static str,
    pub url: &'static str,
    pub packages: Packages,
    pub default_cmake_args: &'static [&'static str],
    pub build_options: &'static [BuildOption],
    pub basic_settings: &'static [ConfigSetting],
    /// Reserved for a future advanced configuration tier.
    pub advanced_settings: &'static [ConfigSetting],
}

impl GameMode {
    pub fn default_cmake_args(&self) -> Vec<String> {
        return self
            .default_cmake_args
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<String>>();
    }
}

static DEFAULT_CMAKE_ARGS: [&str; 4] = ["cmake", "../source/", "-DCLIENT=OFF", "-DSERVER=ON"];

const fn boolean(
    flag: &'static str,
    description: &'static str,
    default: &'static str,
) -> BuildOption {
    return BuildOption {
        flag,
        description,
        default,
        kind: OptionKind::Boolean,
    };
}

const NINJA: BuildOption = BuildOption {
    flag: crate::constants::FLAG_NINJA,
    description: "Use Ninja build system (faster)",
    default: "OFF",
    kind: OptionKind::Generator,
};

const fn basic_settings_with(
    server_name: &'static str,
    max_clients: &'static str,
    gametype: &'static str,
    gametype_description: &'static str,
) -> [ConfigSetting; 4] {
    return [
        ConfigSetting {
            key: "sv_name",
            prompt: "Server Name",
            default: server_name,
            description: "The name of your server",
        },
        ConfigSetting {
            key: "sv_port",
            prompt: "Server Port",
            default: "8303",
            description: "Port number (default: 8303)",
        },
        ConfigSetting {
            key: "sv_max_clients",
            prompt: "Maximum Players",
            default: max_clients,
            description: "Maximum number of players",
        },
        ConfigSetting {
            key: "sv_gametype",
            prompt: "Game Type",
            default: gametype,
            description: gametype_description,
        },
    ];
}

static TEEWORLDS_OPTIONS: [BuildOption; 6] = [
    boolean("-DCLIENT", "Build client", "OFF"),
    boolean("-DSERVER", "Build server", "ON"),
    boolean("-DMASTERSERVER", "Build masterserver", "OFF"),
    boolean("-DTOOLS", "Build tools", "OFF"),
    boolean("-DDEV", "Development mode", "OFF"),
    NINJA,
];

static DDNET_OPTIONS: [BuildOption; 10] = [
    boolean("-DCLIENT", "Build client", "OFF"),
    boolean("-DSERVER", "Build server", "ON"),
    boolean("-DTOOLS", "Build tools", "OFF"),
    boolean("-DMYSQL", "Enable MySQL support", "OFF"),
    boolean("-DWEBSOCKETS", "Enable WebSocket support", "OFF"),
    boolean("-DVIDEORECORDER", "Enable video recorder", "OFF"),
    boolean("-DUPNP", "Enable UPnP support", "OFF"),
    boolean("-DSTEAM", "Enable Steam integration", "OFF"),
    boolean("-DPREFER_BUNDLED_LIBS", "Use bundled libraries", "OFF"),
    NINJA,
];

static ZCATCH_OPTIONS: [BuildOption; 5] = [
    boolean("-DCLIENT", "Build client", "OFF"),
    boolean("-DSERVER", "Build server", "ON"),
    boolean("-DTOOLS", "Build tools", "OFF"),
    boolean("-DDEV", "Development mode", "OFF"),
    NINJA,
];

static TEEWORLDS_SETTINGS: [ConfigSetting; 4] = basic_settings_with(
    "My Teeworlds Server",
    "16",
    "dm",
    "Game type (dm, tdm, ctf)",
);

static DDNET_SETTINGS: [ConfigSetting; 4] =
    basic_settings_with("My DDNet Server", "64", "DDraceNetwork", "Game type");

static ZCATCH_SETTINGS: [ConfigSetting; 4] =
    basic_settings_with("My zCatch Server", "16", "zCatch", "Game type");

static GAME_MODES: [GameMode; 3] = [
    GameMode {
        name: "Teeworlds",
        description: "Classic Teeworlds",
        url: "https://github.com/teeworlds/teeworlds.git",
        packages: Packages {
            apt: "libpnglite-dev libwavpack-dev",
            dnf: "libpng-devel wavpack-devel",
            yum: "libpng-devel wavpack-devel",
            pacman: "libpng wavpack",
            zypper: "libpng16-devel wavpack-devel",
        },
        default_cmake_args: &DEFAULT_CMAKE_ARGS,
        build_options: &TEEWORLDS_OPTIONS,
        basic_settings: &TEEWORLDS_SETTINGS,
        advanced_settings: &[],
    },
    GameMode {
        name: "DDNet",
        description: "Advanced race mode",
        url: "https://github.com/ddnet/ddnet.git",
        packages: Packages {
            apt: "libvulkan-dev libsqlite3-dev libcurl4-openssl-dev",
            dnf: "vulkan-devel sqlite-devel libcurl-devel",
            yum: "vulkan-devel sqlite-devel libcurl-devel",
            pacman: "vulkan-icd-loader sqlite curl",
            zypper: "vulkan-devel sqlite3-devel libcurl-devel",
        },
        default_cmake_args: &DEFAULT_CMAKE_ARGS,
        build_options: &DDNET_OPTIONS,
        basic_settings: &DDNET_SETTINGS,
        advanced_settings: &[],
    },
    GameMode {
        name: "zCatch",
        description: "Pvp catch mode",
        url: "https://github.com/jxsl13/zcatch.git",
        packages: Packages {
            apt: "libcurl4-openssl-dev",
            dnf: "libcurl-devel",
            yum: "libcurl-devel",
            pacman: "curl",
            zypper: "libcurl-devel",
        },
        default_cmake_args: &DEFAULT_CMAKE_ARGS,
        build_options: &ZCATCH_OPTIONS,
        basic_settings: &ZCATCH_SETTINGS,
        advanced_settings: &[],
    },
];

/// All modes, in menu order.
pub fn modes() -> &'static [GameMode] {
    return &GAME_MODES;
}

/// Look up a mode by its exact name.
pub fn mode_by_name(name: &str) -> Option<&'static GameMode> {
    return GAME_MODES.iter().find(|n| n.name == name);
}

/// Customizable CMake options of a mode. Empty means customization is not
/// offered.
pub fn build_options(mode: &GameMode) -> &'static [BuildOption] {
    return mode.build_options;
}

pub fn basic_settings(mode: &GameMode) -> &'static [ConfigSetting] {
    return mode.basic_settings;
}

pub fn advanced_settings(mode: &GameMode) -> &'static [ConfigSetting] {
    return mode.advanced_settings;
}
