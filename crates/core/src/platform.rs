//! Platform details for locating and launching external tools

use std::env;

/// How the current platform launches shell lines and local tool shims
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformInfo {
    /// Shell interpreter for command lines (e.g., "sh", "cmd")
    pub shell: &'static str,
    /// Flag that makes the shell run the following argument as a command
    pub shell_flag: &'static str,
    /// Suffix of the launcher shims npm writes into `node_modules/.bin`
    pub bin_suffix: &'static str,
}

impl PlatformInfo {
    /// Detect the current platform
    pub fn current() -> Self {
        Self::from_os(env::consts::OS)
    }

    /// Create platform info from an OS string
    pub fn from_os(os: &str) -> Self {
        match os {
            "windows" => Self {
                shell: "cmd",
                shell_flag: "/C",
                bin_suffix: ".cmd",
            },
            _ => Self {
                shell: "sh",
                shell_flag: "-c",
                bin_suffix: "",
            },
        }
    }

    /// File name of a tool inside the tools directory
    pub fn executable_name(&self, tool: &str) -> String {
        format!("{}{}", tool, self.bin_suffix)
    }
}
