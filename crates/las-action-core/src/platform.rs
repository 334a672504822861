use crate::error::{ActionError, Result};
use std::fmt;

const SUPPORTED_PLATFORMS: &[&str] = &["darwin", "linux"];
const SUPPORTED_ARCHS: &[&str] = &["arm", "arm64", "x64"];

/// Operating systems the scanner is released for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Darwin,
    Linux,
}

impl Platform {
    /// Accepts release names (`darwin`) as well as Rust's `std::env::consts::OS` values (`macos`).
    pub fn parse(os: &str) -> Result<Self> {
        match os {
            "linux" => Ok(Self::Linux),
            "darwin" | "macos" => Ok(Self::Darwin),
            other => Err(ActionError::UnsupportedPlatform {
                platform: other.to_string(),
                supported: quoted_list(SUPPORTED_PLATFORMS),
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Darwin => "darwin",
            Self::Linux => "linux",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Host CPU architectures the action accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostArch {
    Arm,
    Arm64,
    X64,
}

impl HostArch {
    /// Accepts both `arm64`/`x64` spellings and Rust's `aarch64`/`x86_64`.
    pub fn parse(arch: &str) -> Result<Self> {
        match arch {
            "arm" => Ok(Self::Arm),
            "arm64" | "aarch64" => Ok(Self::Arm64),
            "x64" | "x86_64" => Ok(Self::X64),
            other => Err(ActionError::UnsupportedArch {
                arch: other.to_string(),
                supported: quoted_list(SUPPORTED_ARCHS),
            }),
        }
    }
}

/// Architecture component of a release asset name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReleaseArch {
    Amd64,
    Arm64,
    /// darwin ships a single universal binary.
    All,
}

impl ReleaseArch {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Amd64 => "amd64",
            Self::Arm64 => "arm64",
            Self::All => "all",
        }
    }
}

impl fmt::Display for ReleaseArch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Platform and architecture a release asset is selected by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Target {
    pub platform: Platform,
    pub arch: ReleaseArch,
}

impl Target {
    pub fn new(platform: Platform, host_arch: HostArch) -> Self {
        let arch = match (platform, host_arch) {
            (Platform::Darwin, _) => ReleaseArch::All,
            (Platform::Linux, HostArch::Arm | HostArch::Arm64) => ReleaseArch::Arm64,
            (Platform::Linux, HostArch::X64) => ReleaseArch::Amd64,
        };
        Self { platform, arch }
    }

    /// Resolve from raw OS and architecture names.
    pub fn resolve(os: &str, arch: &str) -> Result<Self> {
        let platform = Platform::parse(os)?;
        let host_arch = HostArch::parse(arch)?;
        Ok(Self::new(platform, host_arch))
    }

    /// Resolve the machine this process runs on.
    pub fn detect() -> Result<Self> {
        Self::resolve(std::env::consts::OS, std::env::consts::ARCH)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.platform, self.arch)
    }
}

fn quoted_list(items: &[&str]) -> String {
    items
        .iter()
        .map(|item| format!("'{item}'"))
        .collect::<Vec<_>>()
        .join(", ")
}
