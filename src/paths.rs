//! Default install-location probes for Android tooling.
//!
//! Every guess is derived from environment variables first and from the
//! per-OS conventions second. Guesses are not checked for existence here;
//! the storage scanners treat a missing directory as an empty section.

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::PathsConfig;

/// Operating system family used to pick path conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Os {
    MacOs,
    Linux,
    Windows,
}

impl Os {
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Os::MacOs
        } else if cfg!(windows) {
            Os::Windows
        } else {
            Os::Linux
        }
    }
}

/// Kind of IDE data folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IdeDataKind {
    Caches,
    Config,
    Data,
    Logs,
    Custom,
}

impl fmt::Display for IdeDataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IdeDataKind::Caches => "Caches",
            IdeDataKind::Config => "Config",
            IdeDataKind::Data => "Data",
            IdeDataKind::Logs => "Logs",
            IdeDataKind::Custom => "Custom",
        };
        f.write_str(name)
    }
}

/// A root folder holding per-product IDE data (e.g. `~/.cache/Google`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdeRoot {
    pub kind: IdeDataKind,
    pub vendor: String,
    pub path: PathBuf,
}

/// Where the JDK search roots come from, used to tag installations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JdkSource {
    JavaHome,
    System,
    IdeDownloads,
    Sdkman,
    GradleToolchains,
    Custom,
}

impl fmt::Display for JdkSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JdkSource::JavaHome => "JAVA_HOME",
            JdkSource::System => "system",
            JdkSource::IdeDownloads => "IDE downloads",
            JdkSource::Sdkman => "SDKMAN!",
            JdkSource::GradleToolchains => "Gradle toolchains",
            JdkSource::Custom => "custom",
        };
        f.write_str(name)
    }
}

/// A directory whose children may be JDK installations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JdkSearchRoot {
    pub source: JdkSource,
    pub path: PathBuf,
}

/// Resolved tool locations.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ToolPaths {
    pub android_sdk: Option<PathBuf>,
    pub gradle_home: Option<PathBuf>,
    pub gradle_installation: Option<PathBuf>,
    pub avd_home: Option<PathBuf>,
    pub konan_home: Option<PathBuf>,
    pub java_home: Option<PathBuf>,
    pub jdk_roots: Vec<JdkSearchRoot>,
    pub ide_roots: Vec<IdeRoot>,
}

/// Inputs of a path probe.
pub struct Probe<'a> {
    pub os: Os,
    pub home: Option<PathBuf>,
    pub env: &'a dyn Fn(&str) -> Option<String>,
}

impl<'a> Probe<'a> {
    fn var(&self, key: &str) -> Option<String> {
        (self.env)(key).filter(|v| !v.trim().is_empty())
    }

    fn var_path(&self, key: &str) -> Option<PathBuf> {
        self.var(key).map(PathBuf::from)
    }

    fn home_join(&self, rel: &str) -> Option<PathBuf> {
        self.home.as_ref().map(|h| join_rel(h, rel))
    }

    pub fn android_sdk(&self) -> Option<PathBuf> {
        if let Some(p) = self.var_path("ANDROID_HOME").or_else(|| self.var_path("ANDROID_SDK_ROOT")) {
            return Some(p);
        }
        match self.os {
            Os::MacOs => self.home_join("Library/Android/sdk"),
            Os::Linux => self.home_join("Android/Sdk"),
            Os::Windows => self
                .local_app_data()
                .map(|dir| dir.join("Android").join("Sdk")),
        }
    }

    pub fn gradle_home(&self) -> Option<PathBuf> {
        self.var_path("GRADLE_USER_HOME")
            .or_else(|| self.home_join(".gradle"))
    }

    pub fn gradle_installation(&self) -> Option<PathBuf> {
        self.var_path("GRADLE_HOME")
    }

    pub fn avd_home(&self) -> Option<PathBuf> {
        if let Some(p) = self.var_path("ANDROID_AVD_HOME") {
            return Some(p);
        }
        if let Some(p) = self.var_path("ANDROID_USER_HOME") {
            return Some(p.join("avd"));
        }
        self.home_join(".android/avd")
    }

    pub fn konan_home(&self) -> Option<PathBuf> {
        self.var_path("KONAN_DATA_DIR")
            .or_else(|| self.home_join(".konan"))
    }

    pub fn java_home(&self) -> Option<PathBuf> {
        self.var_path("JAVA_HOME")
    }

    pub fn jdk_roots(&self) -> Vec<JdkSearchRoot> {
        let mut roots = Vec::new();
        let system: &[&str] = match self.os {
            Os::MacOs => &["/Library/Java/JavaVirtualMachines"],
            Os::Linux => &["/usr/lib/jvm", "/usr/java", "/opt/java"],
            Os::Windows => &[
                "C:\\Program Files\\Java",
                "C:\\Program Files\\Eclipse Adoptium",
                "C:\\Program Files\\Microsoft",
            ],
        };
        for dir in system {
            roots.push(JdkSearchRoot {
                source: JdkSource::System,
                path: PathBuf::from(dir),
            });
        }

        if self.os == Os::MacOs {
            if let Some(p) = self.home_join("Library/Java/JavaVirtualMachines") {
                roots.push(JdkSearchRoot {
                    source: JdkSource::System,
                    path: p,
                });
            }
        }
        if let Some(p) = self.home_join(".jdks") {
            roots.push(JdkSearchRoot {
                source: JdkSource::IdeDownloads,
                path: p,
            });
        }
        if let Some(p) = self.home_join(".sdkman/candidates/java") {
            roots.push(JdkSearchRoot {
                source: JdkSource::Sdkman,
                path: p,
            });
        }
        if let Some(gradle) = self.gradle_home() {
            roots.push(JdkSearchRoot {
                source: JdkSource::GradleToolchains,
                path: gradle.join("jdks"),
            });
        }
        roots
    }

    pub fn ide_roots(&self) -> Vec<IdeRoot> {
        let mut roots = Vec::new();
        let mut push = |kind: IdeDataKind, base: Option<PathBuf>| {
            if let Some(base) = base {
                for vendor in ["Google", "JetBrains"] {
                    roots.push(IdeRoot {
                        kind,
                        vendor: vendor.to_string(),
                        path: base.join(vendor),
                    });
                }
            }
        };

        match self.os {
            Os::MacOs => {
                push(IdeDataKind::Caches, self.home_join("Library/Caches"));
                push(IdeDataKind::Config, self.home_join("Library/Application Support"));
                push(IdeDataKind::Logs, self.home_join("Library/Logs"));
            }
            Os::Linux => {
                push(
                    IdeDataKind::Caches,
                    self.var_path("XDG_CACHE_HOME").or_else(|| self.home_join(".cache")),
                );
                push(
                    IdeDataKind::Config,
                    self.var_path("XDG_CONFIG_HOME").or_else(|| self.home_join(".config")),
                );
                push(
                    IdeDataKind::Data,
                    self.var_path("XDG_DATA_HOME").or_else(|| self.home_join(".local/share")),
                );
            }
            Os::Windows => {
                push(IdeDataKind::Caches, self.local_app_data());
                push(
                    IdeDataKind::Config,
                    self.var_path("APPDATA").or_else(|| self.home_join("AppData/Roaming")),
                );
            }
        }
        roots
    }

    fn local_app_data(&self) -> Option<PathBuf> {
        self.var_path("LOCALAPPDATA")
            .or_else(|| self.home_join("AppData/Local"))
    }

    /// Run every probe.
    pub fn resolve(&self) -> ToolPaths {
        let java_home = self.java_home();
        ToolPaths {
            android_sdk: self.android_sdk(),
            gradle_home: self.gradle_home(),
            gradle_installation: self.gradle_installation(),
            avd_home: self.avd_home(),
            konan_home: self.konan_home(),
            java_home,
            jdk_roots: self.jdk_roots(),
            ide_roots: self.ide_roots(),
        }
    }
}

fn join_rel(base: &Path, rel: &str) -> PathBuf {
    rel.split('/').fold(base.to_path_buf(), |acc, part| acc.join(part))
}

impl ToolPaths {
    /// Probe the current machine.
    pub fn detect() -> Self {
        let env = |key: &str| std::env::var(key).ok();
        Probe {
            os: Os::current(),
            home: dirs::home_dir(),
            env: &env,
        }
        .resolve()
    }

    /// Probe the current machine and apply configured overrides.
    pub fn resolve(config: &PathsConfig) -> Self {
        Self::detect().with_overrides(config)
    }

    /// Replace probed values with user-configured ones.
    pub fn with_overrides(mut self, config: &PathsConfig) -> Self {
        if let Some(p) = &config.android_sdk {
            self.android_sdk = Some(p.clone());
        }
        if let Some(p) = &config.gradle_home {
            let old_toolchains = self.gradle_home.as_ref().map(|g| g.join("jdks"));
            self.jdk_roots.retain(|r| Some(&r.path) != old_toolchains.as_ref());
            self.jdk_roots.push(JdkSearchRoot {
                source: JdkSource::GradleToolchains,
                path: p.join("jdks"),
            });
            self.gradle_home = Some(p.clone());
        }
        if let Some(p) = &config.avd_home {
            self.avd_home = Some(p.clone());
        }
        if let Some(p) = &config.konan_home {
            self.konan_home = Some(p.clone());
        }
        if let Some(p) = &config.java_home {
            self.java_home = Some(p.clone());
        }
        for dir in &config.extra_jdk_dirs {
            self.jdk_roots.push(JdkSearchRoot {
                source: JdkSource::Custom,
                path: dir.clone(),
            });
        }
        for dir in &config.extra_ide_dirs {
            self.ide_roots.push(IdeRoot {
                kind: IdeDataKind::Custom,
                vendor: dir
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default(),
                path: dir.clone(),
            });
        }
        self
    }
}
