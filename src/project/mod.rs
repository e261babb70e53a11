//! Gradle project analysis: build files, settings, properties, wrapper and
//! version catalog, with every dependency and plugin checked against the
//! local module cache.

pub mod catalog;
pub mod discovery;
pub mod extract;
pub mod settings;

pub use catalog::{CatalogBundle, CatalogLibrary, CatalogPlugin, CatalogVersion, VersionCatalog};
pub use discovery::{discover_files, gradle_path, DiscoveryOptions, ProjectFile, ProjectFileKind};
pub use extract::{
    annotate, extract, Declarations, Dependency, DependencyStyle, ExtractContext, Plugin,
    PluginStyle, ProjectDependency,
};
pub use settings::{PropertiesFileInfo, SettingsFileInfo, WrapperInfo};

use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::error::{Result, SweeperError};
use crate::storage::{file_name, GradleModulesInfo};

/// One module build script and what it declares.
#[derive(Debug, Clone, Serialize)]
pub struct ModuleBuildFileInfo {
    /// Gradle path, e.g. `:app`
    pub name: String,
    pub path: PathBuf,
    #[serde(skip)]
    pub content: String,
    pub lines: usize,
    pub plugins: Vec<Plugin>,
    pub dependencies: Vec<Dependency>,
    pub project_dependencies: Vec<ProjectDependency>,
}

/// Headline facts about a project.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProjectOverview {
    pub name: String,
    pub root: PathBuf,
    pub gradle_version: Option<String>,
    pub module_count: usize,
    pub dependency_count: usize,
    pub plugin_count: usize,
    pub agp_version: Option<String>,
    pub kotlin_version: Option<String>,
    pub compile_sdk: Option<String>,
    pub min_sdk: Option<String>,
    pub target_sdk: Option<String>,
}

/// Full result of [`analyze_project`].
#[derive(Debug, Clone, Serialize)]
pub struct ProjectInfo {
    pub overview: ProjectOverview,
    pub plugins: Vec<Plugin>,
    pub dependencies: Vec<Dependency>,
    pub modules: Vec<ModuleBuildFileInfo>,
    pub settings: Option<SettingsFileInfo>,
    pub properties: Option<PropertiesFileInfo>,
    pub wrapper: Option<WrapperInfo>,
    pub version_catalog: Option<VersionCatalog>,
    /// Set when a catalog exists but could not be read
    pub catalog_error: Option<String>,
    pub files: Vec<ProjectFile>,
}

impl ProjectInfo {
    /// Dependencies deduplicated by `group:artifact:version`, in first-seen order.
    pub fn unique_dependencies(&self) -> Vec<&Dependency> {
        let mut seen = HashSet::new();
        self.dependencies
            .iter()
            .filter(|d| seen.insert(d.notation()))
            .collect()
    }

    /// Unique resolved dependencies whose declared version is not in the
    /// local module cache.
    pub fn missing_dependencies(&self) -> Vec<&Dependency> {
        self.unique_dependencies()
            .into_iter()
            .filter(|d| d.is_resolved() && d.version.is_some() && !d.is_version_synced)
            .collect()
    }

    /// Plugins that declare a version missing from the local module cache.
    pub fn missing_plugins(&self) -> Vec<&Plugin> {
        let mut seen = HashSet::new();
        self.plugins
            .iter()
            .filter(|p| p.version.is_some() && !p.is_version_synced)
            .filter(|p| seen.insert((p.id.clone(), p.version.clone())))
            .collect()
    }

    pub fn module(&self, name: &str) -> Option<&ModuleBuildFileInfo> {
        self.modules.iter().find(|m| m.name == name)
    }
}

/// Analyze the Gradle project at `root`.
///
/// Unreadable files are skipped with a warning; only a missing root is an
/// error.
pub fn analyze_project(
    root: &Path,
    modules_index: &GradleModulesInfo,
    options: &DiscoveryOptions,
) -> Result<ProjectInfo> {
    if !root.is_dir() {
        return Err(SweeperError::PathNotFound(root.to_path_buf()));
    }

    let files = discover_files(root, options);
    let at_root = |kind: ProjectFileKind| {
        files
            .iter()
            .filter(|f| f.kind == kind)
            .min_by_key(|f| f.relative_path.matches('/').count())
    };

    let settings = at_root(ProjectFileKind::Settings)
        .and_then(|f| read_file(&f.path))
        .map(|text| SettingsFileInfo::parse(&text));
    let properties = files
        .iter()
        .find(|f| f.kind == ProjectFileKind::Properties && f.relative_path == "gradle.properties")
        .and_then(|f| read_file(&f.path))
        .map(|text| PropertiesFileInfo::parse(&text));
    let wrapper = files
        .iter()
        .find(|f| f.kind == ProjectFileKind::Wrapper)
        .and_then(|f| read_file(&f.path))
        .map(|text| WrapperInfo::parse(&text));

    let catalog_file = files
        .iter()
        .find(|f| f.relative_path == "gradle/libs.versions.toml")
        .or_else(|| at_root(ProjectFileKind::VersionCatalog));
    let (version_catalog, catalog_error) = match catalog_file {
        Some(f) => match VersionCatalog::load(&f.path) {
            Ok(catalog) => (Some(catalog), None),
            Err(e) => {
                tracing::warn!("{}", e);
                (None, Some(e.to_string()))
            }
        },
        None => (None, None),
    };

    let ctx = ExtractContext {
        catalog: version_catalog.as_ref(),
        properties: properties.as_ref().map(|p| &p.entries),
    };

    let modules: Vec<ModuleBuildFileInfo> = files
        .iter()
        .filter(|f| f.kind == ProjectFileKind::BuildScript)
        .filter_map(|f| {
            let content = read_file(&f.path)?;
            let module_dir = f.path.parent().unwrap_or(root);
            let name = gradle_path(root, module_dir);
            let mut declarations = extract(&content, &name, ctx);
            annotate(&mut declarations, modules_index);
            Some(ModuleBuildFileInfo {
                lines: content.lines().count(),
                name,
                path: f.path.clone(),
                content,
                plugins: declarations.plugins,
                dependencies: declarations.dependencies,
                project_dependencies: declarations.project_dependencies,
            })
        })
        .collect();

    let dependencies: Vec<Dependency> = modules
        .iter()
        .flat_map(|m| m.dependencies.iter().cloned())
        .collect();
    let plugins: Vec<Plugin> = modules
        .iter()
        .flat_map(|m| m.plugins.iter().cloned())
        .collect();

    let overview = build_overview(
        root,
        settings.as_ref(),
        wrapper.as_ref(),
        version_catalog.as_ref(),
        &modules,
        &dependencies,
        &plugins,
    );
    tracing::info!(
        project = %overview.name,
        modules = overview.module_count,
        dependencies = overview.dependency_count,
        "Analyzed project"
    );

    Ok(ProjectInfo {
        overview,
        plugins,
        dependencies,
        modules,
        settings,
        properties,
        wrapper,
        version_catalog,
        catalog_error,
        files,
    })
}

fn read_file(path: &Path) -> Option<String> {
    match fs::read_to_string(path) {
        Ok(text) => Some(text),
        Err(e) => {
            tracing::warn!(path = %path.display(), "Cannot read file: {}", e);
            None
        }
    }
}

fn build_overview(
    root: &Path,
    settings: Option<&SettingsFileInfo>,
    wrapper: Option<&WrapperInfo>,
    catalog: Option<&VersionCatalog>,
    modules: &[ModuleBuildFileInfo],
    dependencies: &[Dependency],
    plugins: &[Plugin],
) -> ProjectOverview {
    let name = settings
        .and_then(|s| s.root_project_name.clone())
        .unwrap_or_else(|| file_name(root));

    let coordinates: BTreeSet<String> = dependencies
        .iter()
        .filter(|d| d.is_resolved())
        .map(|d| d.coordinate())
        .collect();
    let plugin_ids: BTreeSet<&str> = plugins.iter().map(|p| p.id.as_str()).collect();

    let agp_version = plugin_version(plugins, |id| id.starts_with("com.android."))
        .or_else(|| classpath_version(dependencies, "com.android.tools.build", "gradle"));
    let kotlin_version = plugin_version(plugins, |id| id.starts_with("org.jetbrains.kotlin."))
        .or_else(|| {
            classpath_version(dependencies, "org.jetbrains.kotlin", "kotlin-gradle-plugin")
        });

    let sdk = |keys: &[&str]| {
        modules
            .iter()
            .find_map(|m| sdk_value(&m.content, keys, catalog))
    };

    ProjectOverview {
        name,
        root: root.to_path_buf(),
        gradle_version: wrapper.and_then(|w| w.gradle_version.clone()),
        module_count: modules.len(),
        dependency_count: coordinates.len(),
        plugin_count: plugin_ids.len(),
        agp_version,
        kotlin_version,
        compile_sdk: sdk(&["compileSdk", "compileSdkVersion"]),
        min_sdk: sdk(&["minSdk", "minSdkVersion"]),
        target_sdk: sdk(&["targetSdk", "targetSdkVersion"]),
    }
}

fn plugin_version(plugins: &[Plugin], matches: impl Fn(&str) -> bool) -> Option<String> {
    plugins
        .iter()
        .filter(|p| matches(&p.id))
        .find_map(|p| p.version.clone())
}

fn classpath_version(dependencies: &[Dependency], group: &str, artifact: &str) -> Option<String> {
    dependencies
        .iter()
        .filter(|d| d.group == group && d.artifact == artifact)
        .find_map(|d| d.version.clone())
}

/// Value of an SDK level assignment such as `compileSdk = 34`,
/// `minSdkVersion 24` or `targetSdk = libs.versions.targetSdk.get().toInt()`.
fn sdk_value(content: &str, keys: &[&str], catalog: Option<&VersionCatalog>) -> Option<String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(
            r"\b(compileSdk|compileSdkVersion|minSdk|minSdkVersion|targetSdk|targetSdkVersion)\b\s*(?:=|\()?\s*(\d+|libs\.versions\.[A-Za-z0-9_.]+)",
        )
        .expect("valid regex")
    });

    re.captures_iter(content)
        .filter(|c| keys.contains(&&c[1]))
        .find_map(|c| {
            let value = &c[2];
            match value.strip_prefix("libs.versions.") {
                Some(key) => {
                    let key = key
                        .trim_end_matches(".toInt")
                        .trim_end_matches(".get")
                        .trim_end_matches(".toInt")
                        .trim_end_matches(".get");
                    catalog.and_then(|c| c.version(key)).map(str::to_string)
                }
                None => Some(value.to_string()),
            }
        })
}
