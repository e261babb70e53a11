//! Dependency and plugin extraction from module build scripts.
//!
//! Build scripts are read line by line after comment stripping. Only the
//! declaration shapes commonly found in Android projects are recognized; a
//! line that matches none of them is ignored.

use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::OnceLock;

use super::catalog::VersionCatalog;
use super::settings::strip_comments;
use crate::storage::GradleModulesInfo;

/// Configuration names accepted as dependency declarations. A configuration
/// matches when its lowercase form equals or ends with one of these.
const CONFIGURATIONS: &[&str] = &[
    "implementation",
    "api",
    "compileonly",
    "runtimeonly",
    "kapt",
    "ksp",
    "annotationprocessor",
    "classpath",
    "lintchecks",
    "detektplugins",
    "coredesugaring",
    "corelibrarydesugaring",
    "androidtestutil",
    "compile",
];

/// Calls that look like an alias but are dependency helpers or file sets.
const NON_ALIASES: &[&str] = &["files", "fileTree", "gradleApi", "localGroovy", "project", "kotlin"];

pub fn is_configuration(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    CONFIGURATIONS.iter().any(|c| lower.ends_with(c))
}

/// How a dependency was declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyStyle {
    /// `"group:artifact:version"` string
    Direct,
    /// `libs.some.library`
    Catalog,
    /// `libs.bundles.name`
    Bundle,
    /// A bare identifier
    Alias,
}

/// How a plugin was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginStyle {
    /// `id("x") version "v"`
    Id,
    /// `alias(libs.plugins.x)`
    Catalog,
    /// `kotlin("android")`
    Kotlin,
    /// `apply plugin: "x"`
    Apply,
}

impl fmt::Display for DependencyStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DependencyStyle::Direct => "direct",
            DependencyStyle::Catalog => "catalog",
            DependencyStyle::Bundle => "bundle",
            DependencyStyle::Alias => "alias",
        };
        f.write_str(s)
    }
}

impl fmt::Display for PluginStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PluginStyle::Id => "id",
            PluginStyle::Catalog => "catalog",
            PluginStyle::Kotlin => "kotlin",
            PluginStyle::Apply => "apply",
        };
        f.write_str(s)
    }
}

/// A declared external dependency.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dependency {
    /// Empty for an alias that could not be resolved
    pub group: String,
    pub artifact: String,
    pub version: Option<String>,
    /// Gradle path of the declaring module
    pub module: String,
    pub configuration: String,
    pub style: DependencyStyle,
    /// Catalog accessor or alias the dependency came from
    pub source_alias: Option<String>,
    /// Versions present in the local module cache
    pub available_versions: Vec<String>,
    pub is_version_synced: bool,
}

impl Dependency {
    /// `group:artifact`, or the bare artifact when the group is unknown.
    pub fn coordinate(&self) -> String {
        if self.group.is_empty() {
            self.artifact.clone()
        } else {
            format!("{}:{}", self.group, self.artifact)
        }
    }

    /// Coordinate with the version appended when known.
    pub fn notation(&self) -> String {
        match &self.version {
            Some(v) => format!("{}:{}", self.coordinate(), v),
            None => self.coordinate(),
        }
    }

    pub fn is_resolved(&self) -> bool {
        !self.group.is_empty()
    }
}

/// An applied plugin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plugin {
    pub id: String,
    pub version: Option<String>,
    pub module: String,
    pub style: PluginStyle,
    pub source_alias: Option<String>,
    pub available_versions: Vec<String>,
    pub is_version_synced: bool,
}

/// A module-to-module edge such as `implementation(project(":core"))`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectDependency {
    pub module: String,
    pub configuration: String,
    /// Gradle path of the referenced module
    pub target: String,
}

/// Everything declared in one build script.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Declarations {
    pub dependencies: Vec<Dependency>,
    pub plugins: Vec<Plugin>,
    pub project_dependencies: Vec<ProjectDependency>,
}

/// Lookups available while extracting.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractContext<'a> {
    pub catalog: Option<&'a VersionCatalog>,
    /// `gradle.properties` entries for `$name` interpolation
    pub properties: Option<&'a BTreeMap<String, String>>,
}

macro_rules! regex {
    ($name:ident, $pattern:expr) => {
        fn $name() -> &'static Regex {
            static RE: OnceLock<Regex> = OnceLock::new();
            RE.get_or_init(|| Regex::new($pattern).expect("valid regex"))
        }
    };
}

regex!(call_re, r"^([A-Za-z_][A-Za-z0-9_]*)\s*(.*)$");
regex!(block_open_re, r"^([A-Za-z_][A-Za-z0-9_]*)\s*(?:\([^)]*\))?\s*\{");
regex!(wrapper_re, r"^\(?\s*(?:platform|enforcedPlatform)\s*\(\s*");
regex!(quoted_re, r#"^\(?\s*["']([^"']+)["']"#);
regex!(map_notation_re, r#"\b(group|name|version)\s*[:=]\s*["']([^"']+)["']"#);
regex!(project_re, r#"^\(?\s*project\s*\(\s*(?:path\s*[:=]\s*)?["']([^"']+)["']"#);
regex!(accessor_re, r"^\(?\s*([A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z_][A-Za-z0-9_]*)*)(\s*\()?");
regex!(kotlin_dep_re, r#"^\(?\s*kotlin\s*\(\s*["']([^"']+)["']\s*(?:,\s*["']([^"']+)["'])?"#);
regex!(
    plugin_id_re,
    r#"\bid\s*\(?\s*["']([^"']+)["']\s*\)?(?:\s*\.?\s*version\s*\(?\s*["']([^"']+)["'])?"#
);
regex!(plugin_alias_re, r"\balias\s*\(\s*libs\.plugins\.([A-Za-z0-9_.]+?)(?:\.get\(\))?\s*\)");
regex!(
    plugin_kotlin_re,
    r#"\bkotlin\s*\(\s*["']([^"']+)["']\s*\)(?:\s*\.?\s*version\s*\(?\s*["']([^"']+)["'])?"#
);
regex!(apply_re, r#"\bapply\s*\(?\s*plugin\s*[:=]\s*["']([^"']+)["']"#);
regex!(
    assignment_re,
    r#"^(?:(?:val|var|def)\s+|ext\.|extra\[\s*["']|project\.ext\.)?([A-Za-z_][A-Za-z0-9_]*)["']?\s*\]?\s*(?::\s*String\s*)?(?:by\s+extra\s*\()?=?\s*\(?\s*["']([^"'$]*)["']"#
);
regex!(interpolation_re, r"\$\{?([A-Za-z_][A-Za-z0-9_.]*)\}?");
regex!(coordinate_part_re, r"^[\w.\-]+$");

/// String values assigned with `val`/`var`/`def`, `ext.x = ` or inside an
/// `ext { }` block.
pub fn collect_variables(text: &str) -> HashMap<String, String> {
    let mut vars = HashMap::new();
    let mut blocks = BlockStack::default();
    for line in text.lines() {
        let trimmed = line.trim();
        let declared = trimmed.starts_with("val ")
            || trimmed.starts_with("var ")
            || trimmed.starts_with("def ")
            || trimmed.starts_with("ext.")
            || trimmed.starts_with("extra[")
            || trimmed.starts_with("project.ext.")
            || (blocks.inside("ext") && trimmed.contains('='));
        if declared {
            if let Some(caps) = assignment_re().captures(trimmed) {
                vars.insert(caps[1].to_string(), caps[2].to_string());
            }
        }
        blocks.feed(trimmed);
    }
    vars
}

/// Names of the currently open `{ }` blocks.
#[derive(Debug, Default)]
struct BlockStack {
    names: Vec<String>,
}

impl BlockStack {
    fn inside(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Name of the block this line opens, if any.
    fn opener(line: &str) -> Option<&str> {
        block_open_re()
            .captures(line)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
    }

    fn feed(&mut self, line: &str) {
        let mut name = Self::opener(line).map(str::to_string);
        let mut quote: Option<char> = None;
        for c in line.chars() {
            match quote {
                Some(q) if c == q => quote = None,
                Some(_) => {}
                None => match c {
                    '"' | '\'' => quote = Some(c),
                    '{' => self.names.push(name.take().unwrap_or_default()),
                    '}' => {
                        self.names.pop();
                    }
                    _ => {}
                },
            }
        }
    }
}

struct Extractor<'a> {
    module: &'a str,
    ctx: ExtractContext<'a>,
    variables: HashMap<String, String>,
    out: Declarations,
}

/// Extract every declaration from a build script.
pub fn extract(text: &str, module: &str, ctx: ExtractContext<'_>) -> Declarations {
    let text = strip_comments(text);
    let mut extractor = Extractor {
        module,
        ctx,
        variables: collect_variables(&text),
        out: Declarations::default(),
    };

    let mut blocks = BlockStack::default();
    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        let opener = BlockStack::opener(line);
        let in_plugins = blocks.inside("plugins") || opener == Some("plugins");
        extractor.plugins(line, in_plugins);

        // `dependencies { implementation(...) }` on one line
        let statement = match opener {
            Some("dependencies") => line.split_once('{').map_or(line, |(_, rest)| rest.trim()),
            _ => line,
        };
        if !in_plugins {
            extractor.dependency(statement);
        }

        blocks.feed(line);
    }

    tracing::trace!(
        module,
        dependencies = extractor.out.dependencies.len(),
        plugins = extractor.out.plugins.len(),
        "Extracted build script"
    );
    extractor.out
}

impl<'a> Extractor<'a> {
    fn plugins(&mut self, line: &str, in_plugins: bool) {
        if in_plugins {
            for caps in plugin_id_re().captures_iter(line) {
                let version = caps.get(2).map(|m| self.interpolate(m.as_str()));
                self.push_plugin(caps[1].to_string(), version, PluginStyle::Id, None);
            }
            for caps in plugin_kotlin_re().captures_iter(line) {
                let id = format!("org.jetbrains.kotlin.{}", &caps[1]);
                let version = caps.get(2).map(|m| self.interpolate(m.as_str()));
                self.push_plugin(id, version, PluginStyle::Kotlin, None);
            }
        }

        for caps in plugin_alias_re().captures_iter(line) {
            let alias = caps[1].to_string();
            let entry = self.ctx.catalog.and_then(|c| c.plugin(&alias));
            let (id, version) = match entry {
                Some(p) => (p.id.clone(), p.version.clone()),
                None => {
                    tracing::debug!(alias = %alias, "Plugin alias not found in catalog");
                    (alias.clone(), None)
                }
            };
            let source = format!("libs.plugins.{}", alias);
            self.push_plugin(id, version, PluginStyle::Catalog, Some(source));
        }

        for caps in apply_re().captures_iter(line) {
            self.push_plugin(caps[1].to_string(), None, PluginStyle::Apply, None);
        }
    }

    fn push_plugin(
        &mut self,
        id: String,
        version: Option<String>,
        style: PluginStyle,
        source_alias: Option<String>,
    ) {
        self.out.plugins.push(Plugin {
            id,
            version,
            module: self.module.to_string(),
            style,
            source_alias,
            available_versions: Vec::new(),
            is_version_synced: false,
        });
    }

    fn dependency(&mut self, line: &str) {
        let Some(caps) = call_re().captures(line) else {
            return;
        };
        let configuration = &caps[1];
        if !is_configuration(configuration) {
            return;
        }
        let mut args = caps[2].trim();
        // `implementation = ...` is an assignment, not a declaration
        if args.starts_with('=') || args.is_empty() {
            return;
        }

        while let Some(m) = wrapper_re().find(args) {
            args = &args[m.end()..];
        }

        if let Some(c) = project_re().captures(args) {
            self.out.project_dependencies.push(ProjectDependency {
                module: self.module.to_string(),
                configuration: configuration.to_string(),
                target: normalize_module_path(&c[1]),
            });
            return;
        }

        if let Some(c) = kotlin_dep_re().captures(args) {
            let artifact = format!("kotlin-{}", &c[1]);
            let version = c.get(2).map(|m| self.interpolate(m.as_str()));
            self.push_direct(configuration, "org.jetbrains.kotlin", &artifact, version);
            return;
        }

        if let Some(c) = quoted_re().captures(args) {
            let notation = c[1].to_string();
            self.direct(configuration, &notation);
            return;
        }

        if args.contains("group") && args.contains("name") {
            self.map_notation(configuration, args);
            return;
        }

        if let Some(c) = accessor_re().captures(args) {
            let accessor = c[1].trim_end_matches(".get").to_string();
            let is_call = c.get(2).is_some();
            if let Some(path) = accessor.strip_prefix("projects.") {
                self.out.project_dependencies.push(ProjectDependency {
                    module: self.module.to_string(),
                    configuration: configuration.to_string(),
                    target: accessor_to_module(path),
                });
            } else if let Some(bundle) = accessor.strip_prefix("libs.bundles.") {
                self.bundle(configuration, bundle);
            } else if let Some(alias) = accessor.strip_prefix("libs.") {
                if !alias.starts_with("plugins.") && !alias.starts_with("versions.") {
                    self.catalog(configuration, alias, DependencyStyle::Catalog, &accessor);
                }
            } else if !is_call && !NON_ALIASES.contains(&accessor.as_str()) {
                self.catalog(configuration, &accessor, DependencyStyle::Alias, &accessor);
            }
        }
    }

    /// `"group:artifact[:version][:classifier][@ext]"`.
    fn direct(&mut self, configuration: &str, notation: &str) {
        let notation = notation.split('@').next().unwrap_or(notation);
        let parts: Vec<&str> = notation.split(':').collect();
        if parts.len() < 2 || !parts[..2].iter().all(|p| coordinate_part_re().is_match(p)) {
            tracing::trace!(notation, "Not a dependency coordinate");
            return;
        }
        let version = parts
            .get(2)
            .filter(|v| !v.is_empty())
            .map(|v| self.interpolate(v));
        self.push_direct(configuration, parts[0], parts[1], version);
    }

    /// `group: 'g', name: 'a', version: 'v'`.
    fn map_notation(&mut self, configuration: &str, args: &str) {
        let mut fields: HashMap<String, String> = HashMap::new();
        for caps in map_notation_re().captures_iter(args) {
            fields.insert(caps[1].to_string(), caps[2].to_string());
        }
        if let (Some(group), Some(name)) = (fields.get("group"), fields.get("name")) {
            let version = fields.get("version").map(|v| self.interpolate(v));
            self.push_direct(configuration, group, name, version);
        }
    }

    fn push_direct(&mut self, configuration: &str, group: &str, artifact: &str, version: Option<String>) {
        self.push_dependency(configuration, group, artifact, version, DependencyStyle::Direct, None);
    }

    /// Resolve a catalog library; unresolved aliases keep the alias as artifact.
    fn catalog(&mut self, configuration: &str, alias: &str, style: DependencyStyle, source: &str) {
        match self.ctx.catalog.and_then(|c| c.library(alias)) {
            Some(lib) => {
                self.push_dependency(
                    configuration,
                    &lib.group,
                    &lib.lib_name,
                    lib.version.clone(),
                    style,
                    Some(source.to_string()),
                );
            }
            None => {
                tracing::debug!(alias, "Dependency alias not found in catalog");
                self.push_dependency(configuration, "", alias, None, style, Some(source.to_string()));
            }
        }
    }

    fn bundle(&mut self, configuration: &str, name: &str) {
        let members = self
            .ctx
            .catalog
            .and_then(|c| c.bundle(name))
            .map(|b| b.artifacts.clone());
        let source = format!("libs.bundles.{}", name);
        match members {
            Some(members) => {
                for member in members {
                    self.catalog(configuration, &member, DependencyStyle::Bundle, &source);
                }
            }
            None => {
                tracing::debug!(bundle = name, "Bundle not found in catalog");
                self.push_dependency(configuration, "", name, None, DependencyStyle::Bundle, Some(source));
            }
        }
    }

    fn push_dependency(
        &mut self,
        configuration: &str,
        group: &str,
        artifact: &str,
        version: Option<String>,
        style: DependencyStyle,
        source_alias: Option<String>,
    ) {
        self.out.dependencies.push(Dependency {
            group: group.to_string(),
            artifact: artifact.to_string(),
            version,
            module: self.module.to_string(),
            configuration: configuration.to_string(),
            style,
            source_alias,
            available_versions: Vec::new(),
            is_version_synced: false,
        });
    }

    /// Replace `$name` / `${name}` with script variables or properties.
    /// Unknown names are left as written.
    fn interpolate(&self, value: &str) -> String {
        interpolation_re()
            .replace_all(value, |caps: &regex::Captures| {
                let name = &caps[1];
                let last = name.rsplit('.').next().unwrap_or(name);
                self.lookup(name)
                    .or_else(|| self.lookup(last))
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }

    fn lookup(&self, name: &str) -> Option<String> {
        self.variables
            .get(name)
            .cloned()
            .or_else(|| self.ctx.properties.and_then(|p| p.get(name).cloned()))
    }
}

fn normalize_module_path(path: &str) -> String {
    if path.starts_with(':') {
        path.to_string()
    } else {
        format!(":{}", path)
    }
}

/// `projects.core.designSystem` accessor path -> `:core:design-system`.
fn accessor_to_module(path: &str) -> String {
    let segments: Vec<String> = path
        .split('.')
        .map(|segment| {
            let mut out = String::new();
            for (i, c) in segment.chars().enumerate() {
                if c.is_ascii_uppercase() {
                    if i > 0 {
                        out.push('-');
                    }
                    out.push(c.to_ascii_lowercase());
                } else {
                    out.push(c);
                }
            }
            out
        })
        .collect();
    format!(":{}", segments.join(":"))
}

/// Fill `available_versions` and `is_version_synced` from the module cache.
pub fn annotate(declarations: &mut Declarations, modules: &GradleModulesInfo) {
    for dep in &mut declarations.dependencies {
        if !dep.is_resolved() {
            continue;
        }
        dep.available_versions = modules.versions_of(&dep.group, &dep.artifact);
        dep.is_version_synced = dep
            .version
            .as_ref()
            .map_or(false, |v| dep.available_versions.contains(v));
    }
    for plugin in &mut declarations.plugins {
        plugin.available_versions = modules.plugin_versions(&plugin.id);
        plugin.is_version_synced = plugin
            .version
            .as_ref()
            .map_or(false, |v| plugin.available_versions.contains(v));
    }
}

#[cfg(test)]
mod tests {
    use super::super::catalog::VersionCatalog;
    use super::*;
    use crate::storage::{GradleLibraryInfo, GradleVersionInfo};
    use std::path::PathBuf;

    const CATALOG: &str = r#"
[versions]
coreKtx = "1.12.0"
agp = "8.2.0"

[libraries]
androidx-core-ktx = { module = "androidx.core:core-ktx", version.ref = "coreKtx" }
compose-ui = { module = "androidx.compose.ui:ui" }
compose-material3 = { module = "androidx.compose.material3:material3", version = "1.2.0" }
compose-bom = { module = "androidx.compose:compose-bom", version = "2024.02.00" }

[plugins]
android-application = { id = "com.android.application", version.ref = "agp" }

[bundles]
compose = ["compose-ui", "compose-material3"]
"#;

    fn extract_with(text: &str, catalog: Option<&VersionCatalog>) -> Declarations {
        extract(
            text,
            ":app",
            ExtractContext {
                catalog,
                properties: None,
            },
        )
    }

    #[test]
    fn test_configuration_names() {
        assert!(is_configuration("implementation"));
        assert!(is_configuration("debugImplementation"));
        assert!(is_configuration("testImplementation"));
        assert!(is_configuration("kapt"));
        assert!(is_configuration("coreLibraryDesugaring"));
        assert!(is_configuration("detektPlugins"));
        assert!(!is_configuration("compileSdk"));
        assert!(!is_configuration("namespace"));
    }

    #[test]
    fn test_direct_dependencies_kotlin_and_groovy() {
        let decl = extract_with(
            r#"
dependencies {
    implementation("com.squareup.okhttp3:okhttp:4.12.0")
    testImplementation 'junit:junit:4.13.2'
    debugImplementation("com.squareup.leakcanary:leakcanary-android")
    implementation(platform("androidx.compose:compose-bom:2024.02.00"))
    implementation(enforcedPlatform("org.jetbrains.kotlin:kotlin-bom:1.9.22"))
    implementation group: 'com.google.code.gson', name: 'gson', version: '2.10.1'
    implementation("https://repo.example.com")
    implementation("a b:c")
}
"#,
            None,
        );

        let notations: Vec<String> = decl.dependencies.iter().map(|d| d.notation()).collect();
        assert_eq!(
            notations,
            vec![
                "com.squareup.okhttp3:okhttp:4.12.0",
                "junit:junit:4.13.2",
                "com.squareup.leakcanary:leakcanary-android",
                "androidx.compose:compose-bom:2024.02.00",
                "org.jetbrains.kotlin:kotlin-bom:1.9.22",
                "com.google.code.gson:gson:2.10.1",
            ]
        );
        assert!(decl.dependencies.iter().all(|d| d.style == DependencyStyle::Direct));
        assert_eq!(decl.dependencies[1].configuration, "testImplementation");
        assert_eq!(decl.dependencies[0].module, ":app");
    }

    #[test]
    fn test_version_interpolation() {
        let mut props = BTreeMap::new();
        props.insert("roomVersion".to_string(), "2.6.1".to_string());
        let decl = extract(
            r#"
val lifecycle = "2.7.0"
ext.retrofit_version = '2.9.0'
dependencies {
    implementation("androidx.lifecycle:lifecycle-runtime-ktx:$lifecycle")
    implementation "com.squareup.retrofit2:retrofit:${retrofit_version}"
    implementation("androidx.room:room-runtime:$roomVersion")
    implementation("com.example:unknown:$nowhere")
}
"#,
            ":app",
            ExtractContext {
                catalog: None,
                properties: Some(&props),
            },
        );

        let versions: Vec<Option<&str>> = decl
            .dependencies
            .iter()
            .map(|d| d.version.as_deref())
            .collect();
        assert_eq!(
            versions,
            vec![Some("2.7.0"), Some("2.9.0"), Some("2.6.1"), Some("$nowhere")]
        );
    }

    #[test]
    fn test_catalog_bundle_and_alias() {
        let catalog = VersionCatalog::parse(CATALOG).unwrap();
        let decl = extract_with(
            r#"
dependencies {
    implementation(libs.androidx.core.ktx)
    implementation(platform(libs.compose.bom))
    implementation libs.compose.material3.get()
    implementation(libs.bundles.compose)
    implementation(libs.not.there)
    kapt(roomCompiler)
    implementation(libs.bundles.networking)
}
"#,
            Some(&catalog),
        );

        let deps = &decl.dependencies;
        assert_eq!(deps.len(), 8);

        assert_eq!(deps[0].style, DependencyStyle::Catalog);
        assert_eq!(deps[0].notation(), "androidx.core:core-ktx:1.12.0");
        assert_eq!(deps[0].source_alias.as_deref(), Some("libs.androidx.core.ktx"));

        assert_eq!(deps[1].notation(), "androidx.compose:compose-bom:2024.02.00");
        assert_eq!(deps[2].notation(), "androidx.compose.material3:material3:1.2.0");

        assert_eq!(deps[3].style, DependencyStyle::Bundle);
        assert_eq!(deps[3].coordinate(), "androidx.compose.ui:ui");
        assert_eq!(deps[4].coordinate(), "androidx.compose.material3:material3");
        assert_eq!(deps[4].source_alias.as_deref(), Some("libs.bundles.compose"));

        assert_eq!(deps[5].group, "");
        assert_eq!(deps[5].artifact, "not.there");

        assert_eq!(deps[6].style, DependencyStyle::Alias);
        assert_eq!(deps[6].group, "");
        assert_eq!(deps[6].artifact, "roomCompiler");
        assert_eq!(deps[6].version, None);

        assert_eq!(deps[7].style, DependencyStyle::Bundle);
        assert_eq!(deps[7].group, "");
        assert_eq!(deps[7].artifact, "networking");
        assert_eq!(deps[7].version, None);
        assert_eq!(deps[7].source_alias.as_deref(), Some("libs.bundles.networking"));
    }

    #[test]
    fn test_alias_resolved_against_catalog() {
        let catalog = VersionCatalog::parse(CATALOG).unwrap();
        let decl = extract_with("dependencies {\n    implementation(androidx_core_ktx)\n}\n", Some(&catalog));
        assert_eq!(decl.dependencies[0].style, DependencyStyle::Alias);
        assert_eq!(decl.dependencies[0].coordinate(), "androidx.core:core-ktx");
    }

    #[test]
    fn test_project_dependencies() {
        let decl = extract_with(
            r#"
dependencies {
    implementation(project(":core:data"))
    api project(path: ':core:model')
    implementation(projects.feature.designSystem)
    implementation(fileTree(mapOf("dir" to "libs")))
}
"#,
            None,
        );

        let targets: Vec<&str> = decl
            .project_dependencies
            .iter()
            .map(|p| p.target.as_str())
            .collect();
        assert_eq!(targets, vec![":core:data", ":core:model", ":feature:design-system"]);
        assert!(decl.dependencies.is_empty());
    }

    #[test]
    fn test_plugin_styles() {
        let catalog = VersionCatalog::parse(CATALOG).unwrap();
        let decl = extract_with(
            r#"
plugins {
    alias(libs.plugins.android.application)
    id("com.google.devtools.ksp") version "1.9.22-1.0.17"
    id 'kotlin-parcelize'
    id 'org.jetbrains.kotlin.android' version '1.9.22'
    id("io.gitlab.arturbosch.detekt").version("1.23.5")
    kotlin("plugin.serialization") version "1.9.22"
    kotlin("plugin.parcelize").version("1.9.22")
}
apply plugin: 'com.google.gms.google-services'
apply(plugin = "kotlin-kapt")
dependencies {
    implementation(kotlin("stdlib"))
}
"#,
            Some(&catalog),
        );

        let plugins: Vec<(&str, Option<&str>, PluginStyle)> = decl
            .plugins
            .iter()
            .map(|p| (p.id.as_str(), p.version.as_deref(), p.style))
            .collect();
        assert_eq!(
            plugins,
            vec![
                ("com.android.application", Some("8.2.0"), PluginStyle::Catalog),
                ("com.google.devtools.ksp", Some("1.9.22-1.0.17"), PluginStyle::Id),
                ("kotlin-parcelize", None, PluginStyle::Id),
                ("org.jetbrains.kotlin.android", Some("1.9.22"), PluginStyle::Id),
                ("io.gitlab.arturbosch.detekt", Some("1.23.5"), PluginStyle::Id),
                ("org.jetbrains.kotlin.plugin.serialization", Some("1.9.22"), PluginStyle::Kotlin),
                ("org.jetbrains.kotlin.plugin.parcelize", Some("1.9.22"), PluginStyle::Kotlin),
                ("com.google.gms.google-services", None, PluginStyle::Apply),
                ("kotlin-kapt", None, PluginStyle::Apply),
            ]
        );
        assert_eq!(decl.dependencies.len(), 1);
        assert_eq!(decl.dependencies[0].coordinate(), "org.jetbrains.kotlin:kotlin-stdlib");
    }

    #[test]
    fn test_commented_declarations_are_ignored() {
        let decl = extract_with(
            "dependencies {\n    // implementation(\"a:b:1\")\n    /* api(\"c:d:2\") */\n    implementation(\"e:f:3\")\n}\n",
            None,
        );
        assert_eq!(decl.dependencies.len(), 1);
        assert_eq!(decl.dependencies[0].artifact, "f");
    }

    #[test]
    fn test_buildscript_classpath() {
        let decl = extract_with(
            "buildscript {\n    dependencies {\n        classpath 'com.android.tools.build:gradle:8.2.0'\n    }\n}\n",
            None,
        );
        assert_eq!(decl.dependencies[0].configuration, "classpath");
        assert_eq!(decl.dependencies[0].version.as_deref(), Some("8.2.0"));
    }

    #[test]
    fn test_android_block_is_not_a_dependency() {
        let decl = extract_with(
            "android {\n    compileSdk = 34\n    namespace = \"com.example\"\n}\n",
            None,
        );
        assert!(decl.dependencies.is_empty());
        assert!(decl.plugins.is_empty());
    }

    #[test]
    fn test_annotate_marks_synced_versions() {
        let modules = GradleModulesInfo::from_libraries(
            PathBuf::from("/cache"),
            vec![
                GradleLibraryInfo {
                    group: "com.squareup.okhttp3".to_string(),
                    artifact: "okhttp".to_string(),
                    versions: vec![GradleVersionInfo {
                        version: "4.12.0".to_string(),
                        path: PathBuf::from("/cache/okhttp/4.12.0"),
                        size: 0,
                    }],
                    size: 0,
                },
                GradleLibraryInfo {
                    group: "com.android.application".to_string(),
                    artifact: "com.android.application.gradle.plugin".to_string(),
                    versions: vec![GradleVersionInfo {
                        version: "8.1.0".to_string(),
                        path: PathBuf::from("/cache/agp/8.1.0"),
                        size: 0,
                    }],
                    size: 0,
                },
            ],
        );

        let mut decl = extract_with(
            r#"
plugins {
    id("com.android.application") version "8.2.0"
}
dependencies {
    implementation("com.squareup.okhttp3:okhttp:4.12.0")
    implementation("com.squareup.okhttp3:okhttp:4.11.0")
    implementation(someAlias)
}
"#,
            None,
        );
        annotate(&mut decl, &modules);

        assert!(decl.dependencies[0].is_version_synced);
        assert!(!decl.dependencies[1].is_version_synced);
        assert_eq!(decl.dependencies[1].available_versions, vec!["4.12.0"]);
        assert!(decl.dependencies[2].available_versions.is_empty());
        assert!(!decl.dependencies[2].is_version_synced);

        assert!(!decl.plugins[0].is_version_synced);
        assert_eq!(decl.plugins[0].available_versions, vec!["8.1.0"]);
    }

    #[test]
    fn test_collect_variables() {
        let vars = collect_variables(
            "val a = \"1\"\ndef b = '2'\next.c = \"3\"\next {\n    d = '4'\n}\nval e: String = \"5\"\nval f = \"$a\"\n",
        );
        assert_eq!(vars.get("a").map(String::as_str), Some("1"));
        assert_eq!(vars.get("b").map(String::as_str), Some("2"));
        assert_eq!(vars.get("c").map(String::as_str), Some("3"));
        assert_eq!(vars.get("d").map(String::as_str), Some("4"));
        assert_eq!(vars.get("e").map(String::as_str), Some("5"));
        assert!(vars.get("f").is_none());
    }

    #[test]
    fn test_accessor_to_module() {
        assert_eq!(accessor_to_module("core.data"), ":core:data");
        assert_eq!(accessor_to_module("feature.designSystem"), ":feature:design-system");
    }
}
