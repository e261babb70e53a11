//! Gradle version catalog (`libs.versions.toml`) parser.

use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;
use toml::{Table, Value};

use crate::error::CatalogError;

/// Accessor form of a catalog key: `_` and `.` become `-`.
///
/// `androidx.core_ktx`, `androidx-core-ktx` and the accessor
/// `libs.androidx.core.ktx` (minus the `libs.` prefix) all normalize to the
/// same key.
pub fn normalize_alias(alias: &str) -> String {
    alias.replace(['_', '.'], "-")
}

/// An entry of `[versions]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogVersion {
    pub name: String,
    pub version: String,
}

/// An entry of `[libraries]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogLibrary {
    pub name: String,
    pub group: String,
    pub lib_name: String,
    /// Declared or resolved version
    pub version: Option<String>,
    /// `version.ref` key, when the version is a reference
    pub version_ref: Option<String>,
    /// `group:lib_name`
    pub id: String,
}

/// An entry of `[plugins]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogPlugin {
    pub name: String,
    pub id: String,
    pub version: Option<String>,
    pub version_ref: Option<String>,
}

/// An entry of `[bundles]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogBundle {
    pub name: String,
    /// Library aliases, as written
    pub artifacts: Vec<String>,
}

/// A parsed version catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VersionCatalog {
    pub versions: Vec<CatalogVersion>,
    pub libraries: Vec<CatalogLibrary>,
    pub plugins: Vec<CatalogPlugin>,
    pub bundles: Vec<CatalogBundle>,
    #[serde(skip)]
    library_index: HashMap<String, usize>,
    #[serde(skip)]
    plugin_index: HashMap<String, usize>,
    #[serde(skip)]
    bundle_index: HashMap<String, usize>,
}

impl VersionCatalog {
    /// Read and parse a catalog file.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let text = fs::read_to_string(path).map_err(|source| CatalogError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text).map_err(|source| CatalogError::ParseError {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse catalog text.
    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        let table: Table = text.parse()?;

        let mut versions: Vec<CatalogVersion> = section(&table, "versions")
            .filter_map(|(name, value)| {
                let version = version_value(value);
                if version.is_none() {
                    tracing::warn!(name = %name, "Skipping unreadable catalog version");
                }
                version.map(|version| CatalogVersion {
                    name: name.clone(),
                    version,
                })
            })
            .collect();
        versions.sort_by(|a, b| a.name.cmp(&b.name));

        let version_map: HashMap<String, String> = versions
            .iter()
            .map(|v| (normalize_alias(&v.name), v.version.clone()))
            .collect();

        let mut libraries: Vec<CatalogLibrary> = section(&table, "libraries")
            .filter_map(|(name, value)| {
                let library = parse_library(name, value, &version_map);
                if library.is_none() {
                    tracing::warn!(name = %name, "Skipping catalog library without coordinates");
                }
                library
            })
            .collect();
        libraries.sort_by(|a, b| a.name.cmp(&b.name));

        let mut plugins: Vec<CatalogPlugin> = section(&table, "plugins")
            .filter_map(|(name, value)| {
                let plugin = parse_plugin(name, value, &version_map);
                if plugin.is_none() {
                    tracing::warn!(name = %name, "Skipping catalog plugin without id");
                }
                plugin
            })
            .collect();
        plugins.sort_by(|a, b| a.name.cmp(&b.name));

        let bundles = scan_bundles(text);

        Ok(Self::from_parts(versions, libraries, plugins, bundles))
    }

    fn from_parts(
        versions: Vec<CatalogVersion>,
        libraries: Vec<CatalogLibrary>,
        plugins: Vec<CatalogPlugin>,
        bundles: Vec<CatalogBundle>,
    ) -> Self {
        fn index<T>(items: &[T], name: impl Fn(&T) -> &str) -> HashMap<String, usize> {
            items
                .iter()
                .enumerate()
                .map(|(i, item)| (normalize_alias(name(item)), i))
                .collect()
        }

        Self {
            library_index: index(&libraries, |l| l.name.as_str()),
            plugin_index: index(&plugins, |p| p.name.as_str()),
            bundle_index: index(&bundles, |b| b.name.as_str()),
            versions,
            libraries,
            plugins,
            bundles,
        }
    }

    pub fn version(&self, name: &str) -> Option<&str> {
        let key = normalize_alias(name);
        self.versions
            .iter()
            .find(|v| normalize_alias(&v.name) == key)
            .map(|v| v.version.as_str())
    }

    pub fn library(&self, alias: &str) -> Option<&CatalogLibrary> {
        self.library_index
            .get(&normalize_alias(alias))
            .map(|i| &self.libraries[*i])
    }

    pub fn plugin(&self, alias: &str) -> Option<&CatalogPlugin> {
        self.plugin_index
            .get(&normalize_alias(alias))
            .map(|i| &self.plugins[*i])
    }

    pub fn bundle(&self, alias: &str) -> Option<&CatalogBundle> {
        self.bundle_index
            .get(&normalize_alias(alias))
            .map(|i| &self.bundles[*i])
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
            && self.libraries.is_empty()
            && self.plugins.is_empty()
            && self.bundles.is_empty()
    }
}

fn section<'a>(table: &'a Table, name: &str) -> impl Iterator<Item = (&'a String, &'a Value)> {
    table
        .get(name)
        .and_then(Value::as_table)
        .into_iter()
        .flat_map(|t| t.iter())
}

/// A plain string, or the first of `strictly`, `require`, `prefer` in a
/// rich version table.
fn version_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Table(t) => ["strictly", "require", "prefer"]
            .iter()
            .find_map(|k| t.get(*k).and_then(Value::as_str))
            .map(str::to_string),
        _ => None,
    }
}

/// Version of a library or plugin table: `version = "x"`, `version.ref = "k"`,
/// `version = { ref = "k" }` or a rich version table. Returns the version
/// and the reference key, if any.
fn declared_version(
    table: &Table,
    versions: &HashMap<String, String>,
) -> (Option<String>, Option<String>) {
    match table.get("version") {
        Some(Value::Table(t)) => match t.get("ref").and_then(Value::as_str) {
            Some(key) => (
                versions.get(&normalize_alias(key)).cloned(),
                Some(key.to_string()),
            ),
            None => (version_value(&Value::Table(t.clone())), None),
        },
        Some(value) => (version_value(value), None),
        None => (None, None),
    }
}

fn parse_library(
    name: &str,
    value: &Value,
    versions: &HashMap<String, String>,
) -> Option<CatalogLibrary> {
    let (group, lib_name, version, version_ref) = match value {
        Value::String(s) => {
            let mut parts = s.split(':');
            let group = parts.next()?.trim().to_string();
            let artifact = parts.next()?.trim().to_string();
            let version = parts.next().map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
            (group, artifact, version, None)
        }
        Value::Table(t) => {
            let (group, artifact) = match t.get("module").and_then(Value::as_str) {
                Some(module) => {
                    let (g, a) = module.split_once(':')?;
                    (g.trim().to_string(), a.trim().to_string())
                }
                None => (
                    t.get("group")?.as_str()?.to_string(),
                    t.get("name")?.as_str()?.to_string(),
                ),
            };
            let (version, version_ref) = declared_version(t, versions);
            (group, artifact, version, version_ref)
        }
        _ => return None,
    };

    if group.is_empty() || lib_name.is_empty() {
        return None;
    }
    Some(CatalogLibrary {
        name: name.to_string(),
        id: format!("{}:{}", group, lib_name),
        group,
        lib_name,
        version,
        version_ref,
    })
}

fn parse_plugin(
    name: &str,
    value: &Value,
    versions: &HashMap<String, String>,
) -> Option<CatalogPlugin> {
    let (id, version, version_ref) = match value {
        Value::String(s) => match s.split_once(':') {
            Some((id, version)) => (id.trim().to_string(), Some(version.trim().to_string()), None),
            None => (s.trim().to_string(), None, None),
        },
        Value::Table(t) => {
            let id = t.get("id")?.as_str()?.to_string();
            let (version, version_ref) = declared_version(t, versions);
            (id, version, version_ref)
        }
        _ => return None,
    };

    if id.is_empty() {
        return None;
    }
    Some(CatalogPlugin {
        name: name.to_string(),
        id,
        version,
        version_ref,
    })
}

/// Drop a `#` comment that is not inside a string.
fn strip_toml_comment(line: &str) -> &str {
    let mut quote: Option<char> = None;
    for (i, c) in line.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c == '#' => return &line[..i],
            None => {}
        }
    }
    line
}

fn bundle_members(text: &str) -> Vec<String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r#""([^"]+)"|'([^']+)'"#).expect("valid regex"));
    re.captures_iter(text)
        .filter_map(|c| c.get(1).or_else(|| c.get(2)))
        .map(|m| m.as_str().trim().to_string())
        .collect()
}

/// Read `[bundles]` line by line, following arrays across lines until the
/// closing bracket.
fn scan_bundles(text: &str) -> Vec<CatalogBundle> {
    let mut bundles = Vec::new();
    let mut in_bundles = false;
    let mut open: Option<CatalogBundle> = None;

    for raw in text.lines() {
        let line = strip_toml_comment(raw).trim();
        if line.is_empty() {
            continue;
        }

        if let Some(bundle) = open.as_mut() {
            let (body, closed) = match line.find(']') {
                Some(end) => (&line[..end], true),
                None => (line, false),
            };
            bundle.artifacts.extend(bundle_members(body));
            if closed {
                bundles.extend(open.take());
            }
            continue;
        }

        if line.starts_with('[') {
            in_bundles = line == "[bundles]";
            continue;
        }
        if !in_bundles {
            continue;
        }

        let Some((key, rest)) = line.split_once('=') else {
            continue;
        };
        let name = key.trim().trim_matches(|c| c == '"' || c == '\'').to_string();
        let Some(body) = rest.trim().strip_prefix('[') else {
            continue;
        };

        let mut bundle = CatalogBundle {
            name,
            artifacts: Vec::new(),
        };
        match body.find(']') {
            Some(end) => {
                bundle.artifacts = bundle_members(&body[..end]);
                bundles.push(bundle);
            }
            None => {
                bundle.artifacts = bundle_members(body);
                open = Some(bundle);
            }
        }
    }

    bundles.extend(open);
    bundles.sort_by(|a, b| a.name.cmp(&b.name));
    bundles
}
