use super::Dependency;
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

pub trait DependencyParser: Send + Sync {
    /// Declared dependencies, or `None` when the content is not a valid manifest
    fn parse(&self, content: &str) -> Option<Vec<Dependency>>;
}

struct Collector {
    deps: Vec<Dependency>,
    seen: HashSet<String>,
}

impl Collector {
    fn new() -> Self {
        Self {
            deps: Vec::new(),
            seen: HashSet::new(),
        }
    }

    fn push(&mut self, name: &str, version: Option<String>) {
        if name.is_empty() || !self.seen.insert(name.to_string()) {
            return;
        }
        self.deps.push(Dependency {
            name: name.to_string(),
            version,
        });
    }

    fn finish(self) -> Vec<Dependency> {
        self.deps
    }
}

pub struct JsonDependencyParser {
    pub dependencies_keys: &'static [&'static str],
}

impl DependencyParser for JsonDependencyParser {
    fn parse(&self, content: &str) -> Option<Vec<Dependency>> {
        let parsed: serde_json::Value = serde_json::from_str(content).ok()?;
        let mut collector = Collector::new();

        for key in self.dependencies_keys {
            if let Some(deps) = parsed.get(key).and_then(|v| v.as_object()) {
                for (name, version) in deps {
                    collector.push(name, version.as_str().map(String::from));
                }
            }
        }

        Some(collector.finish())
    }
}

pub struct TomlDependencyParser {
    pub dependencies_keys: &'static [&'static str],
}

impl DependencyParser for TomlDependencyParser {
    fn parse(&self, content: &str) -> Option<Vec<Dependency>> {
        let parsed: toml::Value = toml::from_str(content).ok()?;
        let mut collector = Collector::new();

        for key in self.dependencies_keys {
            if let Some(table) = lookup_table(&parsed, key) {
                collect_toml_table(&mut collector, table);
            }
        }

        Some(collector.finish())
    }
}

/// PEP 621 `[project]` metadata plus Poetry's `[tool.poetry]` tables
pub struct PyprojectDependencyParser;

impl DependencyParser for PyprojectDependencyParser {
    fn parse(&self, content: &str) -> Option<Vec<Dependency>> {
        let parsed: toml::Value = toml::from_str(content).ok()?;
        let mut collector = Collector::new();

        if let Some(project) = parsed.get("project") {
            if let Some(deps) = project.get("dependencies").and_then(|v| v.as_array()) {
                collect_pep508(&mut collector, deps);
            }
            if let Some(optional) = project
                .get("optional-dependencies")
                .and_then(|v| v.as_table())
            {
                for deps in optional.values().filter_map(|v| v.as_array()) {
                    collect_pep508(&mut collector, deps);
                }
            }
        }

        if let Some(poetry) = lookup_table(&parsed, "tool.poetry") {
            for key in ["dependencies", "dev-dependencies"] {
                if let Some(table) = poetry.get(key).and_then(|v| v.as_table()) {
                    collect_toml_table(&mut collector, table);
                }
            }
            if let Some(groups) = poetry.get("group").and_then(|v| v.as_table()) {
                for group in groups.values() {
                    if let Some(table) = group.get("dependencies").and_then(|v| v.as_table()) {
                        collect_toml_table(&mut collector, table);
                    }
                }
            }
        }

        Some(collector.finish())
    }
}

fn lookup_table<'a>(value: &'a toml::Value, dotted: &str) -> Option<&'a toml::value::Table> {
    dotted
        .split('.')
        .try_fold(value, |current, key| current.get(key))
        .and_then(|v| v.as_table())
}

fn collect_toml_table(collector: &mut Collector, table: &toml::value::Table) {
    for (name, value) in table {
        let version = if let Some(v) = value.as_str() {
            Some(v.to_string())
        } else {
            value
                .as_table()
                .and_then(|t| t.get("version"))
                .and_then(|v| v.as_str())
                .map(String::from)
        };
        collector.push(name, version);
    }
}

fn collect_pep508(collector: &mut Collector, entries: &[toml::Value]) {
    for entry in entries.iter().filter_map(|v| v.as_str()) {
        if let Some(caps) = requirement_pattern().captures(entry.trim()) {
            if let Some(name) = caps.get(1) {
                collector.push(name.as_str(), caps.get(2).map(|m| m.as_str().to_string()));
            }
        }
    }
}

pub(crate) fn requirement_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"^([A-Za-z0-9][A-Za-z0-9._-]*)\s*(?:\[[^\]]*\])?\s*(?:\(?\s*((?:==|>=|<=|~=|!=|===|>|<)\s*[^\s;,#)]+))?",
        )
        .expect("requirement pattern is valid")
    })
}

pub struct RegexDependencyParser {
    pub line_pattern: &'static Regex,
    pub skip_prefixes: &'static [&'static str],
}

impl DependencyParser for RegexDependencyParser {
    fn parse(&self, content: &str) -> Option<Vec<Dependency>> {
        let mut collector = Collector::new();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty()
                || line.starts_with('#')
                || line.starts_with("//")
                || self.skip_prefixes.iter().any(|p| line.starts_with(p))
            {
                continue;
            }

            if let Some(caps) = self.line_pattern.captures(line) {
                if let Some(name) = caps.get(1) {
                    collector.push(name.as_str(), caps.get(2).map(|m| m.as_str().to_string()));
                }
            }
        }

        Some(collector.finish())
    }
}

/// `go.mod`; only `require` directives count, whether written on one line
/// or as a parenthesised block. `replace`, `exclude` and `retract` name
/// modules that are not requirements and are skipped along with their blocks.
pub struct GoModDependencyParser;

impl DependencyParser for GoModDependencyParser {
    fn parse(&self, content: &str) -> Option<Vec<Dependency>> {
        let mut collector = Collector::new();
        let mut block: Option<&str> = None;

        for line in content.lines() {
            let line = line.split("//").next().unwrap_or_default().trim();
            if line.is_empty() {
                continue;
            }

            if let Some(directive) = block {
                if line.starts_with(')') {
                    block = None;
                } else if directive == "require" {
                    push_go_requirement(&mut collector, line);
                }
                continue;
            }

            let (directive, rest) = match line.find(|c: char| c.is_whitespace() || c == '(') {
                Some(at) => (&line[..at], line[at..].trim()),
                None => (line, ""),
            };
            if rest.starts_with('(') {
                block = Some(directive);
            } else if directive == "require" {
                push_go_requirement(&mut collector, rest);
            }
        }

        Some(collector.finish())
    }
}

fn push_go_requirement(collector: &mut Collector, spec: &str) {
    if let Some(caps) = go_require_pattern().captures(spec) {
        if let Some(name) = caps.get(1) {
            collector.push(name.as_str(), caps.get(2).map(|m| m.as_str().to_string()));
        }
    }
}

fn go_require_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(\S+)\s+(v\d\S*)").expect("go.mod pattern is valid"))
}

pub(crate) fn gem_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"^gem\s+['"]([^'"]+)['"](?:\s*,\s*['"]([^'"]+)['"])?"#)
            .expect("Gemfile pattern is valid")
    })
}

pub struct YamlDependencyParser {
    pub dependencies_keys: &'static [&'static str],
}

impl DependencyParser for YamlDependencyParser {
    fn parse(&self, content: &str) -> Option<Vec<Dependency>> {
        let parsed: serde_yaml::Value = serde_yaml::from_str(content).ok()?;
        let mut collector = Collector::new();

        for key in self.dependencies_keys {
            if let Some(deps) = parsed.get(*key).and_then(|v| v.as_mapping()) {
                for (name, value) in deps {
                    if let Some(name) = name.as_str() {
                        let version = value
                            .as_str()
                            .map(String::from)
                            .or_else(|| value.as_f64().map(|v| v.to_string()));
                        collector.push(name, version);
                    }
                }
            }
        }

        Some(collector.finish())
    }
}

/// Maven `pom.xml`; dependencies are named `groupId:artifactId`
pub struct PomDependencyParser;

impl DependencyParser for PomDependencyParser {
    fn parse(&self, content: &str) -> Option<Vec<Dependency>> {
        let doc = roxmltree::Document::parse(content).ok()?;
        let mut collector = Collector::new();

        let child_text = |node: roxmltree::Node, tag: &str| -> Option<String> {
            node.children()
                .find(|c| c.has_tag_name(tag))
                .and_then(|c| c.text())
                .map(|t| t.trim().to_string())
        };

        for node in doc
            .descendants()
            .filter(|n| n.has_tag_name("dependency") || n.has_tag_name("parent"))
        {
            let (Some(group), Some(artifact)) =
                (child_text(node, "groupId"), child_text(node, "artifactId"))
            else {
                continue;
            };
            collector.push(&format!("{}:{}", group, artifact), child_text(node, "version"));
        }

        Some(collector.finish())
    }
}
