use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use crate::config::PagekitConfig;

pub const STATE_DIR_NAME: &str = ".pagekit";
pub const CONFIG_FILENAME: &str = "config.toml";

/// File whose presence marks a directory as a project root during heuristic detection.
const PROJECT_ROOT_SENTINEL: &str = "package.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSource {
    Flag,
    Env,
    Config,
    Heuristic,
    Default,
}

impl ValueSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Flag => "flag",
            Self::Env => "env",
            Self::Config => "config",
            Self::Heuristic => "heuristic",
            Self::Default => "default",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PathOverrides {
    pub project_root: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct ResolutionContext {
    pub cwd: PathBuf,
    pub executable_dir: Option<PathBuf>,
}

impl ResolutionContext {
    pub fn from_process() -> Result<Self> {
        let cwd = env::current_dir().context("failed to read current directory")?;
        let executable_dir = env::current_exe()
            .ok()
            .and_then(|path| path.parent().map(Path::to_path_buf));
        Ok(Self {
            cwd,
            executable_dir,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedPaths {
    pub project_root: PathBuf,
    pub content_dir: PathBuf,
    pub state_dir: PathBuf,
    pub config_path: PathBuf,
    pub root_source: ValueSource,
    pub content_source: ValueSource,
    pub config_source: ValueSource,
}

impl ResolvedPaths {
    pub fn diagnostics(&self) -> String {
        format!(
            "project_root={} ({})\ncontent_dir={} ({})\nstate_dir={}\nconfig_path={} ({})",
            normalize_for_display(&self.project_root),
            self.root_source.as_str(),
            normalize_for_display(&self.content_dir),
            self.content_source.as_str(),
            normalize_for_display(&self.state_dir),
            normalize_for_display(&self.config_path),
            self.config_source.as_str(),
        )
    }
}

#[derive(Debug, Clone)]
pub struct RuntimeStatus {
    pub project_root_exists: bool,
    pub content_dir_exists: bool,
    pub config_exists: bool,
    pub warnings: Vec<String>,
}

pub fn inspect_runtime(paths: &ResolvedPaths) -> RuntimeStatus {
    let project_root_exists = paths.project_root.exists();
    let content_dir_exists = paths.content_dir.is_dir();
    let config_exists = paths.config_path.exists();

    let mut warnings = Vec::new();
    if !content_dir_exists {
        warnings.push(format!(
            "content directory {} is missing; nothing will be scanned",
            normalize_for_display(&paths.content_dir)
        ));
    }
    if !config_exists {
        warnings.push(
            "no config file found; built-in defaults are in effect (run `pagekit init` to materialize one)"
                .to_string(),
        );
    }

    RuntimeStatus {
        project_root_exists,
        content_dir_exists,
        config_exists,
        warnings,
    }
}

pub fn ensure_content_dir(paths: &ResolvedPaths) -> Result<()> {
    if !paths.content_dir.is_dir() {
        bail!(
            "content directory does not exist: {}\nPass --project-root or set [scan].content_dir in {}",
            normalize_for_display(&paths.content_dir),
            normalize_for_display(&paths.config_path)
        );
    }
    Ok(())
}

pub fn resolve_paths(
    context: &ResolutionContext,
    overrides: &PathOverrides,
) -> Result<ResolvedPaths> {
    resolve_paths_with_lookup(context, overrides, |key| env::var(key).ok())
}

/// Resolves the config file location only. The content directory is settled by
/// [`apply_config`] once the config file has been read.
fn resolve_paths_with_lookup<F>(
    context: &ResolutionContext,
    overrides: &PathOverrides,
    lookup_env: F,
) -> Result<ResolvedPaths>
where
    F: Fn(&str) -> Option<String>,
{
    let (project_root, root_source) = resolve_project_root(context, overrides, &lookup_env);
    let state_dir = project_root.join(STATE_DIR_NAME);

    let (config_path, config_source) = if let Some(path) = overrides.config.as_deref() {
        (absolutize(path, &project_root), ValueSource::Flag)
    } else if let Some(value) = lookup_env("PAGEKIT_CONFIG") {
        (
            absolutize(Path::new(value.trim()), &project_root),
            ValueSource::Env,
        )
    } else {
        (state_dir.join(CONFIG_FILENAME), ValueSource::Default)
    };

    Ok(ResolvedPaths {
        content_dir: project_root.clone(),
        project_root,
        state_dir,
        config_path,
        root_source,
        content_source: ValueSource::Default,
        config_source,
    })
}

/// Settle the content directory: `PAGEKIT_CONTENT_DIR` > `[scan].content_dir` > project root.
pub fn apply_config(paths: &mut ResolvedPaths, config: &PagekitConfig) {
    apply_config_with_lookup(paths, config, |key| env::var(key).ok());
}

fn apply_config_with_lookup<F>(paths: &mut ResolvedPaths, config: &PagekitConfig, lookup_env: F)
where
    F: Fn(&str) -> Option<String>,
{
    let from_env = lookup_env("PAGEKIT_CONTENT_DIR")
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty());
    let (dir, source) = match from_env {
        Some(dir) => (dir, ValueSource::Env),
        None => match config.scan.content_dir.as_deref().map(str::trim) {
            Some(dir) if !dir.is_empty() => (dir.to_string(), ValueSource::Config),
            _ => return,
        },
    };
    paths.content_dir = absolutize(Path::new(&dir), &paths.project_root);
    paths.content_source = source;
}

#[derive(Debug, Clone)]
pub struct InitReport {
    pub created_dirs: Vec<PathBuf>,
    pub wrote_config: bool,
}

pub fn init_layout(paths: &ResolvedPaths, force: bool) -> Result<InitReport> {
    let mut created_dirs = Vec::new();
    if !paths.state_dir.exists() {
        fs::create_dir_all(&paths.state_dir)
            .with_context(|| format!("failed to create {}", paths.state_dir.display()))?;
        created_dirs.push(paths.state_dir.clone());
    }

    let wrote_config = write_text_file(&paths.config_path, &render_materialized_config(), force)?;
    Ok(InitReport {
        created_dirs,
        wrote_config,
    })
}

pub fn render_materialized_config() -> String {
    let defaults = PagekitConfig::default();
    let file_names = quote_list(&defaults.scan.file_names);
    let excluded_dirs = quote_list(&defaults.scan.excluded_dirs);
    let marker = &defaults.inject.marker;
    let binding = &defaults.inject.binding;

    format!(
        "# pagekit configuration (materialized by `pagekit init`)\n\n[scan]\n# Relative to the project root.\ncontent_dir = \".\"\nfile_names = {file_names}\nexcluded_dirs = {excluded_dirs}\n\n[inject]\nmarker = \"{marker}\"\nbinding = \"{binding}\"\n\n# Override any default presentation class, e.g.:\n# [style]\n# background = \"bg-white\"\n# text_primary = \"text-gray-900\"\n# button_primary = \"bg-black text-white\"\n"
    )
}

fn quote_list(values: &[String]) -> String {
    let quoted = values
        .iter()
        .map(|value| format!("\"{value}\""))
        .collect::<Vec<_>>()
        .join(", ");
    format!("[{quoted}]")
}

fn resolve_project_root<F>(
    context: &ResolutionContext,
    overrides: &PathOverrides,
    lookup_env: &F,
) -> (PathBuf, ValueSource)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = overrides.project_root.as_deref() {
        return (absolutize(path, &context.cwd), ValueSource::Flag);
    }

    if let Some(value) = lookup_env("PAGEKIT_PROJECT_ROOT") {
        return (
            absolutize(Path::new(value.trim()), &context.cwd),
            ValueSource::Env,
        );
    }

    match detect_project_root_heuristic(&context.cwd, context.executable_dir.as_deref()) {
        Some(root) => (root, ValueSource::Heuristic),
        None => (context.cwd.clone(), ValueSource::Default),
    }
}

fn detect_project_root_heuristic(cwd: &Path, executable_dir: Option<&Path>) -> Option<PathBuf> {
    let mut seen = HashSet::new();
    for candidate in candidate_roots(cwd, executable_dir) {
        let key = normalize_for_display(&candidate);
        if !seen.insert(key) {
            continue;
        }
        if candidate.join(PROJECT_ROOT_SENTINEL).is_file() {
            return Some(candidate);
        }
    }
    None
}

fn candidate_roots(cwd: &Path, executable_dir: Option<&Path>) -> Vec<PathBuf> {
    let mut out: Vec<PathBuf> = cwd.ancestors().map(Path::to_path_buf).collect();
    if let Some(exe_dir) = executable_dir {
        out.extend(exe_dir.ancestors().map(Path::to_path_buf));
    }
    out
}

fn absolutize(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

fn write_text_file(path: &Path, content: &str, force: bool) -> Result<bool> {
    if path.exists() && !force {
        return Ok(false);
    }

    let parent = path
        .parent()
        .ok_or_else(|| anyhow::anyhow!("path has no parent: {}", path.display()))?;
    fs::create_dir_all(parent)
        .with_context(|| format!("failed to create parent directory {}", parent.display()))?;
    fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(true)
}

pub fn normalize_for_display(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::fs;
    use std::path::Path;

    use tempfile::tempdir;

    use super::{
        PathOverrides, ResolutionContext, ValueSource, apply_config_with_lookup,
        ensure_content_dir, init_layout, inspect_runtime, normalize_for_display,
        resolve_paths_with_lookup,
    };
    use crate::config::{PagekitConfig, load_config};

    #[test]
    fn resolve_paths_prefers_flag_over_env() {
        let temp = tempdir().expect("tempdir");
        let cwd = temp.path().join("cwd");
        let from_flag = temp.path().join("flag-root");
        fs::create_dir_all(&cwd).expect("create cwd");

        let overrides = PathOverrides {
            project_root: Some(from_flag.clone()),
            ..PathOverrides::default()
        };
        let context = ResolutionContext {
            cwd,
            executable_dir: None,
        };
        let env = HashMap::from([(
            "PAGEKIT_PROJECT_ROOT".to_string(),
            temp.path().join("env-root").to_string_lossy().to_string(),
        )]);

        let resolved = resolve_paths_with_lookup(&context, &overrides, |key| env.get(key).cloned())
            .expect("resolve paths");
        assert_eq!(resolved.project_root, from_flag);
        assert_eq!(resolved.root_source, ValueSource::Flag);
        assert_eq!(resolved.config_path, from_flag.join(".pagekit/config.toml"));
    }

    #[test]
    fn resolve_paths_detects_package_json_ancestor() {
        let temp = tempdir().expect("tempdir");
        let root = temp.path().join("storefront");
        let nested = root.join("app").join("shop");
        fs::create_dir_all(&nested).expect("create nested");
        fs::write(root.join("package.json"), "{}").expect("write package.json");

        let context = ResolutionContext {
            cwd: nested,
            executable_dir: None,
        };
        let resolved = resolve_paths_with_lookup(&context, &PathOverrides::default(), |_| None)
            .expect("resolve");
        assert_eq!(resolved.project_root, root);
        assert_eq!(resolved.root_source, ValueSource::Heuristic);
    }

    #[test]
    fn resolve_paths_falls_back_to_cwd() {
        let temp = tempdir().expect("tempdir");
        let cwd = temp.path().join("plain");
        fs::create_dir_all(&cwd).expect("create cwd");
        let context = ResolutionContext {
            cwd: cwd.clone(),
            executable_dir: None,
        };
        let resolved = resolve_paths_with_lookup(&context, &PathOverrides::default(), |_| None)
            .expect("resolve");
        // A package.json higher up in the temp tree would be a false positive,
        // so only assert the fallback when the heuristic found nothing.
        if resolved.root_source == ValueSource::Default {
            assert_eq!(resolved.project_root, cwd);
        }
    }

    #[test]
    fn content_dir_comes_from_config() {
        let temp = tempdir().expect("tempdir");
        let root = temp.path().join("project");
        fs::create_dir_all(root.join("app")).expect("create app");
        let context = ResolutionContext {
            cwd: root.clone(),
            executable_dir: None,
        };
        let overrides = PathOverrides {
            project_root: Some(root.clone()),
            ..PathOverrides::default()
        };
        let mut paths = resolve_paths_with_lookup(&context, &overrides, |_| None).expect("resolve");
        assert_eq!(paths.content_dir, root);

        let mut config = PagekitConfig::default();
        config.scan.content_dir = Some("app".to_string());
        apply_config_with_lookup(&mut paths, &config, |_| None);
        assert_eq!(paths.content_dir, root.join("app"));
        assert_eq!(paths.content_source, ValueSource::Config);
        ensure_content_dir(&paths).expect("content dir exists");
    }

    #[test]
    fn content_dir_env_override_is_tagged_env() {
        let temp = tempdir().expect("tempdir");
        let root = temp.path().join("project");
        let context = ResolutionContext {
            cwd: root.clone(),
            executable_dir: None,
        };
        let overrides = PathOverrides {
            project_root: Some(root.clone()),
            ..PathOverrides::default()
        };
        let mut paths = resolve_paths_with_lookup(&context, &overrides, |_| None).expect("resolve");

        let mut config = PagekitConfig::default();
        config.scan.content_dir = Some("app".to_string());
        let env = HashMap::from([("PAGEKIT_CONTENT_DIR".to_string(), " src/app ".to_string())]);
        apply_config_with_lookup(&mut paths, &config, |key| env.get(key).cloned());

        assert_eq!(paths.content_dir, root.join("src/app"));
        assert_eq!(paths.content_source, ValueSource::Env);
        assert!(paths.diagnostics().contains("content_dir="));
        assert!(paths.diagnostics().contains("/src/app (env)"));
    }

    #[test]
    fn display_paths_use_forward_slashes() {
        assert_eq!(
            normalize_for_display(Path::new("shop\\cart\\page.jsx")),
            "shop/cart/page.jsx"
        );
    }

    #[test]
    fn init_layout_writes_loadable_config_once() {
        let temp = tempdir().expect("tempdir");
        let root = temp.path().join("project");
        fs::create_dir_all(&root).expect("create root");
        let context = ResolutionContext {
            cwd: root.clone(),
            executable_dir: None,
        };
        let overrides = PathOverrides {
            project_root: Some(root),
            ..PathOverrides::default()
        };
        let paths = resolve_paths_with_lookup(&context, &overrides, |_| None).expect("resolve");

        let first = init_layout(&paths, false).expect("init");
        assert!(first.wrote_config);
        assert_eq!(first.created_dirs, vec![paths.state_dir.clone()]);
        let loaded = load_config(&paths.config_path).expect("load materialized config");
        assert_eq!(loaded, PagekitConfig {
            scan: crate::config::ScanSection {
                content_dir: Some(".".to_string()),
                ..PagekitConfig::default().scan
            },
            ..PagekitConfig::default()
        });

        let second = init_layout(&paths, false).expect("init again");
        assert!(!second.wrote_config);
        assert!(second.created_dirs.is_empty());
    }

    #[test]
    fn inspect_runtime_warns_about_missing_content_dir() {
        let temp = tempdir().expect("tempdir");
        let root = temp.path().join("missing");
        let context = ResolutionContext {
            cwd: temp.path().to_path_buf(),
            executable_dir: None,
        };
        let overrides = PathOverrides {
            project_root: Some(root),
            ..PathOverrides::default()
        };
        let paths = resolve_paths_with_lookup(&context, &overrides, |_| None).expect("resolve");
        let status = inspect_runtime(&paths);
        assert!(!status.content_dir_exists);
        assert!(!status.config_exists);
        assert_eq!(status.warnings.len(), 2);
        let err = ensure_content_dir(&paths).expect_err("must fail");
        assert!(err.to_string().contains("content directory does not exist"));
    }
}
