use std::ffi::OsString;

use crate::cli::{Cli, Mode};
use crate::error::ScanError;
use crate::report::Markers;
use crate::roots::{Root, resolve_roots};

pub const CLASSPATH_ENV: &str = "CLASSPATH";
pub const TYPE_MARKER_ENV: &str = "ANNOTATED_SCAN_TYPE_MARKER";
pub const METHOD_MARKER_ENV: &str = "ANNOTATED_SCAN_METHOD_MARKER";

pub const DEFAULT_TYPE_MARKER: &str = "net.cbojar.annotated.MyAnnotation";
pub const DEFAULT_METHODS_TYPE_MARKER: &str = "net.cbojar.annotated.MyTypeAnnotation";
pub const DEFAULT_METHOD_MARKER: &str = "net.cbojar.annotated.MyMethodAnnotation";

/// Process environment values the scanner reads, captured once.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    pub classpath: Option<OsString>,
    pub type_marker: Option<String>,
    pub method_marker: Option<String>,
}

impl Environment {
    pub fn from_process() -> Self {
        Self {
            classpath: std::env::var_os(CLASSPATH_ENV),
            type_marker: std::env::var(TYPE_MARKER_ENV).ok(),
            method_marker: std::env::var(METHOD_MARKER_ENV).ok(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub roots: Vec<Root>,
    pub markers: Markers,
}

pub fn resolve_config(cli: &Cli, env: &Environment) -> Result<ScanConfig, ScanError> {
    Ok(ScanConfig {
        roots: resolve_search_roots(cli, env)?,
        markers: resolve_markers(cli, env),
    })
}

/// `--classpath` entries then `--root` entries; `$CLASSPATH` only when neither is given.
pub fn resolve_search_roots(cli: &Cli, env: &Environment) -> Result<Vec<Root>, ScanError> {
    let mut roots = Vec::new();
    if let Some(cp) = &cli.classpath {
        roots.extend(resolve_roots(cp));
    }
    roots.extend(cli.roots.iter().map(|r| Root::new(r.as_str())));
    if !roots.is_empty() {
        return Ok(roots);
    }

    match env.classpath.as_deref() {
        Some(cp) if !cp.is_empty() => Ok(resolve_roots(cp)),
        _ => Err(ScanError::UnsupportedLoader),
    }
}

pub fn resolve_mode(cli: &Cli, env: &Environment) -> Mode {
    if let Some(mode) = cli.mode {
        return mode;
    }
    if cli.method_marker.is_some() || non_empty(&env.method_marker).is_some() {
        return Mode::Methods;
    }
    Mode::Types
}

pub fn resolve_markers(cli: &Cli, env: &Environment) -> Markers {
    let mode = resolve_mode(cli, env);
    let default_type = match mode {
        Mode::Types => DEFAULT_TYPE_MARKER,
        Mode::Methods => DEFAULT_METHODS_TYPE_MARKER,
    };

    let type_marker = cli
        .type_marker
        .as_deref()
        .or(non_empty(&env.type_marker))
        .unwrap_or(default_type);

    let method_marker = match mode {
        Mode::Types => None,
        Mode::Methods => Some(
            cli.method_marker
                .as_deref()
                .or(non_empty(&env.method_marker))
                .unwrap_or(DEFAULT_METHOD_MARKER),
        ),
    };

    Markers {
        type_marker: normalize_marker(type_marker),
        method_marker: method_marker.map(normalize_marker),
    }
}

/// Accepts `a.b.C`, `a/b/C`, `@a.b.C` or `La/b/C;` and returns `a.b.C`.
pub fn normalize_marker(raw: &str) -> String {
    let mut s = raw.trim();
    s = s.strip_prefix('@').unwrap_or(s);
    if let Some(inner) = s.strip_prefix('L').and_then(|r| r.strip_suffix(';')) {
        s = inner;
    }
    s.replace('/', ".")
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["annotated-scan"];
        argv.extend_from_slice(args);
        Cli::parse_from(argv)
    }

    #[test]
    fn missing_search_path_is_unsupported() {
        let err = resolve_search_roots(&cli(&[]), &Environment::default()).unwrap_err();
        assert!(matches!(err, ScanError::UnsupportedLoader));

        let env = Environment {
            classpath: Some(OsString::new()),
            ..Environment::default()
        };
        assert!(resolve_search_roots(&cli(&[]), &env).is_err());
    }

    #[test]
    fn cli_search_path_wins_over_environment() {
        let cp = std::env::join_paths(["/a", "/b.jar"]).unwrap();
        let env = Environment {
            classpath: Some(OsString::from("/from-env")),
            ..Environment::default()
        };

        let args = cli(&["--classpath", cp.to_str().unwrap(), "--root", "file:/c/"]);
        let roots = resolve_search_roots(&args, &env).unwrap();
        let locations: Vec<&str> = roots.iter().map(Root::location).collect();
        assert_eq!(locations, vec!["/a", "/b.jar", "file:/c/"]);

        let roots = resolve_search_roots(&cli(&[]), &env).unwrap();
        assert_eq!(roots, vec![Root::new("/from-env")]);
    }

    #[test]
    fn defaults_depend_on_mode() {
        let env = Environment::default();

        let types = resolve_markers(&cli(&[]), &env);
        assert_eq!(types.type_marker, DEFAULT_TYPE_MARKER);
        assert_eq!(types.method_marker, None);

        let methods = resolve_markers(&cli(&["--mode", "methods"]), &env);
        assert_eq!(methods.type_marker, DEFAULT_METHODS_TYPE_MARKER);
        assert_eq!(methods.method_marker.as_deref(), Some(DEFAULT_METHOD_MARKER));
    }

    #[test]
    fn method_marker_implies_methods_mode() {
        let markers = resolve_markers(
            &cli(&["--method-marker", "com/example/Route"]),
            &Environment::default(),
        );
        assert_eq!(markers.method_marker.as_deref(), Some("com.example.Route"));

        let env = Environment {
            method_marker: Some("a.M".to_string()),
            ..Environment::default()
        };
        assert_eq!(resolve_mode(&cli(&[]), &env), Mode::Methods);
        assert_eq!(resolve_mode(&cli(&["--mode", "types"]), &env), Mode::Types);
    }

    #[test]
    fn environment_markers_fill_in_for_flags() {
        let env = Environment {
            type_marker: Some("@com.example.Service".to_string()),
            ..Environment::default()
        };
        assert_eq!(resolve_markers(&cli(&[]), &env).type_marker, "com.example.Service");
        assert_eq!(
            resolve_markers(&cli(&["--type-marker", "La/B;"]), &env).type_marker,
            "a.B"
        );
    }
}
