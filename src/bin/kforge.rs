//! kforge - build manifest directories into a single YAML stream.

use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use kforge::generate::{make_config_map, make_secret, SourceSpec};
use kforge::manifest::{Manifest, MANIFEST_FILE_NAME};
use kforge::{
    assemble, encode, FileSystem, MapTransformer, MultiTransformer, PrefixTransformer, RealFs,
    Transformer,
};

#[derive(Parser, Debug)]
#[command(name = "kforge", version, about = "Assemble Kubernetes manifests")]
struct Cli {
    /// Log debug output (overridden by RUST_LOG)
    #[arg(short = 'v', long = "verbose", action = ArgAction::SetTrue, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build a manifest directory and print the resulting resources
    Build {
        /// Directory holding kforge.yaml
        #[arg(default_value = ".")]
        dir: PathBuf,

        /// Manifest file to use instead of DIR/kforge.yaml
        #[arg(short = 'm', long = "manifest", env = "KFORGE_MANIFEST")]
        manifest: Option<PathBuf>,

        /// Extra label to apply to every resource (key=value, repeatable)
        #[arg(short = 'l', long = "label", value_parser = parse_key_val)]
        labels: Vec<(String, String)>,

        /// Extra annotation to apply to every resource (key=value, repeatable)
        #[arg(short = 'a', long = "annotation", value_parser = parse_key_val)]
        annotations: Vec<(String, String)>,

        /// Write output to this file instead of stdout
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,
    },
    /// Print the name a ConfigMap (or Secret) built from literals would get
    Hash {
        /// Declared name
        #[arg(long = "name")]
        name: String,

        /// Compute the name of an Opaque Secret instead of a ConfigMap
        #[arg(long = "secret", action = ArgAction::SetTrue)]
        secret: bool,

        /// Literal sources (key=value)
        #[arg(required = true)]
        literals: Vec<String>,
    },
}

fn parse_key_val(s: &str) -> std::result::Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got {:?}", s)),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Build {
            dir,
            manifest,
            labels,
            annotations,
            output,
        } => build(&dir, manifest, labels, annotations, output.as_deref()),
        Commands::Hash {
            name,
            secret,
            literals,
        } => {
            let source = SourceSpec::Literal(literals);
            let generated = if secret {
                make_secret(&RealFs, &name, &source)
            } else {
                make_config_map(&RealFs, &name, &source)
            }
            .with_context(|| format!("failed to generate {:?}", name))?;
            println!("{}", generated.name);
            Ok(())
        }
    }
}

fn build(
    dir: &Path,
    manifest_path: Option<PathBuf>,
    labels: Vec<(String, String)>,
    annotations: Vec<(String, String)>,
    output: Option<&Path>,
) -> Result<()> {
    let fs = RealFs;
    let manifest_path = manifest_path.unwrap_or_else(|| dir.join(MANIFEST_FILE_NAME));
    let base_dir = manifest_path.parent().unwrap_or_else(|| Path::new(""));

    let contents = fs
        .read_file(&manifest_path)
        .with_context(|| format!("failed to read manifest {}", manifest_path.display()))?;
    let manifest = Manifest::from_yaml(&contents)
        .with_context(|| format!("failed to parse manifest {}", manifest_path.display()))?;

    let mut ws = assemble(&fs, base_dir, &manifest)
        .with_context(|| format!("failed to assemble {}", manifest_path.display()))?;

    let labels = merged(&manifest.common_labels, labels);
    let annotations = merged(&manifest.common_annotations, annotations);
    MultiTransformer::new()
        .with(PrefixTransformer::names(manifest.name_prefix.clone()))
        .with(MapTransformer::labels(labels))
        .with(MapTransformer::annotations(annotations))
        .transform(&mut ws)
        .context("failed to apply name prefix, common labels and annotations")?;

    let encoded = encode(&ws).context("failed to encode resources")?;
    match output {
        Some(path) => {
            fs.write_file(path, &encoded)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), resources = ws.len(), "wrote output");
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(&encoded).context("failed to write to stdout")?;
            stdout.flush()?;
        }
    }
    Ok(())
}

/// Manifest values overlaid with command line values.
fn merged(
    base: &BTreeMap<String, String>,
    extra: Vec<(String, String)>,
) -> BTreeMap<String, String> {
    let mut out = base.clone();
    out.extend(extra);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_build_flags() {
        let cli = Cli::try_parse_from([
            "kforge", "-v", "build", "overlay", "--label", "app=web", "-l", "tier=backend",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Build { dir, labels, .. } => {
                assert_eq!(dir, PathBuf::from("overlay"));
                assert_eq!(
                    labels,
                    vec![
                        ("app".to_string(), "web".to_string()),
                        ("tier".to_string(), "backend".to_string())
                    ]
                );
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_key_val() {
        assert_eq!(parse_key_val("a=b=c").unwrap(), ("a".into(), "b=c".into()));
        assert!(parse_key_val("=x").is_err());
        assert!(parse_key_val("novalue").is_err());
    }

    #[test]
    fn test_merged_prefers_extra() {
        let base = BTreeMap::from([("app".to_string(), "old".to_string())]);
        let out = merged(&base, vec![("app".into(), "new".into()), ("env".into(), "prod".into())]);
        assert_eq!(out.get("app").map(String::as_str), Some("new"));
        assert_eq!(out.len(), 2);
    }
}
