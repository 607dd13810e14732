//! # Swatch - Design Token Command Line
//!
//! The `swatch` binary resolves, explains and checks design token sets built
//! with [`swatch_tokens`]. Everything except process setup lives here so
//! commands can be run in-process with [`run`].
//!
//! ```text
//! swatch resolve --mode dark --cap inset-env --output css
//! swatch explain accent-color --mode dark
//! swatch --tokens brand.yaml check
//! swatch matrix
//! ```

pub mod output;
pub mod render;

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use swatch_tokens::{
    detect_appearance, site, AppearanceMode, Capabilities, Capability, Resolver, TokenSet,
};

use crate::output::OutputMode;
use crate::render::MatrixRow;

/// Resolve themed design tokens
#[derive(Debug, Parser)]
#[command(name = "swatch", version)]
#[command(about = "Resolve themed design tokens for an appearance mode and host capabilities")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Token file (.yaml, .yml or .css); repeat to layer files over each other
    #[arg(
        long = "tokens",
        value_name = "FILE",
        env = "SWATCH_TOKENS",
        value_delimiter = ',',
        global = true
    )]
    pub tokens: Vec<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Resolve every token for an ambient state
    Resolve(ResolveArgs),

    /// Show which candidate a token resolves to, and why
    Explain(ExplainArgs),

    /// Validate the token set
    Check(CheckArgs),

    /// Resolve every token for every appearance mode and capability set
    Matrix(MatrixArgs),
}

/// Appearance mode as given on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ModeArg {
    /// Ask the operating system
    #[default]
    Auto,
    Light,
    Dark,
    Unspecified,
}

impl ModeArg {
    pub fn resolve(self) -> AppearanceMode {
        match self {
            ModeArg::Auto => detect_appearance(),
            ModeArg::Light => AppearanceMode::Light,
            ModeArg::Dark => AppearanceMode::Dark,
            ModeArg::Unspecified => AppearanceMode::Unspecified,
        }
    }
}

/// The ambient state to resolve against.
#[derive(Debug, Clone, Args)]
pub struct AmbientArgs {
    /// Appearance mode
    #[arg(long, value_enum, default_value_t = ModeArg::Auto)]
    pub mode: ModeArg,

    /// Host capability (inset-constant, inset-env); repeatable
    #[arg(long = "cap", value_name = "CAPABILITY")]
    pub caps: Vec<Capability>,
}

impl AmbientArgs {
    pub fn capabilities(&self) -> Capabilities {
        self.caps.iter().copied().collect()
    }
}

#[derive(Debug, Clone, Args)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub ambient: AmbientArgs,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputMode::Term)]
    pub output: OutputMode,

    /// Selector wrapping the properties in CSS output
    #[arg(long, default_value = ":root")]
    pub selector: String,
}

#[derive(Debug, Clone, Args)]
pub struct ExplainArgs {
    /// Token name, with or without the leading `--`
    pub token: String,

    #[command(flatten)]
    pub ambient: AmbientArgs,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputMode::Term)]
    pub output: OutputMode,
}

#[derive(Debug, Clone, Args)]
pub struct CheckArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputMode::Term)]
    pub output: OutputMode,
}

#[derive(Debug, Clone, Args)]
pub struct MatrixArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputMode::Term)]
    pub output: OutputMode,
}

/// Loads the token set named on the command line.
///
/// With no files this is the built-in site set. Several files are layered
/// with [`TokenSet::merge`], later files winning.
pub fn load_tokens(paths: &[PathBuf]) -> Result<TokenSet> {
    let mut layered: Option<TokenSet> = None;
    for path in paths {
        let tokens = TokenSet::from_file(path)
            .with_context(|| format!("failed to load tokens from {}", path.display()))?;
        tracing::info!(path = %path.display(), tokens = tokens.len(), "loaded token file");
        layered = Some(match layered {
            Some(base) => base.merge(tokens),
            None => tokens,
        });
    }

    Ok(layered.unwrap_or_else(|| {
        tracing::debug!("no token files given, using the built-in site tokens");
        site::site_tokens()
    }))
}

/// Runs a parsed command line, writing command output to `out`.
pub fn run(cli: &Cli, out: &mut dyn Write) -> Result<()> {
    let tokens = load_tokens(&cli.tokens)?;

    match &cli.command {
        Command::Resolve(args) => {
            let mode = args.ambient.mode.resolve();
            let caps = args.ambient.capabilities();
            tracing::debug!(mode = %mode, capabilities = %caps, "resolving tokens");
            let values = tokens.resolve(mode, caps);
            render::write_values(out, &values, mode, caps, args.output, &args.selector)
        }
        Command::Explain(args) => {
            let mode = args.ambient.mode.resolve();
            let caps = args.ambient.capabilities();
            let token = tokens
                .get(&args.token)
                .with_context(|| format!("unknown token '{}'", args.token))?;
            let resolution = tokens
                .explain(&args.token, mode, caps)
                .with_context(|| format!("unknown token '{}'", args.token))?;
            render::write_explanation(out, &resolution, token.candidates(), args.output)
        }
        Command::Check(args) => render::write_check(out, &tokens, args.output),
        Command::Matrix(args) => {
            let resolver = Resolver::new(tokens);
            resolver.warm();

            let mut points = Vec::new();
            for mode in AppearanceMode::ALL {
                for caps in Capabilities::every_subset() {
                    points.push((mode, caps, resolver.resolve(mode, caps)));
                }
            }
            let rows: Vec<MatrixRow<'_>> = points
                .iter()
                .map(|(mode, caps, values)| MatrixRow {
                    mode: *mode,
                    capabilities: *caps,
                    values: values.as_ref(),
                })
                .collect();
            render::write_matrix(out, resolver.tokens(), &rows, args.output)
        }
    }
}
