//! Writers for each command's output.

use std::collections::BTreeMap;
use std::io::Write;

use anyhow::Result;
use serde::Serialize;
use swatch_tokens::{AppearanceMode, Candidate, Capabilities, Resolution, TokenSet, TokenValues};

use crate::output::{OutputMode, Palette};

/// Writes resolved values.
pub fn write_values(
    out: &mut dyn Write,
    values: &TokenValues,
    mode: AppearanceMode,
    caps: Capabilities,
    output: OutputMode,
    selector: &str,
) -> Result<()> {
    match output {
        OutputMode::Json => writeln!(out, "{}", serde_json::to_string_pretty(values)?)?,
        OutputMode::Yaml => write!(out, "{}", serde_yaml::to_string(values)?)?,
        OutputMode::Css => write!(out, "{}", values.to_css(selector))?,
        OutputMode::Term | OutputMode::Text => {
            let palette = Palette::new(output.should_use_color());
            writeln!(
                out,
                "{}",
                palette.header.apply_to(format!("appearance {}, capabilities {}", mode, caps))
            )?;
            let width = values.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
            for (name, value) in values {
                writeln!(
                    out,
                    "  {}  {}{}",
                    palette.name.apply_to(format!("{:width$}", name, width = width)),
                    palette.preview(value),
                    palette.value.apply_to(value)
                )?;
            }
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct Explanation<'a> {
    #[serde(flatten)]
    resolution: &'a Resolution<'a>,
    candidates: &'a [Candidate],
}

/// Writes which candidate a token resolved to, with the full candidate list.
pub fn write_explanation(
    out: &mut dyn Write,
    resolution: &Resolution<'_>,
    candidates: &[Candidate],
    output: OutputMode,
) -> Result<()> {
    let report = Explanation {
        resolution,
        candidates,
    };
    match output {
        OutputMode::Json => writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?,
        OutputMode::Yaml => write!(out, "{}", serde_yaml::to_string(&report)?)?,
        OutputMode::Css => writeln!(out, "--{}: {};", resolution.token(), resolution.value())?,
        OutputMode::Term | OutputMode::Text => {
            let palette = Palette::new(output.should_use_color());
            let source = if resolution.is_fallback() {
                "fallback".to_string()
            } else {
                resolution.candidate().predicate().to_string()
            };
            writeln!(
                out,
                "{} = {}{}  ({}, priority {})",
                palette.name.apply_to(resolution.token()),
                palette.preview(resolution.value()),
                palette.winner.apply_to(resolution.value()),
                source,
                resolution.candidate().priority()
            )?;

            let width = candidates
                .iter()
                .map(|c| c.predicate().to_string().len())
                .max()
                .unwrap_or(0);
            for candidate in candidates {
                let chosen = candidate == resolution.candidate();
                let line = format!(
                    "{} {:>5}  {:width$}  {}",
                    if chosen { ">" } else { " " },
                    candidate.priority(),
                    candidate.predicate().to_string(),
                    candidate.value(),
                    width = width
                );
                if chosen {
                    writeln!(out, "  {}", palette.winner.apply_to(line))?;
                } else {
                    writeln!(out, "  {}", palette.muted.apply_to(line))?;
                }
            }
        }
    }
    Ok(())
}

/// One point of the ambient domain and its resolution.
#[derive(Debug, Serialize)]
pub struct MatrixRow<'a> {
    pub mode: AppearanceMode,
    pub capabilities: Capabilities,
    pub values: &'a TokenValues,
}

/// Writes the resolution of every point of the ambient domain.
///
/// The listing groups each token's points by value, so a token that never
/// varies takes a single line.
pub fn write_matrix(
    out: &mut dyn Write,
    tokens: &TokenSet,
    rows: &[MatrixRow<'_>],
    output: OutputMode,
) -> Result<()> {
    match output {
        OutputMode::Json => writeln!(out, "{}", serde_json::to_string_pretty(rows)?)?,
        OutputMode::Yaml => write!(out, "{}", serde_yaml::to_string(rows)?)?,
        OutputMode::Css => {
            for row in rows {
                let selector = format!(
                    ":root /* appearance {}, capabilities {} */",
                    row.mode, row.capabilities
                );
                write!(out, "{}", row.values.to_css(&selector))?;
            }
        }
        OutputMode::Term | OutputMode::Text => {
            let palette = Palette::new(output.should_use_color());
            let width = tokens.names().map(str::len).max().unwrap_or(0);
            for name in tokens.names() {
                let mut by_value: BTreeMap<&str, Vec<&MatrixRow<'_>>> = BTreeMap::new();
                for row in rows {
                    if let Some(value) = row.values.get(name) {
                        by_value.entry(value).or_default().push(row);
                    }
                }

                let padded = format!("{:width$}", name, width = width);
                if by_value.len() == 1 {
                    let value = by_value.keys().next().copied().unwrap_or_default();
                    writeln!(
                        out,
                        "{}  {}{}",
                        palette.name.apply_to(padded),
                        palette.preview(value),
                        palette.value.apply_to(value)
                    )?;
                    continue;
                }

                writeln!(out, "{}", palette.name.apply_to(padded))?;
                for (value, points) in &by_value {
                    writeln!(
                        out,
                        "  {}{}  {}",
                        palette.preview(value),
                        palette.value.apply_to(value),
                        palette.muted.apply_to(describe_points(points))
                    )?;
                }
            }
        }
    }
    Ok(())
}

/// Describes a set of points, collapsing a mode that holds under every
/// capability set to `mode *`.
fn describe_points(points: &[&MatrixRow<'_>]) -> String {
    let subsets = Capabilities::every_subset().count();
    let mut parts = Vec::new();
    for mode in AppearanceMode::ALL {
        let caps: Vec<Capabilities> = points
            .iter()
            .filter(|row| row.mode == mode)
            .map(|row| row.capabilities)
            .collect();
        if caps.len() == subsets {
            parts.push(format!("{} *", mode));
        } else {
            parts.extend(caps.iter().map(|c| format!("{} {}", mode, c)));
        }
    }
    parts.join(", ")
}

/// Writes a short validation report.
///
/// Loading already validated the set, so this only reports what was checked.
pub fn write_check(out: &mut dyn Write, tokens: &TokenSet, output: OutputMode) -> Result<()> {
    #[derive(Serialize)]
    struct Report<'a> {
        name: Option<&'a str>,
        tokens: usize,
        candidates: usize,
    }

    let report = Report {
        name: tokens.name(),
        tokens: tokens.len(),
        candidates: tokens.iter().map(|t| t.candidates().len()).sum(),
    };

    match output {
        OutputMode::Json => writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?,
        OutputMode::Yaml => write!(out, "{}", serde_yaml::to_string(&report)?)?,
        OutputMode::Term | OutputMode::Text | OutputMode::Css => {
            let palette = Palette::new(output.should_use_color());
            writeln!(
                out,
                "{}: {} tokens ok",
                palette.header.apply_to(tokens.name().unwrap_or("tokens")),
                report.tokens
            )?;
            writeln!(
                out,
                "  {}",
                palette
                    .muted
                    .apply_to(format!("{} candidates, every fallback reachable", report.candidates))
            )?;
        }
    }
    Ok(())
}
