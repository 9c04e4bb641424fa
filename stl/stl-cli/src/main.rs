//! `stlrepair` - repair tool for binary STL files.
//!
//! Runs one streaming repair pass over a binary STL file and writes the
//! corrected copy next to the input (or to `--output`). Each repair policy
//! is an independent flag; with no flags the output is a byte-for-byte copy.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;

use stl_io::{determine_file_type, StlFileType};
use stl_repair::{repair_file, RepairOptions};

/// Repair a binary STL file.
///
/// With no repair flags the output reproduces the input exactly, which is
/// useful for checking that a file round-trips cleanly.
#[derive(Parser)]
#[command(name = "stlrepair")]
#[command(about = "An STL repair tool", long_about = None)]
#[command(version)]
struct Cli {
    /// The STL file to repair.
    input: PathBuf,

    /// Where to write the repaired file. Defaults to a unique sibling of
    /// the input, e.g. model(1).stl.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Replace the 80-byte file header with zeros.
    #[arg(long)]
    zero_header: bool,

    /// Zero every facet's attribute byte count.
    #[arg(long)]
    zero_attributes: bool,

    /// Rewrite the declared triangle count if it doesn't match the
    /// triangles actually written.
    #[arg(long)]
    update_count: bool,

    /// Write at most this many triangles; the rest are dropped.
    #[arg(long, value_name = "N")]
    limit: Option<u32>,

    /// Drop trailing bytes that don't form complete triangle records.
    #[arg(long)]
    drop_trailing: bool,

    /// Treat a file that looks like an ASCII-mode STL as binary anyway.
    /// Only useful when a misbehaving exporter wrote "solid" into a binary
    /// header; on a real ASCII file this produces garbage.
    #[arg(long)]
    force_binary: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let file_type = determine_file_type(&cli.input)
        .with_context(|| format!("cannot inspect {}", cli.input.display()))?;

    match file_type {
        StlFileType::Binary => {}
        StlFileType::Ascii if cli.force_binary => {
            eprintln!(
                "warning: {} looks like an ASCII-mode STL; treating as binary",
                cli.input.display()
            );
        }
        StlFileType::Ascii => {
            bail!(
                "{} is an ASCII-mode STL; repairs only apply to binary-mode files \
                 (pass --force-binary to override)",
                cli.input.display()
            );
        }
        StlFileType::Unknown => {
            bail!(
                "{} is too small to be a binary STL",
                cli.input.display()
            );
        }
    }

    let output = match cli.output {
        Some(path) => path,
        None => unique_sibling_path(&cli.input),
    };

    let mut options = RepairOptions::default()
        .with_zero_header(cli.zero_header)
        .with_zero_attribute_byte_counts(cli.zero_attributes)
        .with_update_triangle_count(cli.update_count)
        .with_clear_trailing_data(cli.drop_trailing);
    if let Some(limit) = cli.limit {
        options = options.with_triangle_limit(limit);
    }

    let summary = repair_file(&cli.input, &output, &options)
        .with_context(|| format!("repair of {} failed", cli.input.display()))?;

    println!("wrote {}", output.display());
    println!("  triangles declared: {}", summary.declared);
    println!("  triangles written:  {}", summary.emitted);
    if summary.seen > summary.emitted {
        println!("  triangles dropped:  {}", summary.seen - summary.emitted);
    }
    if summary.trailing_bytes > 0 {
        println!("  trailing bytes kept: {}", summary.trailing_bytes);
    }
    if summary.count_patched {
        println!("  triangle count field patched to {}", summary.emitted);
    }

    Ok(())
}

/// First nonexistent sibling of `path` formed by appending `(1)`, `(2)`, …
/// to the file stem.
fn unique_sibling_path(path: &Path) -> PathBuf {
    let dir = path.parent().unwrap_or_else(|| Path::new(""));
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| String::from("output"));
    let extension = path.extension().map(|e| e.to_string_lossy().into_owned());

    for n in 1u32.. {
        let name = match &extension {
            Some(ext) => format!("{stem}({n}).{ext}"),
            None => format!("{stem}({n})"),
        };
        let candidate = dir.join(name);
        if !candidate.exists() {
            return candidate;
        }
    }
    unreachable!("ran out of candidate file names");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_sibling_skips_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("model.stl");
        std::fs::write(&base, b"x").unwrap();
        std::fs::write(dir.path().join("model(1).stl"), b"x").unwrap();

        let candidate = unique_sibling_path(&base);
        assert_eq!(candidate, dir.path().join("model(2).stl"));
    }

    #[test]
    fn unique_sibling_handles_extensionless_names() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("model");
        let candidate = unique_sibling_path(&base);
        assert_eq!(candidate, dir.path().join("model(1)"));
    }
}
