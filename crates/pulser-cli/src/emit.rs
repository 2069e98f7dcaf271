//! # Emit: Render a Pulse Train as Verilog
//!
//! ```bash
//! pulser emit --name strobe --out strobe.v -f 100 -n 50 100
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use pulser_gateware::{emit_verilog, VerilogOptions, DEFAULT_MODULE_NAME};

use crate::train::TrainArgs;

/// Arguments for `pulser emit`.
#[derive(Args, Debug, Clone)]
pub struct EmitArgs {
    #[command(flatten)]
    pub train: TrainArgs,

    /// Name of the emitted Verilog module.
    #[arg(long, default_value = DEFAULT_MODULE_NAME)]
    pub name: String,

    /// Write the module to a file instead of stdout.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

/// Execute `pulser emit`.
pub fn run_emit(args: &EmitArgs, config: Option<&Path>) -> Result<u8> {
    let (_, chain) = args.train.build(config)?;
    let module = emit_verilog(&chain, &VerilogOptions::named(args.name.as_str()))
        .context("verilog emission failed")?;

    match &args.out {
        Some(path) => {
            std::fs::write(path, &module.source)
                .with_context(|| format!("failed to write module to {}", path.display()))?;
            tracing::info!(
                path = %path.display(),
                flip_flops = module.resources.flip_flops,
                "verilog module written"
            );
        }
        None => print!("{}", module.source),
    }
    Ok(0)
}
