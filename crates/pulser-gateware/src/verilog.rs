//! # Verilog Emission
//!
//! Renders a [`PulseChain`] as a single-clock Verilog-2001 module with
//! three ports:
//!
//! | Port        | Dir    | Meaning                               |
//! |-------------|--------|---------------------------------------|
//! | `clk`       | input  | The one clock domain.                 |
//! | `trig_in`   | input  | Raw trigger line.                     |
//! | `pulse_out` | output | Chain output tap.                     |
//!
//! The registers mirror the simulated machines bit for bit. Each stage
//! keeps `armed`, `tog` and `prop`, plus a counter only when its duration
//! exceeds one tick. The edge gate, when present, keeps the last input
//! sample and a blocking counter. All registers power up at zero.
//!
//! Counters are sized per stage to the smallest width that holds
//! `duration - 1`, so one long stage does not widen the others.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use pulser_core::{ConfigError, PulserError, TriggerSource};
use pulser_state::PulseChain;

/// Module name used when none is given.
pub const DEFAULT_MODULE_NAME: &str = "pulse_train";

const KEYWORDS: &[&str] = &[
    "always", "assign", "begin", "case", "default", "else", "end", "endcase", "endfunction",
    "endmodule", "for", "function", "if", "initial", "inout", "input", "integer", "localparam",
    "module", "negedge", "output", "parameter", "posedge", "reg", "wire",
];

/// Emission options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerilogOptions {
    /// Name of the emitted module.
    pub module_name: String,
}

impl Default for VerilogOptions {
    fn default() -> Self {
        Self {
            module_name: DEFAULT_MODULE_NAME.to_string(),
        }
    }
}

impl VerilogOptions {
    /// Options emitting a module called `name`.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            module_name: name.into(),
        }
    }
}

/// Registers spent by an emitted module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSummary {
    /// Total flip-flops, gate included.
    pub flip_flops: u32,
    /// Counter width of each stage in chain order; 0 for one-tick stages.
    pub stage_counter_widths: Vec<u32>,
    /// Width of the gate's blocking counter, if the chain is gated.
    pub gate_counter_width: Option<u32>,
}

/// A rendered Verilog module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewareModule {
    /// Module name.
    pub name: String,
    /// Verilog source text.
    pub source: String,
    /// Register usage.
    pub resources: ResourceSummary,
}

/// Whether `name` is a legal, non-reserved Verilog identifier.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        && !KEYWORDS.contains(&name)
}

/// Bits needed to hold every value in `0..=max`, at least one.
pub fn counter_width(max: u32) -> u32 {
    (u32::BITS - max.leading_zeros()).max(1)
}

/// Counter width of a stage lasting `duration` ticks; 0 when no counter
/// is needed.
fn stage_width(duration: u32) -> u32 {
    if duration > 1 {
        counter_width(duration - 1)
    } else {
        0
    }
}

/// Register usage of `chain` without rendering it.
pub fn resources(chain: &PulseChain) -> ResourceSummary {
    let stage_counter_widths: Vec<u32> = chain
        .durations()
        .iter()
        .map(|d| stage_width(d.get()))
        .collect();
    let gate_counter_width = match chain.trigger_source() {
        TriggerSource::Direct => None,
        TriggerSource::Gated { block } => Some(counter_width(block)),
    };

    // tog + prop always; armed only with a counter; gate keeps last_in.
    let stages: u32 = stage_counter_widths
        .iter()
        .map(|&w| if w == 0 { 2 } else { 3 + w })
        .sum();
    let gate = gate_counter_width.map_or(0, |w| 1 + w);

    ResourceSummary {
        flip_flops: stages + gate,
        stage_counter_widths,
        gate_counter_width,
    }
}

/// Render `chain` as a Verilog module.
///
/// # Errors
///
/// [`ConfigError::InvalidModuleName`] when the module name is not a legal
/// Verilog identifier.
pub fn emit_verilog(chain: &PulseChain, options: &VerilogOptions) -> Result<GatewareModule, PulserError> {
    if !is_valid_identifier(&options.module_name) {
        return Err(ConfigError::InvalidModuleName(options.module_name.clone()).into());
    }

    let resources = resources(chain);
    let mut source = String::new();
    render(&mut source, chain, &options.module_name, &resources)
        .map_err(|e| PulserError::Serialization(e.to_string()))?;

    tracing::info!(
        module = %options.module_name,
        stages = chain.len(),
        flip_flops = resources.flip_flops,
        "emitted verilog module"
    );

    Ok(GatewareModule {
        name: options.module_name.clone(),
        source,
        resources,
    })
}

fn bit(level: bool) -> &'static str {
    if level {
        "1'b1"
    } else {
        "1'b0"
    }
}

fn render(
    out: &mut String,
    chain: &PulseChain,
    name: &str,
    resources: &ResourceSummary,
) -> std::fmt::Result {
    let trigger = match chain.trigger_source() {
        TriggerSource::Direct => "direct trigger".to_string(),
        TriggerSource::Gated { block } => format!("gated trigger, {block}-tick window"),
    };
    writeln!(out, "// Generated by pulser {}.", env!("CARGO_PKG_VERSION"))?;
    writeln!(
        out,
        "// {} stages, {} ticks, {trigger}, {} flip-flops.",
        chain.len(),
        chain.total_ticks(),
        resources.flip_flops
    )?;
    writeln!(out, "module {name} (")?;
    writeln!(out, "    input  wire clk,")?;
    writeln!(out, "    input  wire trig_in,")?;
    writeln!(out, "    output wire pulse_out")?;
    writeln!(out, ");")?;

    match (chain.trigger_source(), resources.gate_counter_width) {
        (TriggerSource::Gated { block }, Some(w)) => render_gate(out, block, w)?,
        _ => {
            writeln!(out)?;
            writeln!(out, "    wire en = trig_in;")?;
        }
    }

    let mut input = bit(chain.initial_level()).to_string();
    let mut prev = "en".to_string();
    for (i, (d, &w)) in chain
        .durations()
        .iter()
        .zip(&resources.stage_counter_widths)
        .enumerate()
    {
        render_stage(out, i, d.get(), w, &input, &prev)?;
        input = format!("s{i}_out");
        prev = format!("s{i}_done");
    }

    writeln!(out)?;
    writeln!(out, "    assign pulse_out = {input};")?;
    writeln!(out)?;
    writeln!(out, "endmodule")
}

fn render_gate(out: &mut String, block: u32, w: u32) -> std::fmt::Result {
    writeln!(out)?;
    writeln!(out, "    // Edge gate: one accepted edge per {block}-tick window.")?;
    writeln!(out, "    reg gate_last = 1'b0;")?;
    writeln!(out, "    reg [{}:0] gate_blk = {w}'d0;", w - 1)?;
    writeln!(
        out,
        "    wire gate_pulse = (gate_blk == {w}'d0) && trig_in && !gate_last;"
    )?;
    writeln!(out, "    wire en = gate_pulse || (gate_blk != {w}'d0);")?;
    writeln!(out)?;
    writeln!(out, "    always @(posedge clk) begin")?;
    writeln!(out, "        gate_last <= trig_in;")?;
    writeln!(out, "        if (gate_pulse)")?;
    writeln!(out, "            gate_blk <= {w}'d{block};")?;
    writeln!(out, "        else if (gate_blk != {w}'d0)")?;
    writeln!(out, "            gate_blk <= gate_blk - {w}'d1;")?;
    writeln!(out, "    end")
}

fn render_stage(
    out: &mut String,
    i: usize,
    duration: u32,
    w: u32,
    input: &str,
    prev: &str,
) -> std::fmt::Result {
    writeln!(out)?;
    writeln!(out, "    // Stage {i}: {duration} tick(s).")?;
    if w > 0 {
        writeln!(out, "    reg s{i}_armed = 1'b0;")?;
        writeln!(out, "    reg [{}:0] s{i}_cnt = {w}'d0;", w - 1)?;
    }
    writeln!(out, "    reg s{i}_tog = 1'b0;")?;
    writeln!(out, "    reg s{i}_prop = 1'b0;")?;
    writeln!(out, "    wire s{i}_prev = {prev};")?;
    writeln!(out, "    wire s{i}_out = en ? ({input} ^ s{i}_tog) : {input};")?;
    writeln!(out, "    wire s{i}_done = en & s{i}_prop;")?;
    writeln!(out)?;
    writeln!(out, "    always @(posedge clk) begin")?;
    writeln!(out, "        if (!en) begin")?;
    if w > 0 {
        writeln!(out, "            s{i}_armed <= 1'b0;")?;
        writeln!(out, "            s{i}_cnt <= {w}'d0;")?;
    }
    writeln!(out, "            s{i}_tog <= 1'b0;")?;
    writeln!(out, "            s{i}_prop <= 1'b0;")?;
    if w > 0 {
        writeln!(out, "        end else if (s{i}_armed) begin")?;
        writeln!(out, "            if (s{i}_cnt == {w}'d{}) begin", duration - 1)?;
        writeln!(out, "                s{i}_armed <= 1'b0;")?;
        writeln!(out, "                s{i}_cnt <= {w}'d0;")?;
        writeln!(out, "                s{i}_tog <= ~s{i}_tog;")?;
        writeln!(out, "                s{i}_prop <= 1'b1;")?;
        writeln!(out, "            end else begin")?;
        writeln!(out, "                s{i}_cnt <= s{i}_cnt + {w}'d1;")?;
        writeln!(out, "                s{i}_prop <= 1'b0;")?;
        writeln!(out, "            end")?;
        writeln!(out, "        end else if (s{i}_prev && !s{i}_tog) begin")?;
        writeln!(out, "            s{i}_armed <= 1'b1;")?;
        writeln!(out, "            s{i}_cnt <= {w}'d1;")?;
        writeln!(out, "            s{i}_prop <= 1'b0;")?;
    } else {
        writeln!(out, "        end else if (s{i}_prev && !s{i}_tog) begin")?;
        writeln!(out, "            s{i}_tog <= 1'b1;")?;
        writeln!(out, "            s{i}_prop <= 1'b1;")?;
    }
    writeln!(out, "        end else begin")?;
    writeln!(out, "            s{i}_prop <= 1'b0;")?;
    writeln!(out, "        end")?;
    writeln!(out, "    end")
}
