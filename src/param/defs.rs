//! Static definitions for every numeric parameter the rack exposes.

/// One knob's worth of metadata: range, step and the neutral default the
/// Sniffer falls back to when the call is absent from the text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamDef {
    /// Method name as it appears in the pattern text (`.gain(`, `.lpf(`, ...).
    pub key: &'static str,
    pub label: &'static str,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub unit: Option<&'static str>,
    /// Value an absent call is equivalent to. Removing a call at its neutral
    /// value and re-sniffing must read back the same number.
    pub neutral: f64,
}

pub const PARAM_DEFS: &[ParamDef] = &[
    ParamDef { key: "gain", label: "Gain", min: 0.0, max: 2.0, step: 0.01, unit: None, neutral: 0.5 },
    ParamDef { key: "velocity", label: "Vel", min: 0.0, max: 1.0, step: 0.01, unit: None, neutral: 1.0 },
    ParamDef { key: "lpf", label: "LPF", min: 20.0, max: 20000.0, step: 10.0, unit: Some("Hz"), neutral: 20000.0 },
    ParamDef { key: "hpf", label: "HPF", min: 0.0, max: 8000.0, step: 10.0, unit: Some("Hz"), neutral: 0.0 },
    ParamDef { key: "pan", label: "Pan", min: 0.0, max: 1.0, step: 0.01, unit: None, neutral: 0.5 },
    ParamDef { key: "room", label: "Reverb", min: 0.0, max: 1.0, step: 0.01, unit: None, neutral: 0.0 },
    ParamDef { key: "delay", label: "Delay", min: 0.0, max: 1.0, step: 0.01, unit: None, neutral: 0.0 },
    ParamDef { key: "delayfeedback", label: "DlyFB", min: 0.0, max: 0.95, step: 0.01, unit: None, neutral: 0.0 },
    ParamDef { key: "crush", label: "Crush", min: 1.0, max: 16.0, step: 1.0, unit: None, neutral: 0.0 },
    ParamDef { key: "shape", label: "Shape", min: 0.0, max: 1.0, step: 0.01, unit: None, neutral: 0.0 },
    ParamDef { key: "slow", label: "Speed", min: 0.1, max: 4.0, step: 0.1, unit: None, neutral: 1.0 },
    ParamDef { key: "decay", label: "Decay", min: 0.0, max: 2.0, step: 0.01, unit: None, neutral: 0.0 },
];

pub fn lookup(key: &str) -> Option<&'static ParamDef> {
    PARAM_DEFS.iter().find(|d| d.key == key)
}

/// Serialize a numeric value the way the text conventionally writes it.
/// Integers go bare; fine ratios (gain, pan) get three decimals, everything
/// else two. Repeated round-trips must not drift precision.
pub fn format_value(key: &str, value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        return format!("{}", value as i64);
    }
    match key {
        "gain" | "pan" => format!("{value:.3}"),
        _ => format!("{value:.2}"),
    }
}
