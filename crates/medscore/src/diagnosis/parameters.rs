//! Well-known scoring parameters and the hint text shown next to them.

pub const IS_VENTILATED: &str = "is_ventilated";
pub const AADO2: &str = "aado2";
pub const PAO2: &str = "pao2";
pub const RESPIRATORY_RATE: &str = "respiratory_rate";
pub const MEAN_ARTERIAL_PRESSURE: &str = "map";

const HINTS: &[(&str, &str)] = &[
    (
        MEAN_ARTERIAL_PRESSURE,
        "Formula: (systolic BP + 2 × diastolic BP) / 3",
    ),
    (
        RESPIRATORY_RATE,
        "Reply 'yes' or 'no' first: is the patient on mechanical ventilation?",
    ),
    (PAO2, "Not used for ventilated patients with FiO₂ ≥ 0.5"),
    (AADO2, "Only for ventilated patients with FiO₂ ≥ 0.5"),
];

pub fn hint_for(parameter: &str) -> Option<&'static str> {
    HINTS
        .iter()
        .find(|(name, _)| *name == parameter)
        .map(|(_, hint)| *hint)
}

/// Reads a free-form yes/no reply.
pub fn parse_yes_no(reply: &str) -> Option<bool> {
    match reply.trim().to_lowercase().as_str() {
        "yes" | "y" => Some(true),
        "no" | "n" => Some(false),
        _ => None,
    }
}
