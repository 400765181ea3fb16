//! Coarse in-hospital mortality bands per scoring system.

pub const APACHE_II: &str = "APACHE II (Acute Physiology And Chronic Health Evaluation II)";
pub const APACHE_III: &str = "APACHE III (Acute Physiology And Chronic Health Evaluation III)";

/// Label for test names without a table.
pub const UNKNOWN_RISK: &str = "unknown";

struct MortalityTable {
    test_name: &'static str,
    /// `(exclusive upper score, band)` in ascending order.
    bands: &'static [(i32, &'static str)],
    ceiling: &'static str,
}

const TABLES: &[MortalityTable] = &[
    MortalityTable {
        test_name: APACHE_II,
        bands: &[(10, "~15%"), (20, "~25%"), (30, "~50%")],
        ceiling: ">80%",
    },
    MortalityTable {
        test_name: APACHE_III,
        bands: &[
            (30, "~10%"),
            (45, "~20%"),
            (55, "~30%"),
            (65, "~50%"),
            (75, "~65%"),
            (85, "~75%"),
        ],
        ceiling: ">85%",
    },
];

pub fn mortality_risk(score: i32, test_name: &str) -> &'static str {
    let Some(table) = TABLES.iter().find(|table| table.test_name == test_name) else {
        return UNKNOWN_RISK;
    };

    table
        .bands
        .iter()
        .find(|(upper, _)| score < *upper)
        .map(|(_, band)| *band)
        .unwrap_or(table.ceiling)
}
