//! Fixed item lists that become quantity columns in the workbook.

/// Built-in charger models, in display and column order
pub const CHARGER_MODELS: &[&str] = &[
    "2100A", "1100A", "3050A", "3050B", "3050C", "2007CP", "2007A", "2007C", "1007B", "1030A",
];

/// Auxiliary construction items, in display and column order
pub const ACCESSORY_ITEMS: &[&str] = &[
    "I-bollard",
    "U-bollard",
    "Base pad (slow)",
    "Base pad (fast)",
    "Floor painting",
    "Canopy (slow)",
    "Canopy (fast)",
];

/// Largest quantity accepted for any single item
pub const MAX_QUANTITY: u32 = 999;

/// Longest remarks text accepted, in characters
pub const MAX_REMARKS_CHARS: usize = 400;

pub fn is_charger_model(name: &str) -> bool {
    CHARGER_MODELS.contains(&name)
}

pub fn is_accessory_item(name: &str) -> bool {
    ACCESSORY_ITEMS.contains(&name)
}
