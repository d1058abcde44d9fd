// crates/gifconv-core/src/helpers/format.rs
//
// Human-readable labels for the export panel.

/// Format a byte count with two decimals and a binary unit.
///
/// ```
/// use gifconv_core::helpers::format::format_file_size;
/// assert_eq!(format_file_size(512),         "512.00 Byte");
/// assert_eq!(format_file_size(2048),        "2.00 KB");
/// assert_eq!(format_file_size(5 << 20),    "5.00 MB");
/// ```
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["Byte", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    for unit in UNITS {
        if size < 1024.0 {
            return format!("{size:.2} {unit}");
        }
        size /= 1024.0;
    }
    "Unknown".into()
}

/// `0.25` → `"25.0 %"`.
pub fn format_percent(factor: f64) -> String {
    format!("{:.1} %", factor * 100.0)
}
