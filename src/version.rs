// Version and build tracking for SmartPlan

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const BUILD: &str = "0007";

pub fn version_string() -> String {
    format!("v{}-{}", VERSION, BUILD)
}

pub fn full_version_info() -> String {
    format!("SmartPlan {} (Build {})", VERSION, BUILD)
}
