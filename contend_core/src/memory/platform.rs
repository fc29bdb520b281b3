// Host facts shown next to benchmark results

/// Get platform name for logging/diagnostics
pub fn platform_name() -> &'static str {
    #[cfg(target_os = "linux")]
    {
        "Linux"
    }

    #[cfg(target_os = "macos")]
    {
        "macOS"
    }

    #[cfg(not(any(target_os = "linux", target_os = "macos")))]
    {
        "Unix"
    }
}

/// Logical CPUs available to this process
///
/// Unsynchronized runs only lose updates when workers truly overlap, which
/// needs more than one CPU.
pub fn cpu_count() -> usize {
    num_cpus::get()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_facts() {
        assert!(!platform_name().is_empty());
        assert!(cpu_count() >= 1);
    }
}
