pub mod k8s {
    pub mod labels {
        pub const APP: &str = "app";
    }

    pub mod annotations {
        use std::sync::LazyLock;

        use crate::PROJECT_NAME;

        /// Records the presets applied by the most recent `vigil patch`.
        pub static APPLIED_PRESETS: LazyLock<String> =
            LazyLock::new(|| format!("{PROJECT_NAME}.patch/presets"));

        pub static VERSION: LazyLock<String> = LazyLock::new(|| format!("{PROJECT_NAME}.version"));
    }
}

pub const DEFAULT_PROBE_REQUEST_TIMEOUT_SECS: u64 = 5;
