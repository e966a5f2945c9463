use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("{source}"))]
    Configuration { source: crate::config::Error },

    #[snafu(display("{source}"))]
    Patch { source: crate::patch::Error },

    #[snafu(display("{source}"))]
    Probe { source: crate::probe::Error },

    #[snafu(display("{source}"))]
    AwaitLog { source: vigil_poll::Error<crate::log_source::Error> },

    #[snafu(display(
        "Timed out after {elapsed_secs}s and {polls} polls waiting for '{pattern}' in logs of \
         {target} in namespace {namespace}"
    ))]
    LogPatternTimedOut {
        namespace: String,
        target: String,
        pattern: String,
        polls: u32,
        elapsed_secs: u64,
    },

    #[snafu(display("Patch preset '{preset_name}' not found"))]
    PresetNotFound { preset_name: String },

    #[snafu(display("No pod given: pass a pod name, a label selector or an app name"))]
    MissingPodTarget,

    #[snafu(display("Failed to get deployment {deployment} in namespace {namespace}, error: {source}"))]
    GetDeployment {
        namespace: String,
        deployment: String,
        #[snafu(source(from(kube::Error, Box::new)))]
        source: Box<kube::Error>,
    },

    #[snafu(display(
        "Failed to list pods matching '{selector}' in namespace {namespace}, error: {source}"
    ))]
    ListPods {
        namespace: String,
        selector: String,
        #[snafu(source(from(kube::Error, Box::new)))]
        source: Box<kube::Error>,
    },

    #[snafu(display(
        "Deployment {deployment} has containers [{}], pick one with --container",
        containers.join(", ")
    ))]
    AmbiguousContainer { deployment: String, containers: Vec<String> },

    #[snafu(display("Failed to serialize patch, error: {source}"))]
    SerializePatch { source: serde_json::Error },

    #[snafu(display("Failed to write to stdout, error: {source}"))]
    WriteStdout { source: std::io::Error },

    #[snafu(display("Failed to initialize Kubernetes client configuration, error: {source}"))]
    KubeConfig { source: kube::Error },

    #[snafu(display("Failed to create tokio runtime, error: {source}"))]
    InitializeTokioRuntime { source: std::io::Error },
}

impl From<crate::config::Error> for Error {
    fn from(source: crate::config::Error) -> Self { Self::Configuration { source } }
}

impl From<crate::patch::Error> for Error {
    fn from(source: crate::patch::Error) -> Self { Self::Patch { source } }
}

impl From<crate::probe::Error> for Error {
    fn from(source: crate::probe::Error) -> Self { Self::Probe { source } }
}

impl From<vigil_poll::Error<crate::log_source::Error>> for Error {
    fn from(source: vigil_poll::Error<crate::log_source::Error>) -> Self {
        Self::AwaitLog { source }
    }
}
