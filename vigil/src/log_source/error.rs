use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display(
        "Failed to list pods matching '{selector}' in namespace {namespace}, error: {source}"
    ))]
    ListPods {
        namespace: String,
        selector: String,
        #[snafu(source(from(kube::Error, Box::new)))]
        source: Box<kube::Error>,
    },

    #[snafu(display("No running pod matches '{selector}' in namespace {namespace}"))]
    NoPodMatches { namespace: String, selector: String },

    #[snafu(display("Failed to read logs of pod {pod_name} in namespace {namespace}, error: {source}"))]
    ReadLogs {
        namespace: String,
        pod_name: String,
        #[snafu(source(from(kube::Error, Box::new)))]
        source: Box<kube::Error>,
    },
}
