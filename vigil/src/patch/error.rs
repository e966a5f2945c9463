use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("Nothing to patch on container {container}: no image or environment given"))]
    EmptyPatch { container: String },

    #[snafu(display(
        "Failed to patch deployment {deployment} in namespace {namespace}, error: {source}"
    ))]
    PatchDeployment {
        namespace: String,
        deployment: String,
        #[snafu(source(from(kube::Error, Box::new)))]
        source: Box<kube::Error>,
    },
}
