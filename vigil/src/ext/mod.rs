//! Extensions to the `kube` API handles used by Vigil.

mod api_pod;

pub use self::api_pod::ApiPodExt;
