//! Backend REST endpoints the GUI talks to.

pub const TOKENS: &str = "/api/v1/authorizations/tokens/";
pub const DEPLOYS: &str = "/api/v1/deploys/";
pub const DEPLOY_CLUSTER_APPLICATIONS: &str = "/api/v1/deployclusterapplications/";
pub const CLUSTER_APPLICATIONS: &str = "/api/v1/clusterapplications/";
pub const NOTIFIERS: &str = "/api/v1/notifiers/";
pub const EMAIL_SERVERS: &str = "/api/v1/notifiers/emailserversmtp/";
pub const SERVICES: &str = "/api/v1/services/";
pub const DEPLOY_BLUE_GREENS: &str = "/api/v1/deploybluegreens/";
pub const DEPLOY_BLUE_GREEN_DEPLOYABLE: &str = "/api/v1/deploybluegreens/deployable/";

/// `base` with a single percent-encoded path segment appended, e.g.
/// `/api/v1/clusterapplications/my-app`.
pub fn item(base: &str, name: &str) -> String {
    format!("{}{}", base, urlencoding::encode(name))
}

/// Tell the backend which kube-apiserver to forward to.
pub fn with_kubeapi(path: &str, kubeapi_host: &str, kubeapi_port: u16) -> String {
    format!(
        "{}?kubeapihost={}&kubeapiport={}",
        path,
        urlencoding::encode(kubeapi_host),
        kubeapi_port
    )
}

pub fn services_in(namespace: &str, kubeapi_host: &str, kubeapi_port: u16) -> String {
    with_kubeapi(&item(SERVICES, namespace), kubeapi_host, kubeapi_port)
}

/// Namespaces where `image` is deployed and could take blue-green traffic.
pub fn deployable_namespaces(image: &str, kubeapi_host: &str, kubeapi_port: u16) -> String {
    with_kubeapi(
        &item(DEPLOY_BLUE_GREEN_DEPLOYABLE, image),
        kubeapi_host,
        kubeapi_port,
    )
}
