mod auth;
mod core;
pub mod store;

pub use crate::core::domain::error::{ConfigurationError, ProxmoxError, ProxmoxResult};
pub use crate::core::domain::model::cluster_connection::ClusterConnection;
pub use crate::core::domain::model::credentials::Credentials;
pub use crate::core::domain::model::node::NodeListItem;
pub use crate::core::domain::model::session::{Session, TicketSession};
pub use crate::core::domain::model::vm::VmListItem;
pub use crate::core::domain::value_object::{ApiPort, AuthRealm, ClusterHost};
pub use crate::core::infrastructure::executor::{
    ClientConfig, RateLimitConfig, RequestExecutor, RequestParams, Verb,
};

use crate::auth::application::service::session_service::SessionService;
use crate::core::infrastructure::registry::NodeRegistry;
use serde_json::Value;
use tracing::{debug, warn};

/// Remote-side timeout hint, in seconds, attached to the timed lifecycle
/// actions. This is a parameter of the remote task, not a client deadline.
const REMOTE_ACTION_TIMEOUT_SECS: u32 = 60;

const DEFAULT_PORT: u16 = 8006;

/// A client for one configured Proxmox VE cluster.
///
/// Covers what a billing module needs: ticket/token authentication, node
/// discovery, a cluster-wide VM listing, lifecycle actions, clone and
/// snapshot, plus raw verb methods for everything else.
///
/// # Examples
///
/// ```no_run
/// use proxbill::{ClusterClient, ProxmoxResult};
///
/// #[tokio::main]
/// async fn main() -> ProxmoxResult<()> {
///     let client = ClusterClient::builder()
///         .host("pve.example.com")
///         .port(8006)
///         .realm("pam")
///         .credentials("provisioner", "password")
///         .verify_tls(true)
///         .build()
///         .await?;
///
///     if client.login().await {
///         if let Some(vms) = client.vms().await? {
///             for vm in vms {
///                 println!("{} on {}", vm.vmid, vm.node);
///             }
///         }
///     }
///     Ok(())
/// }
/// ```
pub struct ClusterClient {
    executor: RequestExecutor,
    registry: NodeRegistry,
}

/// Builder for [`ClusterClient`] configuration.
#[derive(Debug, Default)]
pub struct ClusterClientBuilder {
    host: Option<String>,
    port: Option<u16>,
    realm: Option<String>,
    username: Option<String>,
    password: Option<String>,
    token_id: Option<String>,
    token_secret: Option<String>,
    verify_tls: bool,
    debug: bool,
    config: ClientConfig,
}

impl ClusterClientBuilder {
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn realm(mut self, realm: impl Into<String>) -> Self {
        self.realm = Some(realm.into());
        self
    }

    /// Username/password pair for ticket-based access.
    pub fn credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// API-token pair. A complete token pair takes precedence over a
    /// username/password pair.
    pub fn api_token(
        mut self,
        token_id: impl Into<String>,
        token_secret: impl Into<String>,
    ) -> Self {
        self.token_id = Some(token_id.into());
        self.token_secret = Some(token_secret.into());
        self
    }

    /// Whether to verify the cluster's TLS certificate. Off by default;
    /// Proxmox installations commonly run on self-signed certificates.
    pub fn verify_tls(mut self, verify_tls: bool) -> Self {
        self.verify_tls = verify_tls;
        self
    }

    /// Verbose request/response dumps in error messages.
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Validates the configuration and assembles the client.
    ///
    /// This is the single validation gate: blank hostname or realm, port 0,
    /// an incomplete credential pair, or an unresolvable non-IP hostname all
    /// fail here with `ProxmoxError::Configuration`, before any API traffic.
    pub async fn build(self) -> ProxmoxResult<ClusterClient> {
        let port = ApiPort::new(self.port.unwrap_or(DEFAULT_PORT))?;
        let host = ClusterHost::resolve(self.host.as_deref().unwrap_or_default(), port.get())
            .await?;
        let realm = AuthRealm::new(self.realm.as_deref().unwrap_or_default())?;
        let credentials = Credentials::resolve(
            self.username,
            self.password,
            self.token_id,
            self.token_secret,
        )?;
        let connection = ClusterConnection::new(
            host,
            port,
            realm,
            credentials,
            self.verify_tls,
            self.debug,
        )?;

        ClusterClient::new(connection, self.config)
    }
}

impl ClusterClient {
    /// Creates a new builder.
    pub fn builder() -> ClusterClientBuilder {
        ClusterClientBuilder::default()
    }

    /// Assembles a client from an already-validated connection.
    pub fn new(connection: ClusterConnection, config: ClientConfig) -> ProxmoxResult<Self> {
        Ok(Self {
            executor: RequestExecutor::new(connection, config)?,
            registry: NodeRegistry::new(),
        })
    }

    /// Returns the connection parameters.
    pub fn connection(&self) -> &ClusterConnection {
        self.executor.connection()
    }

    /// Returns `true` when the client authenticates with an API token.
    pub fn uses_api_token(&self) -> bool {
        self.connection().credentials().is_token()
    }

    /// Returns `true` while requests can be signed: always for token
    /// access, and while an unexpired ticket is held for password access.
    pub async fn is_session_valid(&self) -> bool {
        self.executor.is_session_valid().await
    }

    /// Returns a snapshot of the current session, e.g. for persisting a
    /// ticket between application runs.
    pub async fn session(&self) -> Option<Session> {
        self.executor.session().await
    }

    /// Installs a previously persisted ticket session. Ignored for token
    /// access, which needs no ticket.
    pub async fn restore_session(&self, session: TicketSession) {
        if !self.uses_api_token() {
            self.executor.set_session(Session::Ticket(session)).await;
        }
    }

    /// Authenticates against the cluster.
    ///
    /// Token access probes `/version` with the token; password access runs
    /// the `/access/ticket` exchange and stores the resulting ticket. On
    /// success the node cache is warmed (a failed warm-up does not fail the
    /// login). Failures are absorbed into `false` — "could not log in" is
    /// ordinary control flow for the callers of this client.
    pub async fn login(&self) -> bool {
        let authenticated = match self.connection().credentials() {
            Credentials::Token { .. } => match self.executor.get("/version").await {
                // A null payload is the executor's 500 convention, which is
                // not a successful probe.
                Ok(value) if !value.is_null() => true,
                Ok(_) => {
                    debug!("API token probe returned no usable payload");
                    false
                }
                Err(e) => {
                    debug!(error = %e, "API token probe failed");
                    false
                }
            },
            Credentials::Password { .. } => {
                match SessionService::new().execute(self.connection()).await {
                    Ok(session) => {
                        self.executor.set_session(Session::Ticket(session)).await;
                        true
                    }
                    Err(e) => {
                        debug!(error = %e, "ticket login failed");
                        false
                    }
                }
            }
        };

        if authenticated {
            self.registry.reload(&self.executor).await;
        }
        authenticated
    }

    /// Refreshes the node-name cache from `/nodes`. Returns `false` and
    /// leaves the cache untouched when the listing fails or is empty.
    pub async fn reload_nodes(&self) -> bool {
        self.registry.reload(&self.executor).await
    }

    /// The cluster's node names, loading them on first use. `None` when the
    /// listing cannot be obtained.
    pub async fn nodes(&self) -> Option<Vec<String>> {
        self.registry.nodes(&self.executor).await
    }

    /// The installed Proxmox VE version.
    pub async fn version(&self) -> ProxmoxResult<Option<String>> {
        let data = self.executor.get("/version").await?;
        Ok(data
            .get("version")
            .and_then(Value::as_str)
            .map(str::to_string))
    }

    /// The next free VM identifier. `None` when the cluster returns nothing
    /// usable (including a literal 0).
    pub async fn next_vmid(&self) -> ProxmoxResult<Option<u32>> {
        let data = self.executor.get("/cluster/nextid").await?;
        Ok(vmid_from_value(&data))
    }

    /// Lists every VM in the cluster, one GET per node, in node order.
    ///
    /// Each record's `node` field is overwritten with the node that
    /// reported it. `None` when the node listing is unavailable or no node
    /// yielded a single VM.
    pub async fn vms(&self) -> ProxmoxResult<Option<Vec<VmListItem>>> {
        let Some(nodes) = self.registry.nodes(&self.executor).await else {
            return Ok(None);
        };

        let mut result = Vec::new();
        for node in &nodes {
            let listing = self.executor.get(&format!("nodes/{}/qemu/", node)).await?;
            let Value::Array(entries) = listing else {
                continue;
            };
            for mut entry in entries {
                if let Value::Object(record) = &mut entry {
                    record.insert("node".to_string(), Value::String(node.clone()));
                }
                match serde_json::from_value::<VmListItem>(entry) {
                    Ok(vm) => result.push(vm),
                    Err(e) => warn!(node = %node, error = %e, "skipping malformed VM record"),
                }
            }
        }

        Ok((!result.is_empty()).then_some(result))
    }

    /// Runs a lifecycle action through `/nodes/{node}/qemu/{vmid}/status/{action}`.
    ///
    /// Returns `true` iff the API answered with a truthy payload. A 500 —
    /// the cluster's answer for a guest already in the requested state —
    /// comes back as `false`, not as an error.
    pub async fn manage_vm(
        &self,
        node: &str,
        vmid: u32,
        action: &str,
        params: RequestParams,
    ) -> ProxmoxResult<bool> {
        let path = format!("/nodes/{}/qemu/{}/status/{}", node, vmid, action);
        let result = self.executor.post(&path, &params).await?;
        Ok(is_truthy(&result))
    }

    /// Starts a VM.
    pub async fn start_vm(&self, node: &str, vmid: u32) -> ProxmoxResult<bool> {
        self.manage_vm(node, vmid, "start", guest_params(node, vmid))
            .await
    }

    /// Gracefully shuts a VM down.
    pub async fn shutdown_vm(&self, node: &str, vmid: u32) -> ProxmoxResult<bool> {
        self.manage_vm(node, vmid, "shutdown", timed_guest_params(node, vmid))
            .await
    }

    /// Hard-stops a VM.
    pub async fn stop_vm(&self, node: &str, vmid: u32) -> ProxmoxResult<bool> {
        self.manage_vm(node, vmid, "stop", timed_guest_params(node, vmid))
            .await
    }

    /// Resumes a suspended VM.
    pub async fn resume_vm(&self, node: &str, vmid: u32) -> ProxmoxResult<bool> {
        self.manage_vm(node, vmid, "resume", timed_guest_params(node, vmid))
            .await
    }

    /// Suspends a VM.
    pub async fn suspend_vm(&self, node: &str, vmid: u32) -> ProxmoxResult<bool> {
        self.manage_vm(node, vmid, "suspend", timed_guest_params(node, vmid))
            .await
    }

    /// Full-clones a VM to the next free identifier.
    ///
    /// When no usable next id comes back, the clone is still posted with
    /// `newid` absent and the cluster decides; callers should expect that
    /// to fail remotely.
    pub async fn clone_vm(&self, node: &str, vmid: u32) -> ProxmoxResult<bool> {
        let newid = self.next_vmid().await?;

        let mut params = guest_params(node, vmid);
        if let Some(newid) = newid {
            params.push(("newid".to_string(), newid.to_string()));
        }
        params.push(("full".to_string(), "1".to_string()));

        let path = format!("/nodes/{}/qemu/{}/clone", node, vmid);
        let result = self.executor.post(&path, &params).await?;
        Ok(is_truthy(&result))
    }

    /// Snapshots a VM, including its runtime state.
    pub async fn snapshot_vm(
        &self,
        node: &str,
        vmid: u32,
        name: Option<&str>,
    ) -> ProxmoxResult<bool> {
        let mut params = guest_params(node, vmid);
        params.push(("vmstate".to_string(), "1".to_string()));
        if let Some(name) = name {
            params.push(("snapname".to_string(), name.to_string()));
        }

        let path = format!("/nodes/{}/qemu/{}/snapshot", node, vmid);
        let result = self.executor.post(&path, &params).await?;
        Ok(is_truthy(&result))
    }

    /// Raw GET against an arbitrary API path.
    pub async fn get(&self, path: &str) -> ProxmoxResult<Value> {
        self.executor.get(path).await
    }

    /// Raw POST against an arbitrary API path.
    pub async fn post(&self, path: &str, params: RequestParams) -> ProxmoxResult<Value> {
        self.executor.post(path, &params).await
    }

    /// Raw PUT against an arbitrary API path.
    pub async fn put(&self, path: &str, params: RequestParams) -> ProxmoxResult<Value> {
        self.executor.put(path, &params).await
    }

    /// Raw DELETE against an arbitrary API path.
    pub async fn delete(&self, path: &str) -> ProxmoxResult<Value> {
        self.executor.delete(path).await
    }

    #[cfg(test)]
    pub(crate) fn executor(&self) -> &RequestExecutor {
        &self.executor
    }
}

fn guest_params(node: &str, vmid: u32) -> RequestParams {
    vec![
        ("vmid".to_string(), vmid.to_string()),
        ("node".to_string(), node.to_string()),
    ]
}

fn timed_guest_params(node: &str, vmid: u32) -> RequestParams {
    let mut params = guest_params(node, vmid);
    params.push((
        "timeout".to_string(),
        REMOTE_ACTION_TIMEOUT_SECS.to_string(),
    ));
    params
}

/// Interprets an API payload as a success flag: null, false, zero, empty
/// strings, `"0"` and empty collections all count as failure.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().map(|n| n != 0.0).unwrap_or(true),
        Value::String(text) => !(text.is_empty() || text == "0"),
        Value::Array(items) => !items.is_empty(),
        Value::Object(members) => !members.is_empty(),
    }
}

/// Reads a usable VM identifier out of a `/cluster/nextid` payload; the
/// endpoint reports the id as a JSON string on current releases.
fn vmid_from_value(value: &Value) -> Option<u32> {
    match value {
        Value::Number(number) => number
            .as_u64()
            .filter(|&id| id != 0)
            .and_then(|id| u32::try_from(id).ok()),
        Value::String(text) => text.parse::<u32>().ok().filter(|&id| id != 0),
        _ => None,
    }
}
