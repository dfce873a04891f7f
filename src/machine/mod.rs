use sha2::{Digest, Sha256};

/// Stable per-host identity used as the license lookup key. Best-effort:
/// not guaranteed unique across all hardware configurations.
pub trait MachineIdentity {
    fn identity(&self) -> String;
}

/// Default identity provider. The fingerprint is derived from a prioritized
/// list of hardware sources, each allowed to fail silently; when none yield
/// anything the host name stands in, trading uniqueness for availability.
#[derive(Debug, Clone)]
pub struct Machine {
    pub fingerprint: String,
    pub hostname: String,
    pub platform: String,
    pub user_agent: String,
}

impl Machine {
    pub fn new(app_name: &str, app_version: &str) -> Self {
        let hostname = whoami::fallible::hostname().unwrap_or_else(|_| whoami::devicename());

        let os_name = format!("{}", whoami::platform());
        let os_version = whoami::distro();
        let arch = format!("{}", whoami::arch());
        let platform = format!("{} - {} - {}", os_name, os_version, arch);

        let user_agent = format!("{}/{} {}/{} {}", app_name, app_version, os_name, os_version, arch);

        let fingerprint = derive_fingerprint(&hostname);

        Self {
            fingerprint,
            hostname,
            platform,
            user_agent,
        }
    }
}

impl MachineIdentity for Machine {
    fn identity(&self) -> String {
        self.fingerprint.clone()
    }
}

fn derive_fingerprint(hostname: &str) -> String {
    // hardware sources in priority order; each may be unavailable
    let mut identifiers: Vec<String> = Vec::new();

    if let Ok(machine_id) = machine_uid::get() {
        if !machine_id.is_empty() {
            identifiers.push(machine_id);
        }
    }

    if identifiers.is_empty() {
        identifiers.push(hostname.to_string());
    }

    let mut sha = Sha256::new();
    sha.update(identifiers.join("-"));
    hex::encode(sha.finalize())
}
