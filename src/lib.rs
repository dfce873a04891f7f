//! License-gated access to remotely distributed configuration.
//!
//! A hardware-bound identity is checked against a remotely hosted license
//! table; on success, named parameters resolve through a three-tier override
//! chain (per-user record, per-server document, global document) backed by
//! lazily fetched, session-cached JSON documents.
//!
//! ```no_run
//! use app_hub::Builder;
//!
//! let mut hub = Builder::new("joystick", "5").build();
//! match hub.check_license() {
//!     Ok(grant) => {
//!         println!("level {}", grant.level);
//!         let _delay = hub.get("delay");
//!     }
//!     Err(denial) => eprintln!("[{}] {}", denial.code(), denial),
//! }
//! ```

mod cache;
mod err;
mod licensed;
mod machine;
mod params;
mod report;
mod store;

use std::time::Duration;

use chrono::Local;
use log::warn;
use serde_json::Value;

use cache::DocumentCache;
use licensed::UserContext;

pub use err::{Denial, Error};
pub use licensed::types::{LicensesDocument, RosterEntry, UserEntry};
pub use licensed::{Grant, DEFAULT_SERVER};
pub use machine::{Machine, MachineIdentity};
pub use store::{Document, DocumentStore, HttpStore, MemoryStore};

pub type Result<T> = std::result::Result<T, Error>;

/// Default document location; override with [`Builder::base_url`].
pub const DEFAULT_BASE_URL: &str =
    "https://raw.githubusercontent.com/Zabavin-Pavel/app-licenses/refs/heads/main";

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Configuration for an [`AppHub`] backed by the default HTTP store and
/// hardware identity.
#[derive(Debug, Clone)]
pub struct Builder {
    app_name: String,
    client_version: String,
    base_url: String,
    timeout_secs: u64,
}

impl Builder {
    pub fn new(app_name: impl Into<String>, client_version: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            client_version: client_version.into(),
            base_url: DEFAULT_BASE_URL.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Uniform timeout applied to every outbound document lookup, clamped
    /// to 1..=300 seconds.
    pub fn timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs.clamp(1, 300);
        self
    }

    pub fn build(self) -> AppHub<HttpStore> {
        let machine = Machine::new(&self.app_name, &self.client_version);
        let store = HttpStore::new(
            self.base_url,
            Duration::from_secs(self.timeout_secs),
            machine.user_agent.clone(),
        );

        AppHub::with_store(
            self.app_name,
            self.client_version,
            machine.identity(),
            store,
        )
    }
}

/// License-gated configuration hub. One instance per process; documents are
/// fetched lazily and cached for the lifetime of the session.
pub struct AppHub<S = HttpStore> {
    app_name: String,
    client_version: String,
    hwid: String,
    store: S,
    cache: DocumentCache,
    context: Option<UserContext>,
}

impl<S: DocumentStore> AppHub<S> {
    /// Wire the hub to an explicit store and identity, bypassing hardware
    /// detection and HTTP. The [`Builder`] covers the common case.
    pub fn with_store(
        app_name: impl Into<String>,
        client_version: impl Into<String>,
        hwid: impl Into<String>,
        store: S,
    ) -> Self {
        Self {
            app_name: app_name.into(),
            client_version: client_version.into(),
            hwid: hwid.into(),
            store,
            cache: DocumentCache::new(),
            context: None,
        }
    }

    /// The identity this hub presents to the license table.
    pub fn hwid(&self) -> &str {
        &self.hwid
    }

    /// Full license check: table availability, version gate, identity scan,
    /// entitlement and record evaluation, in that order. Expiry is judged
    /// against the local wall clock. A grant captures the user context that
    /// the parameter cascade consumes; on `IdentityNotFound` the local
    /// identity is surfaced for manual registration.
    pub fn check_license(&mut self) -> std::result::Result<Grant, Denial> {
        let Some(table) = self.cache.licenses(&self.store) else {
            warn!("access denied: {}", Denial::DocumentUnavailable);
            return Err(Denial::DocumentUnavailable);
        };

        let today = Local::now().date_naive();
        match licensed::resolve(
            table,
            &self.hwid,
            &self.app_name,
            &self.client_version,
            today,
        ) {
            Ok((grant, context)) => {
                self.context = Some(context);
                Ok(grant)
            }
            Err(denial) => {
                warn!("access denied: {denial}");
                if matches!(denial, Denial::IdentityNotFound { .. }) {
                    report::expose_hwid(&self.hwid);
                }
                Err(denial)
            }
        }
    }

    /// Cascading parameter lookup with the global fallback enabled: user
    /// record first, then the server document, then the global document.
    pub fn get(&mut self, name: &str) -> Option<Value> {
        self.get_scoped(name, true)
    }

    /// Same cascade with the global fallback under caller control. With
    /// `global_fallback` off, a server-tier miss is final. Before a
    /// successful [`check_license`](Self::check_license) only the global
    /// tier is consulted.
    pub fn get_scoped(&mut self, name: &str, global_fallback: bool) -> Option<Value> {
        params::resolve_param(
            &mut self.cache,
            &self.store,
            self.context.as_ref(),
            name,
            global_fallback,
        )
    }

    /// User matched by the last successful check.
    pub fn user_name(&self) -> Option<&str> {
        self.context.as_ref().map(|context| context.user_name.as_str())
    }

    /// Home server resolved by the last successful check; [`DEFAULT_SERVER`]
    /// when the user record names none.
    pub fn server_name(&self) -> Option<&str> {
        self.context
            .as_ref()
            .map(|context| context.server_name.as_str())
    }

    /// Every user licensed for this application, with level, home server
    /// and status. `None` while the license table is unavailable or the
    /// application is not listed.
    pub fn roster(&mut self) -> Option<Vec<RosterEntry>> {
        let table = self.cache.licenses(&self.store)?;
        licensed::roster(table, &self.app_name)
    }
}
