use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use chrono::Local;
use serde_json::{json, Value};

use app_hub::{AppHub, Denial, Document, DocumentStore, MemoryStore};

const HWID: &str = "24e00839c478ec63017f05a0453532ba";

/// Shared-handle store: tests keep a clone to mutate documents and inspect
/// fetch counts while the hub owns the other clone.
#[derive(Clone, Default)]
struct TestStore {
    documents: Rc<RefCell<HashMap<String, Document>>>,
    calls: Rc<RefCell<HashMap<String, usize>>>,
}

impl TestStore {
    fn set(&self, name: &str, value: Value) {
        self.documents
            .borrow_mut()
            .insert(name.to_string(), value.as_object().cloned().unwrap());
    }

    fn calls(&self, name: &str) -> usize {
        self.calls.borrow().get(name).copied().unwrap_or(0)
    }
}

impl DocumentStore for TestStore {
    fn fetch(&self, name: &str) -> Option<Document> {
        *self.calls.borrow_mut().entry(name.to_string()).or_insert(0) += 1;
        self.documents.borrow().get(name).cloned()
    }
}

fn licensed_store(user_entry: Value, record: Value) -> TestStore {
    let store = TestStore::default();
    store.set(
        "licenses",
        json!({
            "users": {"Pavel": user_entry},
            "apps": {"joystick": {"Pavel": record}}
        }),
    );
    store
}

fn hub_with(store: &TestStore) -> AppHub<TestStore> {
    AppHub::with_store("joystick", "5", HWID, store.clone())
}

fn yesterday() -> String {
    let date = Local::now().date_naive().pred_opt().unwrap();
    date.format("%Y-%m-%d").to_string()
}

fn tomorrow() -> String {
    let date = Local::now().date_naive().succ_opt().unwrap();
    date.format("%Y-%m-%d").to_string()
}

#[test]
fn empty_store_denies_with_document_unavailable() {
    let store = TestStore::default();
    let mut hub = hub_with(&store);

    assert_eq!(hub.check_license(), Err(Denial::DocumentUnavailable));
}

#[test]
fn failed_license_fetch_is_not_cached() {
    let store = TestStore::default();
    let mut hub = hub_with(&store);

    assert_eq!(hub.check_license(), Err(Denial::DocumentUnavailable));

    store.set(
        "licenses",
        json!({
            "users": {"Pavel": HWID},
            "apps": {"joystick": {"Pavel": {"active": true, "level": "PRO"}}}
        }),
    );

    let grant = hub.check_license().unwrap();
    assert_eq!(grant.level, "PRO");
    assert_eq!(store.calls("licenses"), 2);
}

#[test]
fn table_missing_apps_is_unavailable_not_a_panic() {
    let store = TestStore::default();
    store.set("licenses", json!({"users": {"Pavel": HWID}}));
    let mut hub = hub_with(&store);

    assert_eq!(hub.check_license(), Err(Denial::DocumentUnavailable));
}

#[test]
fn old_client_version_is_rejected_before_anything_else() {
    let mut store = MemoryStore::new();
    store.insert(
        "licenses",
        json!({
            "users": {},
            "apps": {},
            "min_version": "5"
        }),
    );
    let mut hub = AppHub::with_store("joystick", "4", HWID, store);

    assert_eq!(
        hub.check_license(),
        Err(Denial::VersionTooOld {
            current: 4,
            minimum: 5
        })
    );
}

#[test]
fn identity_not_found_carries_the_local_hwid() {
    let store = licensed_store(json!("someone-else"), json!({"active": true}));
    let mut hub = hub_with(&store);

    assert_eq!(
        hub.check_license(),
        Err(Denial::IdentityNotFound {
            hwid: HWID.to_string()
        })
    );
}

#[test]
fn active_license_grants_even_when_expiry_has_passed() {
    let store = licensed_store(
        json!(HWID),
        json!({"active": true, "expires": yesterday(), "level": "DEV"}),
    );
    let mut hub = hub_with(&store);

    let grant = hub.check_license().unwrap();
    assert_eq!(grant.user_name, "Pavel");
    assert_eq!(grant.level, "DEV");
    assert_eq!(grant.server_name, "global");
}

#[test]
fn expiry_in_the_past_denies_and_in_the_future_grants() {
    let store = licensed_store(json!(HWID), json!({"expires": yesterday()}));
    let mut hub = hub_with(&store);
    assert!(matches!(
        hub.check_license(),
        Err(Denial::LicenseExpired(_))
    ));

    let store = licensed_store(json!(HWID), json!({"expires": tomorrow()}));
    let mut hub = hub_with(&store);
    assert_eq!(hub.check_license().unwrap().level, "TRY");
}

#[test]
fn cascade_prefers_user_then_server_then_global() {
    let store = licensed_store(
        json!({"hwid": HWID, "server": "alure"}),
        json!({"active": true, "delay": 5}),
    );
    store.set(
        "alure",
        json!({
            "offsets": {"delay": 10, "CHAT_FUNC_OFFSET": "0x1a2b"}
        }),
    );
    store.set(
        "global",
        json!({
            "delay": 30,
            "CHAT_FUNC_OFFSET": "0xffff",
            "patterns": {"scan_step": 4}
        }),
    );

    let mut hub = hub_with(&store);
    hub.check_license().unwrap();
    assert_eq!(hub.server_name(), Some("alure"));
    assert_eq!(hub.user_name(), Some("Pavel"));

    // user record beats both documents
    assert_eq!(hub.get("delay"), Some(json!(5)));
    // server section beats the global top level
    assert_eq!(hub.get("CHAT_FUNC_OFFSET"), Some(json!("0x1a2b")));
    // global is the last resort
    assert_eq!(hub.get("scan_step"), Some(json!(4)));
    assert_eq!(hub.get("missing"), None);
}

#[test]
fn disabling_the_global_fallback_never_touches_the_global_document() {
    let store = licensed_store(json!({"hwid": HWID, "server": "alure"}), json!({"active": true}));
    store.set("alure", json!({"delay": 10}));
    store.set("global", json!({"scan_step": 4}));

    let mut hub = hub_with(&store);
    hub.check_license().unwrap();

    assert_eq!(hub.get_scoped("scan_step", false), None);
    assert_eq!(store.calls("global"), 0);

    assert_eq!(hub.get_scoped("scan_step", true), Some(json!(4)));
    assert_eq!(store.calls("global"), 1);
}

#[test]
fn server_document_is_fetched_once_per_session() {
    let store = licensed_store(json!({"hwid": HWID, "server": "alure"}), json!({"active": true}));
    store.set("alure", json!({"delay": 10, "scan_step": 4}));

    let mut hub = hub_with(&store);
    hub.check_license().unwrap();

    assert_eq!(hub.get("delay"), Some(json!(10)));
    assert_eq!(hub.get("scan_step"), Some(json!(4)));
    assert_eq!(store.calls("alure"), 1);
}

#[test]
fn default_server_skips_the_server_tier_entirely() {
    let store = licensed_store(json!(HWID), json!({"active": true}));
    store.set("global", json!({"delay": 30}));

    let mut hub = hub_with(&store);
    hub.check_license().unwrap();
    assert_eq!(hub.server_name(), Some("global"));

    assert_eq!(hub.get("delay"), Some(json!(30)));
    // only the licenses and global documents were ever fetched
    assert_eq!(store.calls("licenses"), 1);
    assert_eq!(store.calls("global"), 1);
}

#[test]
fn lookups_before_a_grant_consult_only_the_global_tier() {
    let store = licensed_store(json!({"hwid": HWID, "server": "alure"}), json!({"delay": 5}));
    store.set("alure", json!({"delay": 10}));
    store.set("global", json!({"delay": 30}));

    let mut hub = hub_with(&store);

    assert_eq!(hub.get("delay"), Some(json!(30)));
    assert_eq!(store.calls("alure"), 0);
}

#[test]
fn denial_does_not_capture_a_user_context() {
    let store = licensed_store(json!(HWID), json!({"expires": yesterday(), "delay": 5}));
    store.set("global", json!({"delay": 30}));

    let mut hub = hub_with(&store);
    assert!(hub.check_license().is_err());

    assert_eq!(hub.user_name(), None);
    assert_eq!(hub.server_name(), None);
    // the expired record's parameters stay out of the cascade
    assert_eq!(hub.get("delay"), Some(json!(30)));
}

#[test]
fn roster_is_available_even_after_a_denial() {
    let store = licensed_store(json!("someone-else"), json!({"active": true, "level": "PRO"}));
    let mut hub = hub_with(&store);

    assert!(hub.check_license().is_err());

    let roster = hub.roster().unwrap();
    assert_eq!(roster.len(), 1);
    assert_eq!(roster[0].user_name, "Pavel");
    assert_eq!(roster[0].level, "PRO");
    // the cached table is reused
    assert_eq!(store.calls("licenses"), 1);
}
