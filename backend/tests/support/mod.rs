#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use evv_backend::config::ServiceSettings;
use evv_backend::db::{LocalRepository, Repositories};
use evv_backend::models::{Coordinates, Schedule};
use evv_backend::services::Services;

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// This is panic-safe (restores variables on unwind) and also serializes access to
/// process-global env vars to avoid flaky tests when Rust runs tests in parallel.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

/// A local store plus services over it. The store handle is kept for
/// seeding data and injecting failures.
pub struct Harness {
    pub store: Arc<LocalRepository>,
    pub repos: Repositories,
    pub services: Services,
}

pub fn harness() -> Harness {
    harness_with(ServiceSettings::default())
}

pub fn harness_with(settings: ServiceSettings) -> Harness {
    let store = Arc::new(LocalRepository::new());
    let repos = Repositories::from_store(Arc::clone(&store));
    let services = Services::new(&repos, &settings);
    Harness {
        store,
        repos,
        services,
    }
}

pub fn sample_schedule(client_name: &str) -> Schedule {
    Schedule::new(client_name, "09:00-17:00", "123 Main St, Springfield")
}

/// Lower Manhattan.
pub fn check_in_location() -> Coordinates {
    Coordinates::new(40.7128, -74.0060)
}

/// Midtown Manhattan.
pub fn check_out_location() -> Coordinates {
    Coordinates::new(40.7589, -73.9851)
}
