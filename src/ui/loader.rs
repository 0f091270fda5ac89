//! Mount-time loading of an edition-specific component
//!
//! [`EditionLoader`] stands in for a component whose implementation depends
//! on the UI edition. Mounting starts resolution in the background; until it
//! finishes the mounted view renders a placeholder. Once resolved, rendering
//! forwards the caller's properties unchanged to the loaded implementation.
//! A result arriving after unmount is dropped without touching view state.
//!
//! All mounts of one loader (and its clones) share a single resolution, so
//! concurrent mounts never load the same component twice.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::{watch, OnceCell};
use tracing::{debug, warn};

use super::{escape_html, load_component, UiComponent, UiRegistry};
use crate::error::UiLoadError;

pub const LOADING_PLACEHOLDER: &str = "<div>Loading...</div>";

enum LoadState<P> {
    Loading,
    Ready(Arc<dyn UiComponent<P>>),
    Failed(UiLoadError),
}

struct ViewState<P> {
    mounted: bool,
    state: LoadState<P>,
    updates: usize,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

type Resolution<P> = Result<Arc<dyn UiComponent<P>>, UiLoadError>;

pub struct EditionLoader<P> {
    registry: Arc<UiRegistry<P>>,
    load_dir: String,
    file_name: String,
    edition: String,
    resolved: Arc<OnceCell<Resolution<P>>>,
}

impl<P> Clone for EditionLoader<P> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            load_dir: self.load_dir.clone(),
            file_name: self.file_name.clone(),
            edition: self.edition.clone(),
            resolved: Arc::clone(&self.resolved),
        }
    }
}

impl<P: Send + Sync + 'static> EditionLoader<P> {
    /// `edition` is the raw UI edition setting, read once at boot.
    pub fn new(
        registry: Arc<UiRegistry<P>>,
        load_dir: impl Into<String>,
        file_name: impl Into<String>,
        edition: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            load_dir: load_dir.into(),
            file_name: file_name.into(),
            edition: edition.into(),
            resolved: Arc::new(OnceCell::new()),
        }
    }

    /// The one resolution shared by every mount. A failure is kept as well:
    /// an unknown edition or missing component does not fix itself.
    async fn resolve(&self) -> Resolution<P> {
        self.resolved
            .get_or_init(|| {
                load_component(
                    &self.registry,
                    &self.load_dir,
                    &self.file_name,
                    &self.edition,
                )
            })
            .await
            .clone()
    }

    /// Mount the component and start resolving its implementation.
    /// Must be called from within a tokio runtime.
    pub fn mount(&self) -> MountedComponent<P> {
        let view = Arc::new(Mutex::new(ViewState {
            mounted: true,
            state: LoadState::Loading,
            updates: 0,
        }));
        let (settled_tx, settled_rx) = watch::channel(false);

        let task_view = Arc::clone(&view);
        let loader = self.clone();
        tokio::spawn(async move {
            let outcome = loader.resolve().await;

            {
                let mut view = lock(&task_view);
                if !view.mounted {
                    debug!(
                        "Discarding {}/{} resolved after unmount",
                        loader.load_dir, loader.file_name
                    );
                    return;
                }
                view.state = match outcome {
                    Ok(component) => LoadState::Ready(component),
                    Err(e) => {
                        warn!("Failed to load UI component: {}", e);
                        LoadState::Failed(e)
                    }
                };
                view.updates += 1;
            }
            let _ = settled_tx.send(true);
        });

        MountedComponent {
            view,
            settled: settled_rx,
        }
    }
}

/// A mounted instance. Dropping it unmounts.
pub struct MountedComponent<P> {
    view: Arc<Mutex<ViewState<P>>>,
    settled: watch::Receiver<bool>,
}

impl<P> MountedComponent<P> {
    /// Placeholder while pending, the loaded component once ready, or a
    /// visible error when loading failed.
    pub fn render(&self, props: &P) -> String {
        let view = lock(&self.view);
        match &view.state {
            LoadState::Loading => LOADING_PLACEHOLDER.to_string(),
            LoadState::Ready(component) => component.render(props),
            LoadState::Failed(e) => {
                format!(r#"<div role="alert">{}</div>"#, escape_html(&e.to_string()))
            }
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(lock(&self.view).state, LoadState::Loading)
    }

    pub fn is_mounted(&self) -> bool {
        lock(&self.view).mounted
    }

    /// Number of times resolution wrote to this view.
    pub fn state_updates(&self) -> usize {
        lock(&self.view).updates
    }

    /// Wait until resolution has finished, whether or not it was applied.
    pub async fn settled(&self) {
        let mut settled = self.settled.clone();
        // Err means the loader task ended without publishing (unmounted).
        let _ = settled.wait_for(|done| *done).await;
    }

    pub fn unmount(&self) {
        lock(&self.view).mounted = false;
    }
}

impl<P> Drop for MountedComponent<P> {
    fn drop(&mut self) {
        self.unmount();
    }
}
