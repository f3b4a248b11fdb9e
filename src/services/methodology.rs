//! Methodology menu service
//!
//! The menu is one document keyed by methodology name. All access goes
//! through [`MethodologySingleton`] so no caller builds its own query.

use bson::doc;
use std::sync::Arc;
use tracing::debug;

use crate::db::schemas::Framework;
use crate::db::{DocumentStore, MethodologyDoc};
use crate::services::shared::list_set;
use crate::types::{Result, ThinkBeyondError};

/// Handle on the single methodology document
#[derive(Clone)]
pub struct MethodologySingleton {
    store: Arc<dyn DocumentStore<MethodologyDoc>>,
    name: String,
}

impl MethodologySingleton {
    pub fn new(store: Arc<dyn DocumentStore<MethodologyDoc>>, name: impl Into<String>) -> Self {
        Self {
            store,
            name: name.into(),
        }
    }

    pub async fn load(&self) -> Result<MethodologyDoc> {
        self.store
            .find_one(doc! { "methodology": self.name.as_str() })
            .await?
            .ok_or_else(|| self.missing())
    }

    /// Overwrite the framework list and return the stored document
    pub async fn store_frameworks(&self, frameworks: &[Framework]) -> Result<MethodologyDoc> {
        self.store
            .update_one(
                doc! { "methodology": self.name.as_str() },
                list_set("frameworks", frameworks)?,
            )
            .await?
            .ok_or_else(|| self.missing())
    }

    fn missing(&self) -> ThinkBeyondError {
        ThinkBeyondError::NotFound(format!("methodology {}", self.name))
    }
}

#[derive(Clone)]
pub struct MethodologyService {
    singleton: MethodologySingleton,
    default_framework: String,
}

impl MethodologyService {
    pub fn new(singleton: MethodologySingleton, default_framework: impl Into<String>) -> Self {
        Self {
            singleton,
            default_framework: default_framework.into(),
        }
    }

    pub async fn get(&self) -> Result<MethodologyDoc> {
        self.singleton.load().await
    }

    pub async fn set_frameworks(&self, frameworks: &[Framework]) -> Result<MethodologyDoc> {
        self.singleton.store_frameworks(frameworks).await
    }

    /// Select (or deselect) one canvas; every sibling is deselected. An
    /// unknown canvas name leaves the framework with nothing selected.
    pub async fn set_canvas_selected(
        &self,
        framework: Option<&str>,
        canvas: &str,
        value: bool,
    ) -> Result<MethodologyDoc> {
        self.modify_framework(framework, canvas, |fw| {
            for entry in fw.canvases.iter_mut() {
                entry.selected = entry.name == canvas && value;
            }
        })
        .await
    }

    pub async fn set_canvas_locked(
        &self,
        framework: Option<&str>,
        canvas: &str,
        value: bool,
    ) -> Result<MethodologyDoc> {
        // An unknown canvas leaves the menu as it was
        self.modify_framework(framework, canvas, |fw| {
            if let Some(entry) = fw.canvas_mut(canvas) {
                entry.locked = value;
            }
        })
        .await
    }

    async fn modify_framework<F>(&self, framework: Option<&str>, canvas: &str, apply: F) -> Result<MethodologyDoc>
    where
        F: FnOnce(&mut Framework),
    {
        let framework = framework.unwrap_or(&self.default_framework);
        let mut methodology = self.singleton.load().await?;

        let fw = methodology
            .framework_mut(framework)
            .ok_or_else(|| ThinkBeyondError::NotFound(format!("framework {}", framework)))?;
        apply(fw);
        debug!(framework, canvas, "Menu canvas updated");

        self.singleton.store_frameworks(&methodology.frameworks).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schemas::CanvasEntry;
    use crate::db::Collections;

    fn entry(name: &str, selected: bool) -> CanvasEntry {
        CanvasEntry {
            name: name.into(),
            selected,
            locked: true,
            route: None,
        }
    }

    async fn seeded() -> MethodologyService {
        let collections = Collections::memory();
        let doc = MethodologyDoc {
            id: None,
            methodology: "ThinkBeyond".into(),
            frameworks: vec![
                Framework {
                    name: "Micro frameworks".into(),
                    canvases: vec![
                        entry("Business Model Canvas", true),
                        entry("Customer Value Proposition Canvas", false),
                    ],
                },
                Framework {
                    name: "Macro frameworks".into(),
                    canvases: vec![entry("PESTLE", true)],
                },
            ],
        };
        collections.methodology.insert_one(doc).await.unwrap();
        MethodologyService::new(
            MethodologySingleton::new(collections.methodology.clone(), "ThinkBeyond"),
            "Micro frameworks",
        )
    }

    #[tokio::test]
    async fn test_select_clears_siblings_in_default_framework() {
        let service = seeded().await;

        let menu = service
            .set_canvas_selected(None, "Customer Value Proposition Canvas", true)
            .await
            .unwrap();
        let micro = &menu.frameworks[0].canvases;
        assert!(!micro[0].selected);
        assert!(micro[1].selected);
        // Other frameworks keep their selection
        assert!(menu.frameworks[1].canvases[0].selected);
    }

    #[tokio::test]
    async fn test_lock_targets_named_framework() {
        let service = seeded().await;

        let menu = service
            .set_canvas_locked(Some("Macro frameworks"), "PESTLE", false)
            .await
            .unwrap();
        assert!(!menu.frameworks[1].canvases[0].locked);
        assert!(menu.frameworks[0].canvases.iter().all(|c| c.locked));
    }

    #[tokio::test]
    async fn test_unknown_framework_is_not_found() {
        let service = seeded().await;
        let err = service
            .set_canvas_locked(Some("Nope"), "PESTLE", false)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_selecting_unknown_canvas_clears_selection() {
        let service = seeded().await;

        let menu = service.set_canvas_selected(None, "Unknown", true).await.unwrap();
        assert!(menu.frameworks[0].canvases.iter().all(|c| !c.selected));
        assert!(menu.frameworks[1].canvases[0].selected);

        let stored = service.get().await.unwrap();
        assert!(stored.frameworks[0].canvases.iter().all(|c| !c.selected));
    }

    #[tokio::test]
    async fn test_locking_unknown_canvas_changes_nothing() {
        let service = seeded().await;
        let before = service.get().await.unwrap();

        let menu = service.set_canvas_locked(None, "Unknown", false).await.unwrap();
        assert_eq!(menu.frameworks, before.frameworks);
    }

    #[tokio::test]
    async fn test_set_frameworks_replaces_list() {
        let service = seeded().await;
        let menu = service
            .set_frameworks(&[Framework { name: "Only".into(), canvases: vec![] }])
            .await
            .unwrap();
        assert_eq!(menu.frameworks.len(), 1);
        assert_eq!(service.get().await.unwrap().frameworks[0].name, "Only");
    }

    #[tokio::test]
    async fn test_missing_singleton_is_not_found() {
        let service = MethodologyService::new(
            MethodologySingleton::new(Collections::memory().methodology, "ThinkBeyond"),
            "Micro frameworks",
        );
        assert!(service.get().await.unwrap_err().is_not_found());
    }
}
