use std::path::Path;
use std::sync::Arc;

use ac_core::config::Settings;
use anyhow::Result;
use arc_swap::ArcSwap;
use notify::{Event, EventKind, RecursiveMode, Watcher};

/// Lance un thread qui surveille le fichier config et met à jour l'ArcSwap.
///
/// `overrides` est rejoué sur chaque config rechargée (options CLI).
/// Retourne le Watcher (doit rester vivant tant que l'app tourne).
///
/// # Errors
/// Returns an error if the watcher cannot be created or the path cannot be watched.
pub fn spawn_settings_watcher<F>(
    config_path: &Path,
    settings: &Arc<ArcSwap<Settings>>,
    overrides: F,
) -> Result<impl Watcher + use<F>>
where
    F: Fn(&mut Settings) + Send + 'static,
{
    let settings = Arc::clone(settings);
    let path = config_path.to_path_buf();

    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
        let Ok(event) = res else {
            return;
        };
        if !matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
            return;
        }
        match ac_core::config::load_settings(&path) {
            Ok(mut reloaded) => {
                overrides(&mut reloaded);
                settings.store(Arc::new(reloaded));
                log::info!("Config rechargée depuis {}", path.display());
            }
            Err(e) => {
                // On garde l'ancienne config.
                log::warn!("Erreur de rechargement config : {e:#}");
            }
        }
    })?;

    watcher.watch(config_path, RecursiveMode::NonRecursive)?;
    Ok(watcher)
}

/// Remplace la config de rendu par une version modifiée (touches clavier).
pub fn update_settings(settings: &ArcSwap<Settings>, mutate: impl FnOnce(&mut Settings)) {
    let current = settings.load();
    let mut next = (**current).clone();
    mutate(&mut next);
    next.clamp_all();
    settings.store(Arc::new(next));
}
