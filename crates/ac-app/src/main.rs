use std::sync::Arc;

use ac_core::config::Settings;
use ac_core::traits::VideoSource;
use anyhow::Result;
use arc_swap::ArcSwap;
use clap::Parser;

pub mod app;
pub mod cli;
pub mod hotreload;
pub mod keys;
pub mod render_loop;
pub mod scheduler;
pub mod snapshot;

fn main() -> Result<()> {
    // 1. Parser CLI
    let cli = cli::Cli::parse();

    // 2. Initialiser le logging (stderr ; niveau bas par défaut pour ne pas salir le TUI)
    env_logger::Builder::new()
        .filter_level(cli.log_level.parse().unwrap_or(log::LevelFilter::Warn))
        .init();

    // 3. Charger la config puis appliquer les overrides CLI
    let mut settings = resolve_settings(&cli)?;
    cli.apply_overrides(&mut settings);

    // 4. Source visuelle : image fixe ou caméra
    let mut source: Box<dyn VideoSource> = match cli.image {
        Some(ref path) => ac_source::image_source(path),
        None => ac_source::camera_source(&settings.camera),
    };

    // 5. Mode headless
    if let Some(ref out) = cli.snapshot {
        let path = snapshot::run_snapshot(source.as_mut(), &settings, out)?;
        println!("{}", path.display());
        return Ok(());
    }

    let settings = Arc::new(ArcSwap::from_pointee(settings));

    // 6. Hot-reload config (thread interne notify), overrides CLI rejoués
    let _watcher = if cli.config.exists() {
        let overrides = cli.clone();
        match hotreload::spawn_settings_watcher(&cli.config, &settings, move |s| {
            overrides.apply_overrides(s);
        }) {
            Ok(w) => Some(w),
            Err(e) => {
                log::warn!("Hot-reload désactivé : {e:#}");
                None
            }
        }
    } else {
        None
    };

    // 7. Construire l'App et démarrer la caméra (un échec laisse l'app inactive)
    let mut app_instance = app::App::new(Arc::clone(&settings), source);
    app_instance.activate();

    // 8. Initialiser le terminal ratatui
    let terminal = ratatui::init();

    // 9. Boucle principale
    let result = app_instance.run(terminal);

    // 10. Restaurer le terminal (TOUJOURS, même en cas d'erreur)
    ratatui::restore();

    result
}

/// Charge `--config` s'il existe, sinon les valeurs par défaut.
fn resolve_settings(cli: &cli::Cli) -> Result<Settings> {
    if cli.config.exists() {
        ac_core::config::load_settings(&cli.config)
    } else {
        log::warn!(
            "Config introuvable : {}. Utilisation des défauts.",
            cli.config.display()
        );
        Ok(Settings::default())
    }
}
