use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Commande déclenchée par une touche.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Capture,
    Reset,
    Export,
    ToggleCamera,
    /// Pas de largeur (±1 pas de 4 colonnes).
    StepWidth(i32),
    StepFontSize(i32),
    SelectProfile(usize),
    NextProfile,
    ToggleHelp,
    Quit,
}

/// Touches toujours actives, caméra allumée ou non.
#[must_use]
pub fn map_key(key: &KeyEvent) -> Option<Action> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return matches!(key.code, KeyCode::Char('c')).then_some(Action::Quit);
    }
    let action = match key.code {
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Char('?') => Action::ToggleHelp,
        KeyCode::Char('r') => Action::Reset,
        KeyCode::Char('s') => Action::Export,
        KeyCode::Char('v') => Action::ToggleCamera,
        KeyCode::Char('[') => Action::StepWidth(-1),
        KeyCode::Char(']') => Action::StepWidth(1),
        KeyCode::Char('-') => Action::StepFontSize(-1),
        KeyCode::Char('+' | '=') => Action::StepFontSize(1),
        KeyCode::Char(c @ '1'..='3') => Action::SelectProfile(c as usize - '1' as usize),
        KeyCode::Tab => Action::NextProfile,
        _ => return None,
    };
    Some(action)
}

/// Abonnement clavier au raccourci de capture.
///
/// Créé quand la boucle de rendu démarre, lâché quand elle s'arrête : hors
/// de cette fenêtre, Espace ne fait rien.
#[derive(Debug)]
pub struct ShortcutSubscription {
    _private: (),
}

impl ShortcutSubscription {
    #[must_use]
    pub fn subscribe() -> Self {
        log::debug!("Raccourci capture actif");
        Self { _private: () }
    }

    /// `Some(Capture)` pour Espace.
    #[must_use]
    pub fn handle(&self, key: &KeyEvent) -> Option<Action> {
        (key.kind == KeyEventKind::Press
            && key.code == KeyCode::Char(' ')
            && !key.modifiers.contains(KeyModifiers::CONTROL))
        .then_some(Action::Capture)
    }
}

impl Drop for ShortcutSubscription {
    fn drop(&mut self) {
        log::debug!("Raccourci capture retiré");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn settings_keys_map_to_actions() {
        assert_eq!(map_key(&press(KeyCode::Char(']'))), Some(Action::StepWidth(1)));
        assert_eq!(map_key(&press(KeyCode::Char('['))), Some(Action::StepWidth(-1)));
        assert_eq!(map_key(&press(KeyCode::Char('+'))), Some(Action::StepFontSize(1)));
        assert_eq!(map_key(&press(KeyCode::Char('3'))), Some(Action::SelectProfile(2)));
        assert_eq!(map_key(&press(KeyCode::Tab)), Some(Action::NextProfile));
        assert_eq!(map_key(&press(KeyCode::Esc)), Some(Action::Quit));
        assert_eq!(map_key(&press(KeyCode::Char('4'))), None);
    }

    #[test]
    fn space_is_only_handled_by_subscription() {
        let space = press(KeyCode::Char(' '));
        assert_eq!(map_key(&space), None);
        let subscription = ShortcutSubscription::subscribe();
        assert_eq!(subscription.handle(&space), Some(Action::Capture));
        assert_eq!(subscription.handle(&press(KeyCode::Char('x'))), None);
    }

    #[test]
    fn releases_are_ignored() {
        let mut key = press(KeyCode::Char(' '));
        key.kind = KeyEventKind::Release;
        assert_eq!(ShortcutSubscription::subscribe().handle(&key), None);
        let mut key = press(KeyCode::Char('q'));
        key.kind = KeyEventKind::Release;
        assert_eq!(map_key(&key), None);
    }

    #[test]
    fn ctrl_c_quits() {
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(map_key(&key), Some(Action::Quit));
    }
}
