use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone)]
pub enum AppAction {
    Quit,
    MoveUp,
    MoveDown,
    MoveToTop,
    MoveToBottom,
    NextView,
    RefreshData,
    // Filter controls
    CycleArea,
    CycleDifficulty,
    CycleStar,
    ToggleClimbedOnly,
    HeightDown,
    HeightUp,
    ResetFilters,
    ShowHelp,
    HideHelp,
}

pub fn handle_key_event(key: KeyEvent, show_help: bool) -> Option<AppAction> {
    // If help is showing, any key closes it
    if show_help {
        return Some(AppAction::HideHelp);
    }

    match (key.code, key.modifiers) {
        (KeyCode::Char('q'), _) => Some(AppAction::Quit),
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => Some(AppAction::Quit),

        (KeyCode::Char('j'), _) | (KeyCode::Down, _) => Some(AppAction::MoveDown),
        (KeyCode::Char('k'), _) | (KeyCode::Up, _) => Some(AppAction::MoveUp),
        (KeyCode::Char('<'), _) => Some(AppAction::MoveToTop),
        (KeyCode::Char('>'), _) => Some(AppAction::MoveToBottom),

        (KeyCode::Tab, _) | (KeyCode::Char('v'), _) => Some(AppAction::NextView),
        (KeyCode::Char('r'), _) => Some(AppAction::RefreshData),

        (KeyCode::Char('a'), _) => Some(AppAction::CycleArea),
        (KeyCode::Char('d'), _) => Some(AppAction::CycleDifficulty),
        (KeyCode::Char('s'), _) => Some(AppAction::CycleStar),
        (KeyCode::Char('b'), _) => Some(AppAction::ToggleClimbedOnly),
        (KeyCode::Char('-'), _) => Some(AppAction::HeightDown),
        (KeyCode::Char('+'), _) | (KeyCode::Char('='), _) => Some(AppAction::HeightUp),
        (KeyCode::Char('x'), _) => Some(AppAction::ResetFilters),

        (KeyCode::Char('?'), _) => Some(AppAction::ShowHelp),

        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventKind;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: crossterm::event::KeyEventState::NONE,
        }
    }

    #[test]
    fn any_key_dismisses_help() {
        assert!(matches!(
            handle_key_event(key(KeyCode::Char('j')), true),
            Some(AppAction::HideHelp)
        ));
    }

    #[test]
    fn filter_keys_map_to_filter_actions() {
        assert!(matches!(
            handle_key_event(key(KeyCode::Char('a')), false),
            Some(AppAction::CycleArea)
        ));
        assert!(matches!(
            handle_key_event(key(KeyCode::Char('b')), false),
            Some(AppAction::ToggleClimbedOnly)
        ));
        assert!(handle_key_event(key(KeyCode::Char('z')), false).is_none());
    }
}
