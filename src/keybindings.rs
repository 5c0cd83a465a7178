//! Keybinding registry: maps keys to actions with config overrides.
//!
//! Lookup is context aware so the same key can mean "next page" in the list
//! pane and "open in browser" in the reader pane.
use crossterm::event::{KeyCode, KeyModifiers};
use std::collections::HashMap;

// ============================================================================
// Action Enum
// ============================================================================

/// All user-facing actions that can be triggered by keybindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Quit,
    NavUp,
    NavDown,
    SwitchPane,
    PreviousPage,
    NextPage,
    StrategyRelevant,
    StrategyRecent,
    Reload,
    Refresh,
    ShowInfo,
    OpenInBrowser,
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
}

impl Action {
    /// Human-readable description for the info screen.
    pub fn describe(self) -> &'static str {
        match self {
            Self::Quit => "Quit",
            Self::NavUp => "Previous item",
            Self::NavDown => "Next item",
            Self::SwitchPane => "Switch pane",
            Self::PreviousPage => "Previous page",
            Self::NextPage => "Next page",
            Self::StrategyRelevant => "Relevant articles",
            Self::StrategyRecent => "Recent articles",
            Self::Reload => "Reload page (keeps cache)",
            Self::Refresh => "Refresh (clears cache)",
            Self::ShowInfo => "About",
            Self::OpenInBrowser => "Open in browser",
            Self::ScrollUp => "Scroll up",
            Self::ScrollDown => "Scroll down",
            Self::PageUp => "Scroll up one page",
            Self::PageDown => "Scroll down one page",
        }
    }
}

// ============================================================================
// Context Enum
// ============================================================================

/// Dispatch context: determines which bindings are active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Context {
    Global,
    List,
    Reader,
}

impl Context {
    fn label(self) -> &'static str {
        match self {
            Self::Global => "the global keys",
            Self::List => "the list pane",
            Self::Reader => "the reader pane",
        }
    }

    /// Contexts whose bindings for the same key would collide with this one.
    ///
    /// A pane binding hides a global one for the same key, so global keys
    /// collide with both panes and pane keys collide with global.
    fn overlapping(self) -> &'static [Context] {
        match self {
            Self::Global => &[Context::List, Context::Reader],
            Self::List | Self::Reader => &[Context::Global],
        }
    }
}

// ============================================================================
// Key Specification
// ============================================================================

/// A key event: code + modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeySpec {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeySpec {
    pub const fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    pub const fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }
}

/// Parse a key string from config into a KeySpec.
///
/// Supported formats:
/// - Single char: "q", "j", "/"
/// - Named keys: "Enter", "Esc", "Tab", "Up", "Down", "PageUp", "PageDown"
/// - Modifier combos: "Ctrl+d"
/// - Function keys: "F1" through "F12"
fn parse_key_string(s: &str) -> Option<KeySpec> {
    let s = s.trim();

    if let Some(rest) = s.strip_prefix("Ctrl+") {
        let mut chars = rest.trim().chars();
        return match (chars.next(), chars.next()) {
            (Some(c), None) => Some(KeySpec::ctrl(c)),
            _ => None,
        };
    }

    // Named keys (case-insensitive)
    let named = match s.to_lowercase().as_str() {
        "enter" | "return" => Some(KeyCode::Enter),
        "esc" | "escape" => Some(KeyCode::Esc),
        "tab" => Some(KeyCode::Tab),
        "up" => Some(KeyCode::Up),
        "down" => Some(KeyCode::Down),
        "left" => Some(KeyCode::Left),
        "right" => Some(KeyCode::Right),
        "pageup" | "pgup" => Some(KeyCode::PageUp),
        "pagedown" | "pgdn" => Some(KeyCode::PageDown),
        "home" => Some(KeyCode::Home),
        "end" => Some(KeyCode::End),
        "space" => Some(KeyCode::Char(' ')),
        _ => None,
    };
    if let Some(code) = named {
        return Some(KeySpec::plain(code));
    }

    if let Some(n) = s
        .strip_prefix(['F', 'f'])
        .and_then(|n| n.parse::<u8>().ok())
    {
        return (1..=12).contains(&n).then(|| KeySpec::plain(KeyCode::F(n)));
    }

    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(KeySpec::plain(KeyCode::Char(c))),
        _ => None,
    }
}

/// Format a KeySpec as a short human-readable string.
fn format_key(key: &KeySpec) -> String {
    let modifier = if key.modifiers.contains(KeyModifiers::CONTROL) {
        "Ctrl+"
    } else {
        ""
    };

    let key_name = match key.code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::Up => "↑".to_string(),
        KeyCode::Down => "↓".to_string(),
        KeyCode::Left => "←".to_string(),
        KeyCode::Right => "→".to_string(),
        KeyCode::PageUp => "PgUp".to_string(),
        KeyCode::PageDown => "PgDn".to_string(),
        KeyCode::Home => "Home".to_string(),
        KeyCode::End => "End".to_string(),
        KeyCode::F(n) => format!("F{}", n),
        _ => "?".to_string(),
    };

    format!("{}{}", modifier, key_name)
}

// ============================================================================
// Keybinding Registry
// ============================================================================

/// Registry of keybindings, supporting default bindings and config overrides.
pub struct KeybindingRegistry {
    /// Primary lookup: (Context, KeySpec) -> Action
    lookup: HashMap<(Context, KeySpec), Action>,
    /// Registration order, for the info screen and status hints
    bindings: Vec<(Context, KeySpec, Action)>,
}

impl KeybindingRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            lookup: HashMap::new(),
            bindings: Vec::new(),
        };
        registry.register_defaults();
        registry
    }

    fn bind(&mut self, context: Context, key: KeySpec, action: Action) {
        self.lookup.insert((context, key), action);
        self.bindings.push((context, key, action));
    }

    fn bind_all(&mut self, context: Context, keys: &[KeySpec], action: Action) {
        for key in keys {
            self.bind(context, *key, action);
        }
    }

    fn register_defaults(&mut self) {
        use KeyCode::{Char, Down, Left, PageDown, PageUp, Right, Tab, Up, F};
        let plain = KeySpec::plain;

        // === Global ===
        self.bind_all(Context::Global, &[plain(Char('q')), KeySpec::ctrl('c')], Action::Quit);
        self.bind(Context::Global, plain(Char('r')), Action::Refresh);
        self.bind_all(Context::Global, &[plain(F(5)), plain(Char('l'))], Action::Reload);
        self.bind_all(
            Context::Global,
            &[plain(Up), plain(Char('w')), plain(Char('k'))],
            Action::NavUp,
        );
        self.bind_all(
            Context::Global,
            &[plain(Down), plain(Char('s')), plain(Char('j'))],
            Action::NavDown,
        );
        self.bind(Context::Global, plain(Tab), Action::SwitchPane);
        self.bind(Context::Global, plain(Char('1')), Action::StrategyRelevant);
        self.bind(Context::Global, plain(Char('2')), Action::StrategyRecent);
        self.bind(Context::Global, plain(Char('i')), Action::ShowInfo);
        self.bind(Context::Global, plain(Char('o')), Action::OpenInBrowser);
        self.bind(Context::Global, plain(PageUp), Action::PageUp);
        self.bind(Context::Global, plain(PageDown), Action::PageDown);

        // === List pane ===
        self.bind_all(
            Context::List,
            &[plain(Left), plain(Char('a'))],
            Action::PreviousPage,
        );
        self.bind_all(
            Context::List,
            &[plain(Right), plain(Char('d'))],
            Action::NextPage,
        );

        // === Reader pane ===
        // Up/down move the text, not the selection
        self.bind_all(
            Context::Reader,
            &[plain(Up), plain(Char('w')), plain(Char('k'))],
            Action::ScrollUp,
        );
        self.bind_all(
            Context::Reader,
            &[plain(Down), plain(Char('s')), plain(Char('j'))],
            Action::ScrollDown,
        );
        self.bind(Context::Reader, plain(Char('a')), Action::OpenInBrowser);
    }

    /// Apply user overrides from config keybindings map.
    ///
    /// Keys in the map are action names (e.g., "quit", "next_page").
    /// Values are key strings (e.g., "q", "Ctrl+d", "F5"). The new key replaces
    /// every default key of that action, in each context it was bound in.
    ///
    /// A key already taken by another action in the same context is moved to
    /// the overridden action. A key that only collides across contexts is
    /// still bound, since the pane binding wins where both apply.
    ///
    /// Returns a list of warnings for unrecognized action names, unparseable
    /// keys and key collisions.
    pub fn apply_overrides(&mut self, overrides: &HashMap<String, String>) -> Vec<String> {
        let mut warnings = Vec::new();

        for (action_name, key_str) in overrides {
            let Some(action) = parse_action_name(action_name) else {
                warnings.push(format!("Unknown action '{}', ignoring", action_name));
                continue;
            };

            let Some(key) = parse_key_string(key_str) else {
                warnings.push(format!(
                    "Cannot parse key '{}' for action '{}', ignoring",
                    key_str, action_name
                ));
                continue;
            };

            let mut contexts: Vec<Context> = self
                .bindings
                .iter()
                .filter(|(_, _, a)| *a == action)
                .map(|(c, _, _)| *c)
                .collect();
            contexts.dedup();

            self.lookup.retain(|_, a| *a != action);
            self.bindings.retain(|(_, _, a)| *a != action);

            for ctx in contexts {
                if let Some(&taken) = self.lookup.get(&(ctx, key)) {
                    warnings.push(format!(
                        "Key '{}' for action '{}' replaces '{}' in {}",
                        key_str,
                        action_name,
                        taken.describe(),
                        ctx.label()
                    ));
                    self.bindings
                        .retain(|(c, k, a)| !(*c == ctx && *k == key && *a == taken));
                }
                for &other in ctx.overlapping() {
                    if let Some(&shadowed) = self.lookup.get(&(other, key)) {
                        if shadowed != action {
                            warnings.push(format!(
                                "Key '{}' for action '{}' overlaps '{}' in {}",
                                key_str,
                                action_name,
                                shadowed.describe(),
                                other.label()
                            ));
                        }
                    }
                }
                self.bind(ctx, key, action);
            }

            tracing::info!(
                action = %action_name,
                key = %key_str,
                "Applied keybinding override"
            );
        }

        warnings
    }

    /// Look up the action for a given key in a given context.
    ///
    /// Tries the specific context first, then falls back to Global.
    pub fn action_for_key(
        &self,
        code: KeyCode,
        modifiers: KeyModifiers,
        context: Context,
    ) -> Option<Action> {
        let key = KeySpec::new(code, modifiers);

        if let Some(&action) = self.lookup.get(&(context, key)) {
            return Some(action);
        }

        if context != Context::Global {
            if let Some(&action) = self.lookup.get(&(Context::Global, key)) {
                return Some(action);
            }
        }

        None
    }

    /// First key bound to `action`, formatted for the status bar.
    pub fn key_hint(&self, action: Action) -> Option<String> {
        self.bindings
            .iter()
            .find(|(_, _, a)| *a == action)
            .map(|(_, key, _)| format_key(key))
    }

    /// Every action with all of its keys joined, in registration order.
    ///
    /// Returns (keys, description) pairs for the info screen.
    pub fn describe_all(&self) -> Vec<(String, &'static str)> {
        let mut rows: Vec<(Action, Vec<String>)> = Vec::new();
        for (_, key, action) in &self.bindings {
            let formatted = format_key(key);
            match rows.iter_mut().find(|(a, _)| a == action) {
                Some((_, keys)) => {
                    if !keys.contains(&formatted) {
                        keys.push(formatted);
                    }
                }
                None => rows.push((*action, vec![formatted])),
            }
        }
        rows.into_iter()
            .map(|(action, keys)| (keys.join("/"), action.describe()))
            .collect()
    }
}

impl Default for KeybindingRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse an action name string (from config) into an Action enum.
fn parse_action_name(name: &str) -> Option<Action> {
    match name.to_lowercase().as_str() {
        "quit" => Some(Action::Quit),
        "nav_up" | "navup" | "up" => Some(Action::NavUp),
        "nav_down" | "navdown" | "down" => Some(Action::NavDown),
        "switch_pane" | "switchpane" | "tab" => Some(Action::SwitchPane),
        "previous_page" | "previouspage" | "prev_page" => Some(Action::PreviousPage),
        "next_page" | "nextpage" => Some(Action::NextPage),
        "relevant" | "strategy_relevant" => Some(Action::StrategyRelevant),
        "recent" | "strategy_recent" => Some(Action::StrategyRecent),
        "reload" | "retry" => Some(Action::Reload),
        "refresh" => Some(Action::Refresh),
        "info" | "show_info" | "showinfo" => Some(Action::ShowInfo),
        "open_in_browser" | "openinbrowser" | "open" => Some(Action::OpenInBrowser),
        "scroll_up" | "scrollup" => Some(Action::ScrollUp),
        "scroll_down" | "scrolldown" => Some(Action::ScrollDown),
        "page_up" | "pageup" => Some(Action::PageUp),
        "page_down" | "pagedown" => Some(Action::PageDown),
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================
