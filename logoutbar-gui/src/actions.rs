//! The session actions shown on the bar and how their icon, label and
//! command are chosen.

use tracing::warn;

pub const DEFAULT_ORDER: &str = "logout reboot shutdown sleep hybrid-sleep hibernate lock";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Logout,
    Reboot,
    Shutdown,
    Sleep,
    HybridSleep,
    Hibernate,
    Lock,
}

impl ActionKind {
    pub const ALL: [ActionKind; 7] = [
        ActionKind::Logout,
        ActionKind::Reboot,
        ActionKind::Shutdown,
        ActionKind::Sleep,
        ActionKind::HybridSleep,
        ActionKind::Hibernate,
        ActionKind::Lock,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "logout" => Some(ActionKind::Logout),
            "reboot" => Some(ActionKind::Reboot),
            "shutdown" => Some(ActionKind::Shutdown),
            "sleep" => Some(ActionKind::Sleep),
            "hybrid-sleep" => Some(ActionKind::HybridSleep),
            "hibernate" => Some(ActionKind::Hibernate),
            "lock" => Some(ActionKind::Lock),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ActionKind::Logout => "logout",
            ActionKind::Reboot => "reboot",
            ActionKind::Shutdown => "shutdown",
            ActionKind::Sleep => "sleep",
            ActionKind::HybridSleep => "hybrid-sleep",
            ActionKind::Hibernate => "hibernate",
            ActionKind::Lock => "lock",
        }
    }

    /// Base name of the bundled symbolic icon.
    fn embedded_icon(&self) -> &'static str {
        match self {
            ActionKind::Logout => "system-log-out-symbolic",
            ActionKind::Reboot => "system-reboot-symbolic",
            ActionKind::Shutdown => "system-shutdown-symbolic",
            ActionKind::Sleep => "system-suspend-symbolic",
            ActionKind::HybridSleep | ActionKind::Hibernate => "system-hibernate-symbolic",
            ActionKind::Lock => "system-lock-screen-symbolic",
        }
    }

    /// Subcommand understood by both `systemctl` and `loginctl`.
    fn seat_verb(&self) -> Option<&'static str> {
        match self {
            ActionKind::Reboot => Some("reboot"),
            ActionKind::Shutdown => Some("-i poweroff"),
            ActionKind::Sleep => Some("suspend"),
            ActionKind::HybridSleep => Some("hybrid-sleep"),
            ActionKind::Hibernate => Some("hibernate"),
            ActionKind::Logout | ActionKind::Lock => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IconTheme {
    #[default]
    Dark,
    Light,
    Custom,
}

impl IconTheme {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "dark" => Some(IconTheme::Dark),
            "light" => Some(IconTheme::Light),
            "custom" => Some(IconTheme::Custom),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeatManager {
    #[default]
    Systemd,
    Elogind,
    Custom,
}

impl SeatManager {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "systemd" => Some(SeatManager::Systemd),
            "elogind" => Some(SeatManager::Elogind),
            "custom" => Some(SeatManager::Custom),
            _ => None,
        }
    }

    fn tool(&self) -> Option<&'static str> {
        match self {
            SeatManager::Systemd => Some("systemctl"),
            SeatManager::Elogind => Some("loginctl"),
            SeatManager::Custom => None,
        }
    }
}

/// Icon, label and command given on the command line for one action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionOverride {
    pub icon: String,
    pub label: String,
    pub command: String,
}

impl ActionOverride {
    pub fn defaults(kind: ActionKind) -> Self {
        let (label, command) = match kind {
            ActionKind::Logout => ("Logout", "swaymsg exit".to_string()),
            ActionKind::Lock => {
                ("Lock", "waylock --init-color #222222 --input-color #4c7899".to_string())
            }
            ActionKind::Reboot => ("Reboot", systemd_command(kind)),
            ActionKind::Shutdown => ("Shutdown", systemd_command(kind)),
            ActionKind::Sleep => ("Sleep", systemd_command(kind)),
            ActionKind::HybridSleep => ("Hybrid Sleep", systemd_command(kind)),
            ActionKind::Hibernate => ("Hibernate", systemd_command(kind)),
        };
        Self { icon: String::new(), label: label.to_string(), command }
    }
}

fn systemd_command(kind: ActionKind) -> String {
    kind.seat_verb().map(|verb| format!("systemctl {}", verb)).unwrap_or_default()
}

#[derive(Debug, Clone)]
pub struct ActionSettings {
    pub order: String,
    pub theme: IconTheme,
    pub seat: SeatManager,
    pub overrides: Vec<(ActionKind, ActionOverride)>,
}

impl Default for ActionSettings {
    fn default() -> Self {
        Self {
            order: DEFAULT_ORDER.to_string(),
            theme: IconTheme::default(),
            seat: SeatManager::default(),
            overrides: ActionKind::ALL.iter().map(|k| (*k, ActionOverride::defaults(*k))).collect(),
        }
    }
}

impl ActionSettings {
    fn override_for(&self, kind: ActionKind) -> ActionOverride {
        self.overrides
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, o)| o.clone())
            .unwrap_or_else(|| ActionOverride::defaults(kind))
    }
}

/// One button of the bar. Built once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub kind: ActionKind,
    pub icon: String,
    pub label: String,
    pub command: String,
}

pub fn parse_order(order: &str) -> Vec<ActionKind> {
    order
        .split_whitespace()
        .filter_map(|name| {
            let kind = ActionKind::from_name(name);
            if kind.is_none() {
                warn!("Unknown action '{}' in order, skipping", name);
            }
            kind
        })
        .collect()
}

pub fn build_actions(settings: &ActionSettings) -> Vec<Action> {
    parse_order(&settings.order)
        .into_iter()
        .map(|kind| {
            let given = settings.override_for(kind);

            let icon = match settings.theme {
                IconTheme::Dark => format!("embed:{}-dark", kind.embedded_icon()),
                IconTheme::Light => format!("embed:{}-light", kind.embedded_icon()),
                IconTheme::Custom => given.icon,
            };

            let command = match (settings.seat.tool(), kind.seat_verb()) {
                (Some(tool), Some(verb)) => format!("{} {}", tool, verb),
                _ => given.command,
            };

            Action { kind, icon, label: given.label, command }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_override(kind: ActionKind, icon: &str, command: &str) -> ActionSettings {
        let mut settings = ActionSettings::default();
        for (k, o) in settings.overrides.iter_mut() {
            if *k == kind {
                o.icon = icon.to_string();
                o.command = command.to_string();
            }
        }
        settings
    }

    #[test]
    fn test_default_order() {
        let kinds = parse_order(DEFAULT_ORDER);
        assert_eq!(kinds, ActionKind::ALL.to_vec());
    }

    #[test]
    fn test_order_skips_unknown_and_keeps_duplicates() {
        let kinds = parse_order("lock  bogus logout lock");
        assert_eq!(kinds, vec![ActionKind::Lock, ActionKind::Logout, ActionKind::Lock]);
    }

    #[test]
    fn test_name_roundtrip() {
        for kind in ActionKind::ALL {
            assert_eq!(ActionKind::from_name(kind.name()), Some(kind));
        }
    }

    #[test]
    fn test_preset_names() {
        assert_eq!(IconTheme::from_name("light"), Some(IconTheme::Light));
        assert_eq!(IconTheme::from_name("Dark"), None);
        assert_eq!(SeatManager::from_name("elogind"), Some(SeatManager::Elogind));
        assert_eq!(SeatManager::from_name("openrc"), None);
    }

    #[test]
    fn test_systemd_preset_ignores_custom_commands() {
        let settings = with_override(ActionKind::Reboot, "", "my-reboot");
        let actions = build_actions(&settings);
        let reboot = actions.iter().find(|a| a.kind == ActionKind::Reboot).unwrap();
        assert_eq!(reboot.command, "systemctl reboot");
    }

    #[test]
    fn test_elogind_preset() {
        let settings = ActionSettings { seat: SeatManager::Elogind, ..Default::default() };
        let actions = build_actions(&settings);
        let shutdown = actions.iter().find(|a| a.kind == ActionKind::Shutdown).unwrap();
        assert_eq!(shutdown.command, "loginctl -i poweroff");
        let logout = actions.iter().find(|a| a.kind == ActionKind::Logout).unwrap();
        assert_eq!(logout.command, "swaymsg exit");
    }

    #[test]
    fn test_custom_seat_uses_given_commands() {
        let mut settings = with_override(ActionKind::Sleep, "", "zzz");
        settings.seat = SeatManager::Custom;
        let actions = build_actions(&settings);
        let sleep = actions.iter().find(|a| a.kind == ActionKind::Sleep).unwrap();
        assert_eq!(sleep.command, "zzz");
        let hibernate = actions.iter().find(|a| a.kind == ActionKind::Hibernate).unwrap();
        assert_eq!(hibernate.command, "systemctl hibernate");
    }

    #[test]
    fn test_theme_icons() {
        let dark = build_actions(&ActionSettings::default());
        assert_eq!(dark[0].icon, "embed:system-log-out-symbolic-dark");

        let light =
            build_actions(&ActionSettings { theme: IconTheme::Light, ..Default::default() });
        assert_eq!(light[6].icon, "embed:system-lock-screen-symbolic-light");

        let mut custom = with_override(ActionKind::Logout, "my-logout-icon", "swaymsg exit");
        custom.theme = IconTheme::Custom;
        let custom = build_actions(&custom);
        assert_eq!(custom[0].icon, "my-logout-icon");
        assert_eq!(custom[1].icon, "");
    }

    #[test]
    fn test_labels() {
        let actions = build_actions(&ActionSettings::default());
        let labels: Vec<&str> = actions.iter().map(|a| a.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["Logout", "Reboot", "Shutdown", "Sleep", "Hybrid Sleep", "Hibernate", "Lock"]
        );
    }
}
