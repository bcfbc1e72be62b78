use anyhow::{anyhow, Result};
use clap::Parser;
use logoutbar_gui::actions::{
    ActionKind, ActionOverride, ActionSettings, IconTheme, SeatManager, DEFAULT_ORDER,
};
use logoutbar_gui::layout::{Alignment, Margins, Placement, Position};
use logoutbar_gui::Settings;
use std::time::Duration;
use tracing::level_filters::LevelFilter;
use tracing::{debug, info, warn};

mod instance;

use instance::{Acquisition, InstanceLock};

#[derive(Parser, Debug)]
#[command(name = "wlogoutbar")]
#[command(about = "Session control bar (logout, reboot, shutdown, ...) for Wayland")]
#[command(long_about = None)]
#[command(version)]
struct Cli {
    #[arg(long, help = "Enable debug logging")]
    debug: bool,

    #[arg(
        short,
        long,
        default_value = "left",
        value_parser = ["bottom", "top", "left", "right", "center"]
    )]
    position: String,

    #[arg(short, long, help = "Stretch the bar to the screen edges")]
    full: bool,

    #[arg(short, long, default_value = "middle", value_parser = ["start", "end", "middle"])]
    alignment: String,

    #[arg(long = "margin-top", visible_alias = "mt", default_value_t = 0)]
    margin_top: i32,

    #[arg(long = "margin-left", visible_alias = "ml", default_value_t = 0)]
    margin_left: i32,

    #[arg(long = "margin-right", visible_alias = "mr", default_value_t = 0)]
    margin_right: i32,

    #[arg(long = "margin-bottom", visible_alias = "mb", default_value_t = 0)]
    margin_bottom: i32,

    #[arg(short, long, default_value_t = 48)]
    icon_size: u32,

    #[arg(short, long, help = "Output to show the bar on")]
    output: Option<String>,

    #[arg(long, default_value = DEFAULT_ORDER, help = "Space separated list of actions")]
    order: String,

    #[arg(short = 'x', long, help = "Use the top layer and reserve an exclusive zone")]
    exclusive_zone: bool,

    #[arg(short, long, default_value = "dark", value_parser = ["dark", "light", "custom"])]
    theme: String,

    #[arg(long, default_value = "Adwaita", help = "Icon theme used to look up named icons")]
    icon_theme: String,

    #[arg(
        long,
        default_value = "embed:style",
        help = "Style sheet: embed:<name>, a file path, or empty"
    )]
    style: String,

    #[arg(
        long,
        default_value_t = 500,
        value_name = "MS",
        help = "Delay before closing once the pointer leaves"
    )]
    close_delay: u64,

    #[arg(long = "lgi", default_value = "", value_name = "ICON")]
    logout_icon: String,
    #[arg(long = "rbi", default_value = "", value_name = "ICON")]
    reboot_icon: String,
    #[arg(long = "sdi", default_value = "", value_name = "ICON")]
    shutdown_icon: String,
    #[arg(long = "sli", default_value = "", value_name = "ICON")]
    sleep_icon: String,
    #[arg(long = "hsi", default_value = "", value_name = "ICON")]
    hybrid_sleep_icon: String,
    #[arg(long = "hbi", default_value = "", value_name = "ICON")]
    hibernate_icon: String,
    #[arg(long = "lci", default_value = "", value_name = "ICON")]
    lock_icon: String,

    #[arg(long = "lgl", default_value = "Logout", value_name = "LABEL")]
    logout_label: String,
    #[arg(long = "rbl", default_value = "Reboot", value_name = "LABEL")]
    reboot_label: String,
    #[arg(long = "sdl", default_value = "Shutdown", value_name = "LABEL")]
    shutdown_label: String,
    #[arg(long = "sll", default_value = "Sleep", value_name = "LABEL")]
    sleep_label: String,
    #[arg(long = "hsl", default_value = "Hybrid Sleep", value_name = "LABEL")]
    hybrid_sleep_label: String,
    #[arg(long = "hbl", default_value = "Hibernate", value_name = "LABEL")]
    hibernate_label: String,
    #[arg(long = "lcl", default_value = "Lock", value_name = "LABEL")]
    lock_label: String,

    #[arg(long, default_value = "systemd", value_parser = ["systemd", "elogind", "custom"])]
    seat: String,

    #[arg(long = "rbc", default_value = "systemctl reboot", value_name = "COMMAND")]
    reboot_command: String,
    #[arg(long = "sdc", default_value = "systemctl -i poweroff", value_name = "COMMAND")]
    shutdown_command: String,
    #[arg(long = "slc", default_value = "systemctl suspend", value_name = "COMMAND")]
    sleep_command: String,
    #[arg(long = "hsc", default_value = "systemctl hybrid-sleep", value_name = "COMMAND")]
    hybrid_sleep_command: String,
    #[arg(long = "hbc", default_value = "systemctl hibernate", value_name = "COMMAND")]
    hibernate_command: String,
    #[arg(long = "lgc", default_value = "swaymsg exit", value_name = "COMMAND")]
    logout_command: String,
    #[arg(
        long = "lcc",
        default_value = "waylock --init-color #222222 --input-color #4c7899",
        value_name = "COMMAND"
    )]
    lock_command: String,
}

impl Cli {
    fn action_override(&self, kind: ActionKind) -> ActionOverride {
        let (icon, label, command) = match kind {
            ActionKind::Logout => (&self.logout_icon, &self.logout_label, &self.logout_command),
            ActionKind::Reboot => (&self.reboot_icon, &self.reboot_label, &self.reboot_command),
            ActionKind::Shutdown => {
                (&self.shutdown_icon, &self.shutdown_label, &self.shutdown_command)
            }
            ActionKind::Sleep => (&self.sleep_icon, &self.sleep_label, &self.sleep_command),
            ActionKind::HybridSleep => {
                (&self.hybrid_sleep_icon, &self.hybrid_sleep_label, &self.hybrid_sleep_command)
            }
            ActionKind::Hibernate => {
                (&self.hibernate_icon, &self.hibernate_label, &self.hibernate_command)
            }
            ActionKind::Lock => (&self.lock_icon, &self.lock_label, &self.lock_command),
        };
        ActionOverride { icon: icon.clone(), label: label.clone(), command: command.clone() }
    }

    fn settings(&self) -> Settings {
        let placement = Placement {
            position: Position::from_name(&self.position).unwrap_or_default(),
            full: self.full,
            alignment: Alignment::from_name(&self.alignment),
            margins: Margins {
                top: self.margin_top,
                right: self.margin_right,
                bottom: self.margin_bottom,
                left: self.margin_left,
            },
            exclusive_zone: self.exclusive_zone,
        };

        let actions = ActionSettings {
            order: self.order.clone(),
            theme: IconTheme::from_name(&self.theme).unwrap_or_default(),
            seat: SeatManager::from_name(&self.seat).unwrap_or_default(),
            overrides: ActionKind::ALL
                .iter()
                .map(|kind| (*kind, self.action_override(*kind)))
                .collect(),
        };

        Settings {
            placement,
            icon_size: self.icon_size,
            icon_theme: self.icon_theme.clone(),
            output: self.output.clone().filter(|o| !o.is_empty()),
            style: self.style.clone(),
            close_delay: Duration::from_millis(self.close_delay),
            actions,
        }
    }
}

fn log_level(debug: bool) -> LevelFilter {
    if debug {
        return LevelFilter::DEBUG;
    }

    let log_level = std::env::var("WLOGOUTBAR_LOG")
        .unwrap_or_else(|_| "error".to_string())
        .to_lowercase();
    match log_level.as_str() {
        "silent" => LevelFilter::OFF,
        "error" => LevelFilter::ERROR,
        "warning" | "warn" => LevelFilter::WARN,
        "info" => LevelFilter::INFO,
        "debug" => LevelFilter::DEBUG,
        "verbose" | "trace" => LevelFilter::TRACE,
        _ => LevelFilter::ERROR,
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt().with_max_level(log_level(cli.debug)).init();
    debug!("{:?}", cli);

    let lock_path = instance::lock_path();
    let _lock = match InstanceLock::acquire(&lock_path) {
        Ok(Acquisition::Acquired(lock)) => {
            debug!("Holding {} as pid {}", lock.path().display(), lock.pid());
            Some(lock)
        }
        Ok(Acquisition::Running(owner)) => {
            instance::dismiss_running(owner);
            return Ok(());
        }
        Err(e) => {
            warn!("Running without instance lock: {:#}", e);
            None
        }
    };

    logoutbar_gui::run(cli.settings()).map_err(|e| anyhow!("Failed to run the bar: {}", e))?;

    info!("Bye");
    Ok(())
}
