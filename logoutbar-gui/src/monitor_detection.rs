use smithay_client_toolkit::{
    delegate_output, delegate_registry,
    output::{OutputHandler, OutputState},
    registry::{ProvidesRegistryState, RegistryState},
    registry_handlers,
};
use wayland_client::{globals::registry_queue_init, protocol::wl_output, Connection, QueueHandle};
use tracing::{debug, info, warn};

/// Collects output names announced by the compositor
pub struct MonitorDetector {
    registry_state: RegistryState,
    output_state: OutputState,
    pub detected_monitors: Vec<String>,
}

impl OutputHandler for MonitorDetector {
    fn output_state(&mut self) -> &mut OutputState {
        &mut self.output_state
    }

    fn new_output(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        output: wl_output::WlOutput,
    ) {
        if let Some(info) = self.output_state.info(&output) {
            if let Some(name) = info.name.clone() {
                debug!("Output detected: {} ({})", name, info.model);
                self.detected_monitors.push(name);
            }
        }
    }

    fn update_output(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _output: wl_output::WlOutput,
    ) {
    }

    fn output_destroyed(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        output: wl_output::WlOutput,
    ) {
        if let Some(info) = self.output_state.info(&output) {
            if let Some(name) = &info.name {
                self.detected_monitors.retain(|m| m != name);
            }
        }
    }
}

impl ProvidesRegistryState for MonitorDetector {
    fn registry(&mut self) -> &mut RegistryState {
        &mut self.registry_state
    }
    registry_handlers![OutputState];
}

delegate_output!(MonitorDetector);
delegate_registry!(MonitorDetector);

/// Enumerate connected outputs via Wayland
pub fn enumerate_monitors() -> anyhow::Result<Vec<String>> {
    let conn = Connection::connect_to_env()?;
    let (globals, mut event_queue) = registry_queue_init(&conn)?;
    let qh = event_queue.handle();

    let mut detector = MonitorDetector {
        registry_state: RegistryState::new(&globals),
        output_state: OutputState::new(&globals, &qh),
        detected_monitors: Vec::new(),
    };

    // First roundtrip binds the outputs, the second delivers their names.
    event_queue.roundtrip(&mut detector)?;
    event_queue.roundtrip(&mut detector)?;

    info!(
        "Detected {} output(s): {:?}",
        detector.detected_monitors.len(),
        detector.detected_monitors
    );

    Ok(detector.detected_monitors)
}

/// Pick the output to pin the bar to. `None` leaves placement to the
/// compositor.
pub fn resolve_target_output(target: &str) -> Option<String> {
    if target.is_empty() {
        return None;
    }

    match enumerate_monitors() {
        Ok(outputs) => pick_output(&outputs, target),
        Err(e) => {
            warn!("Could not enumerate outputs, not pinning to '{}': {}", target, e);
            None
        }
    }
}

fn pick_output(outputs: &[String], target: &str) -> Option<String> {
    let found = outputs.iter().find(|name| name.as_str() == target).cloned();
    if found.is_none() {
        warn!("Output '{}' not found among {:?}, not pinning", target, outputs);
    }
    found
}
