// Copyright The Glide Authors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The window manager actor.
//!
//! [`WindowManager`] turns inbound [`Event`]s from the protocol layer into
//! outbound [`Command`]s. Each event is handled to completion, and all of its
//! commands are produced, before the next event is looked at. The manager
//! itself does no I/O; [`WindowManager::run`] connects it to channels.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};

use crate::actor::{Receiver, Sender};
use crate::config::Config;
use crate::model::{
    Button, DragMode, DragSession, DragState, Key, Modifiers, Point, Rect, Registry,
    RotateDirection, ScreenId, WindowId,
};

/// Events delivered by the protocol layer.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum Event {
    WindowCreated(WindowId),
    WindowDestroyed(WindowId),
    /// A client asked to be moved or resized. Advisory.
    ExternalGeometryRequest(WindowId, Rect),
    ButtonPress {
        button: Button,
        modifiers: Modifiers,
        pointer: Point,
        /// The managed window under the pointer, if the server knows it.
        window: Option<WindowId>,
    },
    PointerMotion(Point),
    ButtonRelease(Button),
    KeyPress(Modifiers, Key),
    PointerEntered(WindowId),
    ScreenResized(Rect),
    #[serde(skip)]
    ConfigUpdated(Arc<Config>),
}

/// Requests to the protocol layer.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SetGeometry(WindowId, Rect),
    Raise(WindowId),
    Lower(WindowId),
    Reveal(WindowId),
    Hide(WindowId),
    Focus(WindowId),
    DestroyRequest(WindowId),
    SpawnRequest(String),
    Exit,
}

/// Actions that can be bound to keys.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WmCommand {
    SpawnTerminal,
    KillWindow,
    ToggleStack,
    MoveToMaster,
    MoveToAux,
    RotateScreen(RotateDirection),
    Retile,
    Quit,
}

pub struct WindowManager {
    config: Arc<Config>,
    registry: Registry,
    drag: DragState,
}

impl WindowManager {
    pub fn new(config: Arc<Config>, screen: Rect) -> Self {
        let settings = &config.settings;
        let registry = Registry::new(settings.virtual_screens, screen, settings.tile_params())
            .with_max_master(settings.max_master);
        WindowManager {
            config,
            registry,
            drag: DragState::Idle,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn drag(&self) -> &DragState {
        &self.drag
    }

    pub async fn run(mut self, mut events: Receiver<Event>, commands: Sender<Command>) {
        while let Some((span, event)) = events.recv().await {
            let _guard = span.enter();
            let out = self.handle_event(event);
            let exit = out.contains(&Command::Exit);
            for command in out {
                commands.send(command);
            }
            if exit {
                info!("exiting");
                break;
            }
        }
    }

    pub fn handle_event(&mut self, event: Event) -> Vec<Command> {
        debug!(?event);
        let mut out = Vec::new();
        match event {
            Event::WindowCreated(id) => self.on_window_created(id, &mut out),
            Event::WindowDestroyed(id) => self.on_window_destroyed(id, &mut out),
            Event::ExternalGeometryRequest(id, rect) => {
                self.on_geometry_request(id, rect, &mut out)
            }
            Event::ButtonPress { button, modifiers, pointer, window } => {
                self.on_button_press(button, modifiers, pointer, window, &mut out)
            }
            Event::PointerMotion(pointer) => self.on_pointer_motion(pointer, &mut out),
            Event::ButtonRelease(button) => {
                if let Some(session) = self.drag.release(button) {
                    debug!(window = ?session.target, mode = ?session.mode, "drag finished");
                }
            }
            Event::KeyPress(modifiers, key) => match self.config.command_for(modifiers, key) {
                Some(cmd) => self.handle_command(cmd, &mut out),
                None => trace!(?modifiers, ?key, "unbound key"),
            },
            Event::PointerEntered(id) => self.on_pointer_entered(id, &mut out),
            Event::ScreenResized(rect) => {
                self.registry.set_screen_rect(rect);
                self.relayout(self.registry.active_screen(), &mut out);
            }
            Event::ConfigUpdated(config) => self.on_config_updated(config, &mut out),
        }
        if cfg!(debug_assertions) {
            self.registry.check_invariants();
        }
        out
    }

    #[instrument(skip(self, out))]
    fn handle_command(&mut self, cmd: WmCommand, out: &mut Vec<Command>) {
        let focused = self.registry.focused();
        match cmd {
            WmCommand::SpawnTerminal => {
                out.push(Command::SpawnRequest(self.config.settings.terminal.clone()))
            }
            WmCommand::KillWindow => {
                // The window stays managed until the server reports it gone.
                if let Some(id) = focused {
                    out.push(Command::DestroyRequest(id));
                }
            }
            WmCommand::ToggleStack | WmCommand::MoveToMaster | WmCommand::MoveToAux => {
                let Some(id) = focused else { return };
                let moved = match cmd {
                    WmCommand::MoveToMaster => self.registry.move_to_master(id),
                    WmCommand::MoveToAux => self.registry.move_to_aux(id),
                    _ => self.registry.toggle_stack(id),
                };
                if moved {
                    self.relayout(self.registry.active_screen(), out);
                }
            }
            WmCommand::Retile => {
                if let Some(id) = focused {
                    self.retile(id, out);
                }
            }
            WmCommand::RotateScreen(direction) => self.rotate(direction, out),
            WmCommand::Quit => out.push(Command::Exit),
        }
    }

    fn on_window_created(&mut self, id: WindowId, out: &mut Vec<Command>) {
        if !self.registry.add_window(id) {
            return;
        }
        let active = self.registry.active_screen();
        let changed = self.registry.relayout(active);
        if !changed.iter().any(|&(w, _)| w == id)
            && let Some(window) = self.registry.window(id)
        {
            // The new window's slot happened to match its initial geometry.
            set_geometry(out, id, window.geometry);
        }
        for (w, rect) in changed {
            set_geometry(out, w, rect);
        }
        out.push(Command::Reveal(id));
        self.focus(id, out);
    }

    fn on_window_destroyed(&mut self, id: WindowId, out: &mut Vec<Command>) {
        if self.drag.cancel_if_target(id) {
            debug!(?id, "drag target destroyed, cancelling drag");
        }
        let was_focused = self.registry.focused() == Some(id);
        let Some(window) = self.registry.remove_window(id) else {
            debug!(?id, "ignoring destroy for unknown window");
            return;
        };
        if window.placement.is_tiled() {
            self.relayout(window.screen, out);
        }
        if was_focused {
            self.focus_fallback(out);
        }
    }

    fn on_geometry_request(&mut self, id: WindowId, rect: Rect, out: &mut Vec<Command>) {
        let Some(window) = self.registry.window(id) else {
            debug!(?id, "ignoring geometry request for unknown window");
            return;
        };
        let (screen, current) = (window.screen, window.geometry);
        let visible = screen == self.registry.active_screen();
        if self.drag.target() == Some(id) || !window.is_floating() {
            // The layout or the drag owns this window's geometry.
            if visible {
                set_geometry(out, id, current);
            }
            return;
        }
        self.registry.set_floating_geometry(id, rect);
        if visible {
            set_geometry(out, id, rect);
        }
    }

    fn on_button_press(
        &mut self,
        button: Button,
        modifiers: Modifiers,
        pointer: Point,
        window: Option<WindowId>,
        out: &mut Vec<Command>,
    ) {
        if self.drag.is_dragging() {
            debug!(?button, "ignoring button press during drag");
            return;
        }
        let buttons = &self.config.settings.buttons;
        if !modifiers.eq_ignoring_locks(buttons.modifier) {
            trace!(?modifiers, "press modifiers do not match the button modifier");
            return;
        }
        let mode = if button == buttons.move_button {
            Some(DragMode::Move)
        } else if button == buttons.resize_button {
            Some(DragMode::Resize)
        } else if button == buttons.retile_button {
            None
        } else {
            trace!(?button, "unbound button");
            return;
        };
        let Some(target) = self.window_for_press(pointer, window) else {
            trace!(?pointer, "press over no managed window");
            return;
        };
        match mode {
            Some(mode) => self.begin_drag(target, mode, button, pointer, out),
            None => {
                self.focus(target, out);
                self.retile(target, out);
            }
        }
    }

    /// Resolves the press target: the window the server reported, if we
    /// manage it and it is visible, otherwise whatever is under the pointer.
    fn window_for_press(&self, pointer: Point, reported: Option<WindowId>) -> Option<WindowId> {
        let active = self.registry.active_screen();
        reported
            .filter(|&id| self.registry.window(id).is_some_and(|w| w.screen == active))
            .or_else(|| self.registry.window_at(pointer))
    }

    fn begin_drag(
        &mut self,
        target: WindowId,
        mode: DragMode,
        button: Button,
        pointer: Point,
        out: &mut Vec<Command>,
    ) {
        let Some(window) = self.registry.window(target) else { return };
        let (screen, anchor_geometry) = (window.screen, window.geometry);
        let Some(previous) = self.registry.set_floating(target, anchor_geometry) else {
            return;
        };
        if previous.is_tiled() {
            self.relayout(screen, out);
        }
        out.push(Command::Raise(target));
        self.focus(target, out);
        let began = self.drag.begin(DragSession {
            target,
            mode,
            button,
            anchor_pointer: pointer,
            anchor_geometry,
        });
        debug_assert!(began);
        debug!(?target, ?mode, "drag started");
    }

    fn on_pointer_motion(&mut self, pointer: Point, out: &mut Vec<Command>) {
        let Some((id, rect)) = self.drag.motion(pointer, self.config.settings.min_drag_size)
        else {
            return;
        };
        if self.registry.set_floating_geometry(id, rect) {
            set_geometry(out, id, rect);
        } else {
            debug!(?id, "drag target is no longer floating, cancelling drag");
            self.drag.cancel_if_target(id);
        }
    }

    fn on_pointer_entered(&mut self, id: WindowId, out: &mut Vec<Command>) {
        if !self.config.settings.focus_follows_mouse || self.drag.is_dragging() {
            return;
        }
        let active = self.registry.active_screen();
        if self.registry.window(id).is_some_and(|w| w.screen == active) {
            self.focus(id, out);
        }
    }

    fn on_config_updated(&mut self, config: Arc<Config>, out: &mut Vec<Command>) {
        let settings = &config.settings;
        self.registry.set_params(settings.tile_params(), settings.max_master);
        self.registry.grow_screens(settings.virtual_screens);
        if settings.virtual_screens < self.registry.screens().len() {
            info!(
                configured = settings.virtual_screens,
                existing = self.registry.screens().len(),
                "keeping existing virtual screens"
            );
        }
        self.config = config;
        self.relayout(self.registry.active_screen(), out);
    }

    fn retile(&mut self, id: WindowId, out: &mut Vec<Command>) {
        if self.drag.cancel_if_target(id) {
            debug!(?id, "retiling drag target, cancelling drag");
        }
        if !self.registry.retile(id) {
            return;
        }
        self.relayout(self.registry.active_screen(), out);
        out.push(Command::Lower(id));
    }

    fn rotate(&mut self, direction: RotateDirection, out: &mut Vec<Command>) {
        let (old, new) = self.registry.rotate_screen(direction);
        if old == new {
            return;
        }
        // Drags only target visible windows.
        self.drag = DragState::Idle;
        out.extend(self.registry.screen(old).windows().map(Command::Hide));

        self.registry.relayout(new);
        for (id, rect) in self.registry.frames(new) {
            set_geometry(out, id, rect);
            out.push(Command::Reveal(id));
        }
        out.extend(self.registry.screen(new).floating().map(Command::Raise));

        // The server's focus went away with the old screen, so this is always
        // sent even if the registry already remembers it.
        let screen = self.registry.screen(new);
        let next = screen.focused().or_else(|| screen.windows().next());
        if let Some(id) = next {
            self.registry.focus(id);
            out.push(Command::Focus(id));
        }
        info!(?old, ?new, "rotated virtual screens");
    }

    /// Recomputes the layout of `screen`, emitting changed frames if it is
    /// visible. Hidden screens get a full reissue when they are rotated in.
    fn relayout(&mut self, screen: ScreenId, out: &mut Vec<Command>) {
        let changed = self.registry.relayout(screen);
        if screen == self.registry.active_screen() {
            for (id, rect) in changed {
                set_geometry(out, id, rect);
            }
        }
    }

    fn focus(&mut self, id: WindowId, out: &mut Vec<Command>) {
        if self.registry.focused() == Some(id) {
            return;
        }
        if self.registry.focus(id) {
            out.push(Command::Focus(id));
        }
    }

    fn focus_fallback(&mut self, out: &mut Vec<Command>) {
        let next = self.registry.screen(self.registry.active_screen()).windows().next();
        if let Some(id) = next {
            self.focus(id, out);
        }
    }
}

/// Emits a geometry change unless the frame is empty, which the server
/// cannot apply. The window keeps its previous size on screen.
fn set_geometry(out: &mut Vec<Command>, id: WindowId, rect: Rect) {
    if rect.is_empty() {
        trace!(?id, ?rect, "not sending empty geometry");
        return;
    }
    out.push(Command::SetGeometry(id, rect));
}
