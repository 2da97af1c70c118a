//! X11 XGrabKey hotkey backend
//!
//! Uses X11's native global hotkey registration via XGrabKey.
//! This is the default backend as it requires no special permissions.
//!
//! The X11 connection lives on a dedicated listener thread. Registration
//! requests are passed to it over a control channel and answered once the
//! grab has been confirmed by the server, so conflicts with other
//! applications surface as errors from `register`. Every control message is
//! followed by a byte on a wake socket so the listener leaves `poll` at once.
//!
//! Limitations:
//! - May conflict with other applications using the same hotkeys
//! - Some exotic key combinations may not work under XWayland

use anyhow::{Context, Result, anyhow, bail};
use std::collections::HashMap;
use std::io::{ErrorKind, Read, Write};
use std::os::unix::io::AsRawFd;
use std::os::unix::net::UnixStream;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use tracing::{debug, error, info, warn};
use x11rb::connection::Connection;
use x11rb::protocol::Event;
use x11rb::protocol::xproto::*;
use x11rb::rust_connection::RustConnection;

use crate::common::constants::input::{LISTENER_POLL_TIMEOUT_MS, X11_KEYCODE_OFFSET};
use crate::config::HotkeyBinding;
use crate::input::backend::HotkeyBackend;
use crate::input::listener::PageCommand;

/// Callback invoked after a command was queued so the UI thread wakes up
pub type WakeFn = Box<dyn Fn() + Send>;

enum ListenerControl {
    Register {
        binding: HotkeyBinding,
        command: PageCommand,
        reply: Sender<Result<()>>,
    },
    Unregister {
        binding: HotkeyBinding,
        reply: Sender<Result<bool>>,
    },
    Shutdown,
}

/// Write end of a socket pair the listener polls next to the X11 socket.
/// Nudging it interrupts `poll` so control messages are handled immediately.
struct ListenerWaker(UnixStream);

impl ListenerWaker {
    fn pair() -> Result<(Self, UnixStream)> {
        let (tx, rx) = UnixStream::pair().context("Failed to create listener wake socket")?;
        tx.set_nonblocking(true)?;
        rx.set_nonblocking(true)?;
        Ok((Self(tx), rx))
    }

    fn nudge(&self) {
        match (&self.0).write(&[1]) {
            // A full buffer already guarantees a pending wake-up
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::WouldBlock => {}
            Err(e) => warn!(error = %e, "Failed to wake X11 hotkey listener"),
        }
    }
}

/// Consume pending wake-up bytes. Returns true if any were read.
fn drain_wake(rx: &mut UnixStream) -> bool {
    let mut buf = [0u8; 64];
    let mut woken = false;
    loop {
        match rx.read(&mut buf) {
            Ok(0) => return woken,
            Ok(_) => woken = true,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(_) => return woken,
        }
    }
}

pub struct X11Backend {
    control: Sender<ListenerControl>,
    waker: ListenerWaker,
    handle: Option<JoinHandle<()>>,
}

impl X11Backend {
    /// Connect to the display and start the listener thread.
    /// Fails if no X server is reachable.
    pub fn spawn(sender: Sender<PageCommand>, wake: WakeFn) -> Result<Self> {
        let (conn, screen_num) =
            x11rb::connect(None).context("Failed to connect to X11 for hotkey listening")?;
        let root = conn.setup().roots[screen_num].root;

        info!("X11 hotkey listener connected to display");

        let (control_tx, control_rx) = mpsc::channel();
        let (waker, wake_rx) = ListenerWaker::pair()?;
        let handle = thread::Builder::new()
            .name("x11-hotkeys".to_string())
            .spawn(move || {
                let mut listener = Listener {
                    conn,
                    root,
                    hotkeys: HashMap::new(),
                    sender,
                    wake,
                };
                if let Err(e) = listener.run(control_rx, wake_rx) {
                    error!(error = %e, "X11 hotkey listener error");
                }
                listener.release_all();
            })
            .context("Failed to spawn X11 hotkey thread")?;

        Ok(Self {
            control: control_tx,
            waker,
            handle: Some(handle),
        })
    }

    fn request<T>(&self, build: impl FnOnce(Sender<Result<T>>) -> ListenerControl) -> Result<T> {
        let (reply_tx, reply_rx) = mpsc::channel();
        self.control
            .send(build(reply_tx))
            .map_err(|_| anyhow!("X11 hotkey listener is not running"))?;
        self.waker.nudge();
        reply_rx
            .recv()
            .map_err(|_| anyhow!("X11 hotkey listener stopped before replying"))?
    }
}

impl HotkeyBackend for X11Backend {
    fn register(&mut self, binding: &HotkeyBinding, command: PageCommand) -> Result<()> {
        let binding = binding.clone();
        self.request(|reply| ListenerControl::Register {
            binding,
            command,
            reply,
        })
    }

    fn unregister(&mut self, binding: &HotkeyBinding) -> Result<bool> {
        let binding = binding.clone();
        self.request(|reply| ListenerControl::Unregister { binding, reply })
    }

    fn name(&self) -> &'static str {
        "X11"
    }
}

impl Drop for X11Backend {
    fn drop(&mut self) {
        let _ = self.control.send(ListenerControl::Shutdown);
        self.waker.nudge();
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            warn!("X11 hotkey thread panicked");
        }
    }
}

struct Listener {
    conn: RustConnection,
    root: Window,
    hotkeys: HashMap<(Keycode, ModMask), PageCommand>,
    sender: Sender<PageCommand>,
    wake: WakeFn,
}

impl Listener {
    /// Main X11 listener loop
    #[allow(unsafe_code)] // Required for libc::poll() system call
    fn run(&mut self, control: Receiver<ListenerControl>, mut wake: UnixStream) -> Result<()> {
        let x11_fd = self.conn.stream().as_raw_fd();
        let wake_fd = wake.as_raw_fd();

        loop {
            // Drain before reading controls so a nudge sent after this point is not lost
            drain_wake(&mut wake);

            loop {
                match control.try_recv() {
                    Ok(ListenerControl::Register {
                        binding,
                        command,
                        reply,
                    }) => {
                        let _ = reply.send(self.grab(&binding, command));
                    }
                    Ok(ListenerControl::Unregister { binding, reply }) => {
                        let _ = reply.send(self.ungrab(&binding));
                    }
                    Ok(ListenerControl::Shutdown) | Err(TryRecvError::Disconnected) => {
                        info!("X11 hotkey listener shutting down");
                        return Ok(());
                    }
                    Err(TryRecvError::Empty) => break,
                }
            }

            // Replies to grab checks can pull events into the connection buffer,
            // so drain it before blocking on the socket
            while let Some(event) = self.conn.poll_for_event()? {
                self.handle_event(event);
            }

            let mut poll_fds = [
                libc::pollfd {
                    fd: x11_fd,
                    events: libc::POLLIN,
                    revents: 0,
                },
                libc::pollfd {
                    fd: wake_fd,
                    events: libc::POLLIN,
                    revents: 0,
                },
            ];

            // SAFETY: `poll_fds` is a valid pointer to a stack-allocated array of `pollfd`.
            // The array length matches the second argument.
            let poll_result = unsafe {
                libc::poll(
                    poll_fds.as_mut_ptr(),
                    poll_fds.len() as libc::nfds_t,
                    LISTENER_POLL_TIMEOUT_MS,
                )
            };

            if poll_result < 0 {
                let err = std::io::Error::last_os_error();
                if err.kind() == std::io::ErrorKind::Interrupted {
                    continue;
                }
                bail!("poll() failed: {err}");
            }
        }
    }

    fn handle_event(&self, event: Event) {
        match event {
            Event::KeyPress(key_event) => {
                let modmask = normalize_modmask(key_event.state);
                match self.hotkeys.get(&(key_event.detail, modmask)) {
                    Some(command) => {
                        debug!(
                            keycode = key_event.detail,
                            modmask = ?modmask,
                            command = ?command,
                            "Hotkey pressed, sending command"
                        );
                        if self.sender.send(*command).is_err() {
                            warn!("Overlay is gone, dropping hotkey command");
                            return;
                        }
                        (self.wake)();
                    }
                    None => debug!(
                        keycode = key_event.detail,
                        modmask = ?modmask,
                        "KeyPress event didn't match any registered hotkey"
                    ),
                }
            }
            Event::MappingNotify(_) => {
                warn!("Keyboard mapping changed - hotkeys may not work correctly until rebound");
            }
            _ => {}
        }
    }

    fn grab(&mut self, binding: &HotkeyBinding, command: PageCommand) -> Result<()> {
        let (keycode, modmask) = evdev_to_x11_key(binding)
            .ok_or_else(|| anyhow!("{} has no X11 keycode", binding.display_name()))?;

        if let Some(existing) = self.hotkeys.get(&(keycode, modmask)) {
            if *existing == command {
                return Ok(());
            }
            bail!(
                "{} is already grabbed for {:?}",
                binding.display_name(),
                existing
            );
        }

        if let Err(e) = register_hotkey(&self.conn, self.root, keycode, modmask) {
            // Roll back any lock-key permutations that did succeed
            let _ = ungrab_hotkey(&self.conn, self.root, keycode, modmask);
            let _ = self.conn.flush();
            return Err(e.context(format!(
                "{} is in use by another application",
                binding.display_name()
            )));
        }

        self.hotkeys.insert((keycode, modmask), command);
        info!(
            binding = %binding.display_name(),
            x11_keycode = keycode,
            modmask = ?modmask,
            command = ?command,
            "Grabbed hotkey"
        );
        Ok(())
    }

    fn ungrab(&mut self, binding: &HotkeyBinding) -> Result<bool> {
        let Some(key) = evdev_to_x11_key(binding) else {
            return Ok(false);
        };
        if self.hotkeys.remove(&key).is_none() {
            return Ok(false);
        }
        ungrab_hotkey(&self.conn, self.root, key.0, key.1)?;
        self.conn.flush().context("Failed to flush X11 connection")?;
        Ok(true)
    }

    fn release_all(&mut self) {
        for (keycode, modmask) in std::mem::take(&mut self.hotkeys).into_keys() {
            if let Err(e) = ungrab_hotkey(&self.conn, self.root, keycode, modmask) {
                warn!(keycode, error = %e, "Failed to release hotkey on shutdown");
            }
        }
        let _ = self.conn.flush();
    }
}

/// Lock-key modifiers that must be grabbed alongside each binding.
/// X11 treats "Ctrl+Left" and "Ctrl+Left+NumLock" as different combinations.
fn ignored_lock_masks() -> [ModMask; 4] {
    [
        ModMask::from(0u16),
        ModMask::M2,
        ModMask::LOCK,
        ModMask::M2 | ModMask::LOCK,
    ]
}

/// Register a global hotkey with X11, waiting for the server to confirm
fn register_hotkey(
    conn: &RustConnection,
    root: Window,
    keycode: Keycode,
    modmask: ModMask,
) -> Result<()> {
    for ignore_mask in ignored_lock_masks() {
        let effective_modmask = modmask | ignore_mask;

        conn.grab_key(
            false,
            root,
            effective_modmask,
            keycode,
            GrabMode::ASYNC,
            GrabMode::ASYNC,
        )
        .context("Failed to send GrabKey request")?
        .check()
        .with_context(|| {
            format!(
                "Failed to grab key: keycode={}, modmask={:?}",
                keycode, effective_modmask
            )
        })?;
    }

    Ok(())
}

/// Helper to ungrab a hotkey (reverse of register_hotkey)
fn ungrab_hotkey(
    conn: &RustConnection,
    root: Window,
    keycode: Keycode,
    modmask: ModMask,
) -> Result<()> {
    for ignore_mask in ignored_lock_masks() {
        conn.ungrab_key(keycode, root, modmask | ignore_mask)?;
    }
    Ok(())
}

/// Normalize modifier mask by removing lock keys
fn normalize_modmask(state: KeyButMask) -> ModMask {
    let state_u16: u16 = state.into();

    // Keep only Shift, Control, Mod1 (Alt), Mod4 (Super)
    let normalized = state_u16
        & (ModMask::SHIFT.bits()
            | ModMask::CONTROL.bits()
            | ModMask::M1.bits()
            | ModMask::M4.bits());

    ModMask::from(normalized)
}

/// Convert evdev key binding to X11 keycode and modifier mask
fn evdev_to_x11_key(binding: &HotkeyBinding) -> Option<(Keycode, ModMask)> {
    let x11_keycode = evdev_keycode_to_x11(binding.key_code)?;

    let mut modmask = ModMask::from(0u16);
    if binding.ctrl {
        modmask |= ModMask::CONTROL;
    }
    if binding.shift {
        modmask |= ModMask::SHIFT;
    }
    if binding.alt {
        modmask |= ModMask::M1;
    }
    if binding.super_key {
        modmask |= ModMask::M4;
    }

    Some((x11_keycode, modmask))
}

/// Convert evdev keycode to X11 keycode (evdev + 8, valid range 8-255)
fn evdev_keycode_to_x11(evdev_code: u16) -> Option<Keycode> {
    let x11_code = evdev_code.checked_add(X11_KEYCODE_OFFSET)?;
    Keycode::try_from(x11_code).ok()
}
