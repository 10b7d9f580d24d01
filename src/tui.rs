use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::warn;

use qrpocket::input::{map_key_to_intent, Intent};
use qrpocket::platform::PermissionPlatform;
use qrpocket::scanner::BarcodeDecoder;
use qrpocket::view::render_scan;
use qrpocket::viewmodel::{Action, CameraState, ScanEvent, ScanViewModel};

type Term = Terminal<CrosstermBackend<Stdout>>;

const TICK: Duration = Duration::from_millis(250);
const POLL: Duration = Duration::from_millis(100);

/// Reads key presses on a plain thread and forwards them to the UI task
struct InputThread {
    stop: Arc<AtomicBool>,
    paused: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl InputThread {
    fn spawn(tx: mpsc::UnboundedSender<KeyEvent>) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let paused = Arc::new(AtomicBool::new(false));

        let handle = {
            let stop = Arc::clone(&stop);
            let paused = Arc::clone(&paused);
            std::thread::spawn(move || {
                while !stop.load(Ordering::Acquire) {
                    if paused.load(Ordering::Acquire) {
                        std::thread::sleep(POLL);
                        continue;
                    }
                    match event::poll(POLL) {
                        Ok(true) => {}
                        Ok(false) => continue,
                        Err(e) => {
                            warn!(error = %e, "terminal input failed");
                            break;
                        }
                    }
                    if let Ok(Event::Key(key)) = event::read() {
                        if key.kind == KeyEventKind::Press && tx.send(key).is_err() {
                            break;
                        }
                    }
                }
            })
        };

        Self { stop, paused, handle: Some(handle) }
    }

    fn pause(&self) {
        self.paused.store(true, Ordering::Release);
        // Let a poll already in progress run out
        std::thread::sleep(POLL + Duration::from_millis(20));
    }

    fn resume(&self) {
        self.paused.store(false, Ordering::Release);
    }
}

impl Drop for InputThread {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn enter_terminal() -> Result<Term> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

fn resume_terminal(terminal: &mut Term) -> Result<()> {
    enable_raw_mode()?;
    execute!(terminal.backend_mut(), EnterAlternateScreen)?;
    terminal.clear()?;
    Ok(())
}

fn leave_terminal(terminal: &mut Term) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

enum Wake {
    Scan(Option<ScanEvent>),
    Key(Option<KeyEvent>),
    Tick,
}

/// Run the scan screen until the user quits
pub async fn run<D, P>(mut vm: ScanViewModel<D, P>) -> Result<()>
where
    D: BarcodeDecoder,
    P: PermissionPlatform,
{
    // A first permission prompt happens on the plain terminal
    vm.start().await;

    let mut terminal = enter_terminal()?;
    let (tx, mut keys) = mpsc::unbounded_channel();
    let input = InputThread::spawn(tx);
    let mut tick = tokio::time::interval(TICK);

    let result = event_loop(&mut vm, &mut terminal, &input, &mut keys, &mut tick).await;

    vm.teardown();
    drop(input);
    leave_terminal(&mut terminal)?;
    result
}

async fn event_loop<D, P>(
    vm: &mut ScanViewModel<D, P>,
    terminal: &mut Term,
    input: &InputThread,
    keys: &mut mpsc::UnboundedReceiver<KeyEvent>,
    tick: &mut tokio::time::Interval,
) -> Result<()>
where
    D: BarcodeDecoder,
    P: PermissionPlatform,
{
    loop {
        let now = Instant::now();
        vm.prune_notices(now);
        let snapshot = vm.snapshot(now);
        terminal.draw(|f| render_scan(f, &snapshot, f.area()))?;

        let scanning = vm.is_decoding() || vm.camera_state() == CameraState::Running;
        let wake = tokio::select! {
            event = vm.next_event(), if scanning => Wake::Scan(event),
            key = keys.recv() => Wake::Key(key),
            _ = tick.tick() => Wake::Tick,
        };

        let intent = match wake {
            Wake::Key(Some(key)) => map_key_to_intent(&key, vm.input_mode()),
            Wake::Key(None) => return Ok(()),
            Wake::Scan(_) | Wake::Tick => None,
        };
        let Some(intent) = intent else {
            continue;
        };

        let action = if intent == Intent::GrantPermission {
            input.pause();
            leave_terminal(terminal)?;
            let action = vm.handle_intent(intent).await;
            resume_terminal(terminal)?;
            input.resume();
            action
        } else {
            vm.handle_intent(intent).await
        };

        if action == Action::Quit {
            return Ok(());
        }
    }
}
