// Event loop owning the Workout: commands, frames and countdown ticks are
// serialized through one channel and handled strictly in arrival order.

use crate::core::countdown::CountdownTimer;
use crate::core::display::DisplayState;
use crate::core::workout::{Notification, Workout};
use crate::models::pose::{PoseFrame, PoseResult};
use crate::models::workout::{Language, Mode, SessionSummary, WorkoutError, WorkoutResult};
use crate::platform::pose::PoseSource;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

const EVENT_CHANNEL_CAPACITY: usize = 256;
const NOTIFICATION_CHANNEL_CAPACITY: usize = 256;

/// User-initiated controls
#[derive(Debug)]
pub enum Command {
    Start,
    Stop(oneshot::Sender<SessionSummary>),
    SelectMode(String, oneshot::Sender<WorkoutResult<Mode>>),
    ToggleLanguage(oneshot::Sender<Language>),
    ZoomIn,
    ZoomOut,
    ResetZoom,
    Snapshot(oneshot::Sender<DisplayState>),
}

#[derive(Debug)]
enum Event {
    Command(Command),
    Frame(PoseFrame),
    CountdownTick { generation: u64 },
}

/// Cloneable handle for sending input to a running workout
#[derive(Clone)]
pub struct WorkoutHandle {
    tx: mpsc::Sender<Event>,
    notifications: broadcast::Sender<Notification>,
}

impl WorkoutHandle {
    async fn send(&self, event: Event) -> WorkoutResult<()> {
        self.tx
            .send(event)
            .await
            .map_err(|_| WorkoutError::RuntimeClosed)
    }

    async fn request<T>(&self, make: impl FnOnce(oneshot::Sender<T>) -> Command) -> WorkoutResult<T> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(Event::Command(make(reply_tx))).await?;
        reply_rx.await.map_err(|_| WorkoutError::RuntimeClosed)
    }

    pub async fn start(&self) -> WorkoutResult<()> {
        self.send(Event::Command(Command::Start)).await
    }

    pub async fn stop(&self) -> WorkoutResult<SessionSummary> {
        self.request(Command::Stop).await
    }

    pub async fn select_mode(&self, tag: &str) -> WorkoutResult<Mode> {
        let tag = tag.to_string();
        self.request(|reply| Command::SelectMode(tag, reply)).await?
    }

    pub async fn toggle_language(&self) -> WorkoutResult<Language> {
        self.request(Command::ToggleLanguage).await
    }

    pub async fn zoom_in(&self) -> WorkoutResult<()> {
        self.send(Event::Command(Command::ZoomIn)).await
    }

    pub async fn zoom_out(&self) -> WorkoutResult<()> {
        self.send(Event::Command(Command::ZoomOut)).await
    }

    pub async fn reset_zoom(&self) -> WorkoutResult<()> {
        self.send(Event::Command(Command::ResetZoom)).await
    }

    pub async fn snapshot(&self) -> WorkoutResult<DisplayState> {
        self.request(Command::Snapshot).await
    }

    /// Deliver one landmark frame, the `onLandmarks` side of the pose source
    pub async fn push_frame(&self, frame: PoseFrame) -> WorkoutResult<()> {
        self.send(Event::Frame(frame)).await
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.notifications.subscribe()
    }
}

/// Spawn the event loop. It runs until every `WorkoutHandle` is dropped and
/// then hands the final `Workout` back through the join handle.
pub fn spawn(workout: Workout, countdown_period: Duration) -> (WorkoutHandle, JoinHandle<Workout>) {
    let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
    let (notify_tx, _) = broadcast::channel(NOTIFICATION_CHANNEL_CAPACITY);

    let event_loop = EventLoop {
        workout,
        countdown_period,
        timer: None,
        self_tx: tx.downgrade(),
        notifications: notify_tx.clone(),
    };

    let join = tokio::spawn(event_loop.run(rx));

    (
        WorkoutHandle {
            tx,
            notifications: notify_tx,
        },
        join,
    )
}

struct EventLoop {
    workout: Workout,
    countdown_period: Duration,
    timer: Option<CountdownTimer>,
    self_tx: mpsc::WeakSender<Event>,
    notifications: broadcast::Sender<Notification>,
}

impl EventLoop {
    async fn run(mut self, mut rx: mpsc::Receiver<Event>) -> Workout {
        while let Some(event) = rx.recv().await {
            self.handle(event);
            for notification in self.workout.take_notifications() {
                // No subscribers is fine
                let _ = self.notifications.send(notification);
            }
        }

        self.cancel_countdown();
        debug!("Workout event loop finished");
        self.workout
    }

    fn handle(&mut self, event: Event) {
        match event {
            Event::Frame(frame) => {
                self.workout.observe_frame(&frame);
            }
            Event::CountdownTick { generation } => {
                self.workout.countdown_tick(generation);
            }
            Event::Command(command) => self.handle_command(command),
        }
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Start => {
                self.cancel_countdown();
                let start = self.workout.start(Instant::now());
                if start.countdown_ticks > 0 {
                    self.arm_countdown(start.generation, start.countdown_ticks);
                }
            }
            Command::Stop(reply) => {
                // Cancel first so no tick can be produced after this point; ticks
                // already queued carry a generation that stop() invalidates.
                self.cancel_countdown();
                let summary = self.workout.stop(Instant::now());
                let _ = reply.send(summary);
            }
            Command::SelectMode(tag, reply) => {
                let result = self.workout.select_mode(&tag);
                if let Err(e) = &result {
                    warn!("{}", e);
                }
                let _ = reply.send(result);
            }
            Command::ToggleLanguage(reply) => {
                let _ = reply.send(self.workout.toggle_language());
            }
            Command::ZoomIn => {
                self.workout.zoom_in();
            }
            Command::ZoomOut => {
                self.workout.zoom_out();
            }
            Command::ResetZoom => {
                self.workout.reset_zoom();
            }
            Command::Snapshot(reply) => {
                let _ = reply.send(self.workout.display_state());
            }
        }
    }

    fn arm_countdown(&mut self, generation: u64, ticks: u32) {
        let Some(tx) = self.self_tx.upgrade() else {
            return;
        };
        self.timer = Some(CountdownTimer::spawn(
            ticks,
            self.countdown_period,
            &tx,
            move || Event::CountdownTick { generation },
        ));
    }

    fn cancel_countdown(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.cancel();
        }
    }
}

/// Pull frames from `source` into the workout until the source runs dry.
/// Returns the number of frames delivered.
pub async fn pump_frames<S: PoseSource + ?Sized>(
    source: &mut S,
    handle: &WorkoutHandle,
) -> PoseResult<u64> {
    info!("Reading frames from {}", source.model_info());

    let mut delivered = 0;
    while let Some(frame) = source.next_frame().await? {
        if handle.push_frame(frame).await.is_err() {
            warn!("Workout stopped accepting frames");
            break;
        }
        delivered += 1;
    }

    debug!("Pose source exhausted after {} frames", delivered);
    Ok(delivered)
}
