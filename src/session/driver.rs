use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::animation::{self, FlightAnimation, Frame};
use crate::flight::FlightContext;

use super::engine::{
    FocusStrategy, SessionEngine, SessionError, SessionEvent, SessionMode, SessionState,
};

const UPDATE_CAPACITY: usize = 256;

#[derive(Debug, Error)]
pub enum DriverError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("session driver has stopped")]
    Closed,
}

#[derive(Debug, Clone, Copy)]
pub struct DriverConfig {
    pub tick_period: Duration,
    pub frame_period: Duration,
    pub traversal: Duration,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            tick_period: Duration::from_secs(1),
            frame_period: Duration::from_millis(100),
            traversal: animation::TRAVERSAL,
        }
    }
}

impl DriverConfig {
    pub fn with_fps(fps: u32) -> Self {
        Self {
            frame_period: Duration::from_secs(1) / fps.max(1),
            ..Self::default()
        }
    }
}

/// Everything a late subscriber needs to draw the current screen.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub state: SessionState,
    pub context: Option<FlightContext>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionUpdate {
    State {
        state: SessionState,
        events: Vec<SessionEvent>,
        at: DateTime<Utc>,
    },
    Frame {
        frame: Frame,
    },
}

type Reply<T> = oneshot::Sender<T>;

#[derive(Debug)]
enum Command {
    Board {
        context: FlightContext,
        reply: Reply<Result<SessionState, SessionError>>,
    },
    CancelBoarding {
        reply: Reply<Result<SessionState, SessionError>>,
    },
    Start {
        strategy: FocusStrategy,
        reply: Reply<Result<SessionState, SessionError>>,
    },
    Abort {
        reply: Reply<SessionState>,
    },
    Query {
        reply: Reply<Snapshot>,
    },
    Shutdown,
}

/// Cloneable front door to a running [`SessionDriver`].
#[derive(Debug, Clone)]
pub struct SessionHandle {
    commands: mpsc::UnboundedSender<Command>,
    updates: broadcast::Sender<SessionUpdate>,
}

impl SessionHandle {
    pub fn subscribe(&self) -> broadcast::Receiver<SessionUpdate> {
        self.updates.subscribe()
    }

    pub async fn board(&self, context: FlightContext) -> Result<SessionState, DriverError> {
        Ok(self.request(|reply| Command::Board { context, reply }).await??)
    }

    pub async fn cancel_boarding(&self) -> Result<SessionState, DriverError> {
        Ok(self.request(|reply| Command::CancelBoarding { reply }).await??)
    }

    pub async fn start(&self, strategy: FocusStrategy) -> Result<SessionState, DriverError> {
        Ok(self.request(|reply| Command::Start { strategy, reply }).await??)
    }

    pub async fn abort(&self) -> Result<SessionState, DriverError> {
        self.request(|reply| Command::Abort { reply }).await
    }

    pub async fn query(&self) -> Result<Snapshot, DriverError> {
        self.request(|reply| Command::Query { reply }).await
    }

    pub fn shutdown(&self) {
        let _ = self.commands.send(Command::Shutdown);
    }

    async fn request<T>(&self, make: impl FnOnce(Reply<T>) -> Command) -> Result<T, DriverError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(make(reply))
            .map_err(|_| DriverError::Closed)?;
        response.await.map_err(|_| DriverError::Closed)
    }
}

/// Owns the [`SessionEngine`] and both clocks. Only this task mutates the
/// session; everyone else goes through a [`SessionHandle`].
pub struct SessionDriver {
    config: DriverConfig,
    engine: SessionEngine,
    context: Option<FlightContext>,
    animation: Option<(FlightAnimation, Instant)>,
    commands: mpsc::UnboundedReceiver<Command>,
    updates: broadcast::Sender<SessionUpdate>,
}

impl SessionDriver {
    pub fn new(config: DriverConfig) -> (Self, SessionHandle) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (updates, _) = broadcast::channel(UPDATE_CAPACITY);
        let handle = SessionHandle {
            commands: command_tx,
            updates: updates.clone(),
        };
        let driver = Self {
            config,
            engine: SessionEngine::new(),
            context: None,
            animation: None,
            commands: command_rx,
            updates,
        };
        (driver, handle)
    }

    pub fn spawn(config: DriverConfig) -> (SessionHandle, JoinHandle<()>) {
        let (driver, handle) = Self::new(config);
        (handle, tokio::spawn(driver.run()))
    }

    pub async fn run(mut self) {
        let mut ticker = time::interval(self.config.tick_period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut frames = time::interval(self.config.frame_period);
        frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            // commands first: start/abort win over a tick that is due
            tokio::select! {
                biased;
                command = self.commands.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => self.handle(command, &mut ticker, &mut frames),
                },
                _ = ticker.tick(), if self.is_flying() => self.on_tick(),
                _ = frames.tick(), if self.animation.is_some() => self.on_frame(),
            }
        }

        debug!("session driver stopped");
    }

    fn is_flying(&self) -> bool {
        self.engine.query().mode == SessionMode::Flying
    }

    fn handle(&mut self, command: Command, ticker: &mut Interval, frames: &mut Interval) {
        match command {
            Command::Board { context, reply } => {
                let result = self.engine.board();
                if let Ok(state) = result {
                    info!(
                        from = %context.route.origin().iata,
                        to = %context.route.destination().iata,
                        seat = ?context.seat,
                        estimated_flight_seconds = context.estimated_flight_seconds,
                        "boarding"
                    );
                    self.context = Some(context);
                    self.publish(state, Vec::new());
                }
                let _ = reply.send(result);
            }
            Command::CancelBoarding { reply } => {
                let result = self.engine.cancel_boarding();
                if let Ok(state) = result {
                    self.context = None;
                    self.publish(state, Vec::new());
                }
                let _ = reply.send(result);
            }
            Command::Start { strategy, reply } => {
                let _ = reply.send(self.start(strategy, ticker, frames));
            }
            Command::Abort { reply } => {
                let was_flying = self.is_flying();
                let state = self.engine.abort();
                self.clear_flight();
                let events = if was_flying {
                    vec![SessionEvent::Aborted]
                } else {
                    Vec::new()
                };
                self.publish(state, events);
                let _ = reply.send(state);
            }
            Command::Query { reply } => {
                let _ = reply.send(Snapshot {
                    state: self.engine.query(),
                    context: self.context.clone(),
                });
            }
            Command::Shutdown => {}
        }
    }

    fn start(
        &mut self,
        strategy: FocusStrategy,
        ticker: &mut Interval,
        frames: &mut Interval,
    ) -> Result<SessionState, SessionError> {
        let context = match &self.context {
            Some(context) if !self.is_flying() => context,
            _ => {
                return Err(SessionError::InvalidTransition {
                    operation: "start",
                    mode: self.engine.query().mode,
                });
            }
        };

        let state = self
            .engine
            .start(context.estimated_flight_seconds, strategy)?;
        let animation =
            FlightAnimation::with_traversal(context.route.path(), self.config.traversal);
        self.animation = Some((animation, Instant::now()));

        // first flight second is one full period after departure
        ticker.reset();
        frames.reset_immediately();
        self.publish(state, Vec::new());
        Ok(state)
    }

    fn on_tick(&mut self) {
        match self.engine.tick() {
            Ok(tick) => {
                if tick.state.mode != SessionMode::Flying {
                    self.clear_flight();
                }
                self.publish(tick.state, tick.events);
            }
            Err(e) => warn!("dropped tick: {}", e),
        }
    }

    fn on_frame(&mut self) {
        let Some((animation, departed_at)) = self.animation.as_mut() else {
            return;
        };
        if let Some(frame) = animation.frame(departed_at.elapsed()) {
            let done = frame.done;
            let _ = self.updates.send(SessionUpdate::Frame { frame });
            if done {
                // marker parked at the destination until the flight lands
                debug!("animation finished");
                self.animation = None;
            }
        }
    }

    /// Leaves no route or animation behind once the flight is over.
    fn clear_flight(&mut self) {
        self.animation = None;
        self.context = None;
    }

    fn publish(&self, state: SessionState, events: Vec<SessionEvent>) {
        let _ = self.updates.send(SessionUpdate::State {
            state,
            events,
            at: Utc::now(),
        });
    }
}
