use std::{sync::Arc, time::Duration};

use futures::{channel::oneshot, pin_mut, select, FutureExt};
use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};

use crate::api::{DataSource, Match, MatchStatus};

pub const LIVE_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// Keeps a match listing fresh while a view is open
///
/// Dropping the poller stops it too, at its next suspension point.
#[derive(Debug)]
pub struct LivePoller {
    canceller: oneshot::Receiver<()>,
    task: JoinHandle<()>,
}

impl LivePoller {
    /// Fetches right away, then once every `period`, sending each successful
    /// listing to `sink`
    pub fn start<S>(
        source: Arc<S>,
        status: Option<MatchStatus>,
        period: Duration,
        sink: mpsc::UnboundedSender<Vec<Match>>,
    ) -> LivePoller
    where
        S: DataSource + ?Sized + 'static,
    {
        let (cancel, canceller) = oneshot::channel();
        let task = tokio::spawn(poll_matches(source, status, period, sink, cancel));
        LivePoller { canceller, task }
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stops polling, waiting for the task to wind down
    pub async fn stop(mut self) {
        self.canceller.close();
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "live match poller crashed");
        }
    }
}

async fn poll_matches<S: DataSource + ?Sized>(
    source: Arc<S>,
    status: Option<MatchStatus>,
    period: Duration,
    sink: mpsc::UnboundedSender<Vec<Match>>,
    mut cancel: oneshot::Sender<()>,
) {
    tracing::info!(?status, ?period, "started polling matches");
    let mut ticks = time::interval(period);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut cancellation = cancel.cancellation().fuse();
    loop {
        select! {
            _ = cancellation => break,
            _ = ticks.tick().fuse() => (),
        }
        let fetch = source.fetch_matches(status).fuse();
        pin_mut!(fetch);
        select! {
            _ = cancellation => break,
            res = fetch => match res {
                Ok(matches) => {
                    if sink.send(matches).is_err() {
                        tracing::debug!("match listing receiver is gone");
                        break;
                    }
                }
                Err(e) => tracing::warn!(error = %e, "failed refreshing matches"),
            },
        }
    }
    tracing::info!(?status, "stopped polling matches");
}
