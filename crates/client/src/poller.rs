use crate::http::ClientError;
use crate::source::SnapshotSource;
use cityview_scene::KindSnapshot;
use std::sync::mpsc;
use std::thread::JoinHandle;

enum Request {
    Poll,
    Shutdown,
}

/// Outcome of one poll cycle, delivered back to the render thread.
#[derive(Debug)]
pub enum PollEvent {
    Snapshots(Vec<KindSnapshot>),
    /// The cycle failed; the live entity set stays untouched and the next
    /// cycle retries.
    Failed(String),
}

/// Runs the snapshot source on a dedicated worker thread.
///
/// The render thread requests a poll every Nth frame (only when none is
/// outstanding) and drains completed results at the top of a later tick,
/// so frames keep rendering with stale targets while a fetch is in flight.
/// All scene mutation stays on the render thread; the worker's only side
/// effect is handing snapshots back over the channel.
pub struct BackgroundPoller {
    request_tx: mpsc::Sender<Request>,
    event_rx: mpsc::Receiver<PollEvent>,
    outstanding: bool,
    handle: Option<JoinHandle<()>>,
}

impl BackgroundPoller {
    pub fn spawn<S>(mut source: S) -> Self
    where
        S: SnapshotSource + Send + 'static,
    {
        let (request_tx, request_rx) = mpsc::channel::<Request>();
        let (event_tx, event_rx) = mpsc::channel::<PollEvent>();

        let handle = std::thread::Builder::new()
            .name("cityview-poller".into())
            .spawn(move || {
                for request in request_rx.iter() {
                    match request {
                        Request::Poll => {
                            let event = match source.poll() {
                                Ok(snapshots) => PollEvent::Snapshots(snapshots),
                                Err(e) => PollEvent::Failed(report(&e)),
                            };
                            if event_tx.send(event).is_err() {
                                break; // render side is gone
                            }
                        }
                        Request::Shutdown => break,
                    }
                }
            })
            .expect("spawn poller thread");

        Self {
            request_tx,
            event_rx,
            outstanding: false,
            handle: Some(handle),
        }
    }

    /// Request one poll cycle. A no-op while a request is outstanding, so
    /// at most one fetch is ever in flight.
    pub fn request_poll(&mut self) {
        if self.outstanding {
            return;
        }
        if self.request_tx.send(Request::Poll).is_ok() {
            self.outstanding = true;
        }
    }

    pub fn is_outstanding(&self) -> bool {
        self.outstanding
    }

    /// Drain every completed event without blocking. Called once per tick
    /// before reconciliation.
    pub fn drain(&mut self) -> Vec<PollEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.event_rx.try_recv() {
            self.outstanding = false;
            events.push(event);
        }
        events
    }
}

impl Drop for BackgroundPoller {
    fn drop(&mut self) {
        let _ = self.request_tx.send(Request::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn report(e: &ClientError) -> String {
    e.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cityview_common::EntityKind;
    use cityview_scene::SnapshotRecord;
    use std::time::Duration;

    /// Source that fails on the cycles listed, succeeds otherwise.
    struct ScriptedSource {
        seq: u64,
        fail_on: Vec<u64>,
    }

    impl SnapshotSource for ScriptedSource {
        fn poll(&mut self) -> Result<Vec<KindSnapshot>, ClientError> {
            self.seq += 1;
            if self.fail_on.contains(&self.seq) {
                return Err(ClientError::Decode(std::io::Error::other("scripted")));
            }
            Ok(vec![KindSnapshot::new(
                EntityKind::Vehicle,
                self.seq,
                vec![SnapshotRecord::at(1, self.seq as f32, 1.0, 0.0)],
            )])
        }
    }

    fn wait_for_events(poller: &mut BackgroundPoller) -> Vec<PollEvent> {
        for _ in 0..100 {
            let events = poller.drain();
            if !events.is_empty() {
                return events;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        panic!("poller produced no event");
    }

    #[test]
    fn poll_round_trip() {
        let mut poller = BackgroundPoller::spawn(ScriptedSource {
            seq: 0,
            fail_on: vec![],
        });
        poller.request_poll();
        assert!(poller.is_outstanding());

        let events = wait_for_events(&mut poller);
        assert!(!poller.is_outstanding());
        match &events[0] {
            PollEvent::Snapshots(snaps) => {
                assert_eq!(snaps[0].kind, EntityKind::Vehicle);
                assert_eq!(snaps[0].seq, 1);
            }
            PollEvent::Failed(e) => panic!("unexpected failure: {e}"),
        }
    }

    #[test]
    fn at_most_one_outstanding_request() {
        let mut poller = BackgroundPoller::spawn(ScriptedSource {
            seq: 0,
            fail_on: vec![],
        });
        poller.request_poll();
        poller.request_poll(); // coalesced, still one in flight
        poller.request_poll();

        let first = wait_for_events(&mut poller);
        assert_eq!(first.len(), 1);

        // No further events: the extra requests were dropped.
        std::thread::sleep(Duration::from_millis(20));
        assert!(poller.drain().is_empty());
    }

    #[test]
    fn failure_is_reported_and_next_poll_recovers() {
        let mut poller = BackgroundPoller::spawn(ScriptedSource {
            seq: 0,
            fail_on: vec![1],
        });
        poller.request_poll();
        let events = wait_for_events(&mut poller);
        assert!(matches!(events[0], PollEvent::Failed(_)));

        poller.request_poll();
        let events = wait_for_events(&mut poller);
        assert!(matches!(events[0], PollEvent::Snapshots(_)));
    }
}
