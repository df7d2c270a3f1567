//! Background forecast fetching
//!
//! Fetches run as tokio tasks so the UI keeps handling input while a request
//! is outstanding. Results come back over an mpsc channel tagged with the
//! ticket's sequence number; the controller decides whether to keep them.

use tokio::sync::mpsc;
use tracing::debug;

use crate::client::{ClientError, ForecastClient};
use crate::controller::FetchTicket;
use crate::data::ForecastPayload;

/// Messages sent from fetch tasks to the main loop
#[derive(Debug)]
pub enum FetchMessage {
    /// A request finished, successfully or not
    Completed {
        seq: u64,
        result: Result<ForecastPayload, ClientError>,
    },
}

/// Dispatches fetch tickets and collects their results
pub struct FetchHandle {
    client: ForecastClient,
    sender: mpsc::Sender<FetchMessage>,
    receiver: mpsc::Receiver<FetchMessage>,
}

impl FetchHandle {
    pub fn new(client: ForecastClient) -> Self {
        let (sender, receiver) = mpsc::channel(32);
        Self {
            client,
            sender,
            receiver,
        }
    }

    /// Spawns a task fetching the ticket's location
    ///
    /// Must be called from within a tokio runtime.
    pub fn dispatch(&self, ticket: FetchTicket) {
        let client = self.client.clone();
        let tx = self.sender.clone();

        tokio::spawn(async move {
            let result = client.fetch(&ticket.location).await;
            if tx
                .send(FetchMessage::Completed {
                    seq: ticket.seq,
                    result,
                })
                .await
                .is_err()
            {
                debug!(seq = ticket.seq, "fetch finished after the dashboard closed");
            }
        });
    }

    /// Checks for a finished fetch without blocking
    pub fn try_recv(&mut self) -> Option<FetchMessage> {
        self.receiver.try_recv().ok()
    }

    /// Waits for the next finished fetch
    pub async fn recv(&mut self) -> Option<FetchMessage> {
        self.receiver.recv().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{ForecastController, LoadState};
    use crate::data::Location;
    use std::time::Duration;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn body_with_temp(temp: f64) -> serde_json::Value {
        serde_json::json!({ "current": { "temperature_2m": temp } })
    }

    #[tokio::test]
    async fn test_try_recv_empty_without_dispatch() {
        let mut handle = FetchHandle::new(ForecastClient::default());
        assert!(handle.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_dispatch_delivers_result_with_ticket_seq() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body_with_temp(22.0)))
            .mount(&server)
            .await;

        let mut handle = FetchHandle::new(ForecastClient::new(server.uri()));
        handle.dispatch(FetchTicket {
            seq: 7,
            location: Location::default(),
        });

        let Some(FetchMessage::Completed { seq, result }) = handle.recv().await else {
            panic!("expected a completion");
        };
        assert_eq!(seq, 7);
        assert_eq!(result.unwrap().current.unwrap().temperature_2m, Some(22.0));
    }

    #[tokio::test]
    async fn test_slow_superseded_response_does_not_win() {
        let server = MockServer::start().await;
        // A: Bangkok, answers slowly
        Mock::given(method("GET"))
            .and(query_param("tz", "Asia/Bangkok"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(body_with_temp(10.0))
                    .set_delay(Duration::from_millis(300)),
            )
            .mount(&server)
            .await;
        // B: Tokyo, answers immediately
        Mock::given(method("GET"))
            .and(query_param("tz", "Asia/Tokyo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body_with_temp(30.0)))
            .mount(&server)
            .await;

        let mut handle = FetchHandle::new(ForecastClient::new(server.uri()));
        let mut controller = ForecastController::new(Location::default());

        handle.dispatch(controller.select(Location::default()));
        let tokyo = Location::new(35.6762, 139.6503, "Asia/Tokyo").unwrap();
        handle.dispatch(controller.select(tokyo.clone()));

        let mut arrival_order = Vec::new();
        for _ in 0..2 {
            let Some(FetchMessage::Completed { seq, result }) = handle.recv().await else {
                panic!("expected a completion");
            };
            arrival_order.push(seq);
            controller.complete(seq, result);
        }

        assert_eq!(arrival_order, vec![2, 1]);
        assert_eq!(controller.state(), LoadState::Loaded);
        let snapshot = controller.snapshot().unwrap();
        assert_eq!(snapshot.location, tokyo);
        assert_eq!(
            snapshot.payload.current.as_ref().unwrap().temperature_2m,
            Some(30.0)
        );
    }
}
