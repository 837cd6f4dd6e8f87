use std::sync::Arc;

use sheetlink_core::{BatchUpdateResponse, Request};
use tracing::debug;

use crate::error::BatchError;
use crate::retry::{RetryPolicy, Sleeper, ThreadSleeper};
use crate::transport::Transport;

/// Whether requests are being accumulated or sent straight away
#[derive(Debug, Clone, Default, PartialEq)]
pub enum BatchState {
    #[default]
    NotBatching,
    /// Requests waiting for the next flush, in submission order
    Batching(Vec<Request>),
}

/// Queues requests for one spreadsheet and submits them as atomic
/// transactions through a [`Transport`].
///
/// Outside of a batch every submission is its own transaction. Between
/// [`BatchExecutor::start_batch`] and [`BatchExecutor::flush`] submissions are
/// only recorded, and the flush sends all of them as one transaction in the
/// order they were submitted.
pub struct BatchExecutor<T> {
    spreadsheet_id: String,
    transport: T,
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
    state: BatchState,
}

impl<T: Transport> BatchExecutor<T> {
    /// Create an executor with the default retry policy
    pub fn new(spreadsheet_id: impl Into<String>, transport: T) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.into(),
            transport,
            policy: RetryPolicy::default(),
            sleeper: Arc::new(ThreadSleeper),
            state: BatchState::NotBatching,
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replace how the executor waits between rate-limited attempts
    pub fn with_sleeper(mut self, sleeper: impl Sleeper + 'static) -> Self {
        self.sleeper = Arc::new(sleeper);
        self
    }

    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn state(&self) -> &BatchState {
        &self.state
    }

    /// Start capturing submissions. Work already queued is kept.
    pub fn start_batch(&mut self) {
        if let BatchState::NotBatching = self.state {
            debug!("Starting batch for spreadsheet {}", self.spreadsheet_id);
            self.state = BatchState::Batching(Vec::new());
        }
    }

    /// Drop everything queued and go back to immediate execution
    pub fn clear_batch(&mut self) {
        if let BatchState::Batching(queue) = &self.state {
            debug!(
                "Discarding {} pending requests for spreadsheet {}",
                queue.len(),
                self.spreadsheet_id
            );
        }
        self.state = BatchState::NotBatching;
    }

    pub fn is_batching(&self) -> bool {
        matches!(self.state, BatchState::Batching(_))
    }

    /// Requests waiting for the next flush
    pub fn pending(&self) -> &[Request] {
        match &self.state {
            BatchState::Batching(queue) => queue.as_slice(),
            BatchState::NotBatching => &[],
        }
    }

    /// Queue `request` while batching, otherwise run it as its own transaction.
    /// Returns `None` when the request was only queued.
    pub fn submit(&mut self, request: Request) -> Result<Option<BatchUpdateResponse>, BatchError> {
        self.submit_all(vec![request])
    }

    /// Like [`BatchExecutor::submit`] for requests that must share a transaction
    pub fn submit_all(
        &mut self,
        requests: Vec<Request>,
    ) -> Result<Option<BatchUpdateResponse>, BatchError> {
        if let BatchState::Batching(queue) = &mut self.state {
            queue.extend(requests);
            debug!(
                "Queued request for spreadsheet {} ({} pending)",
                self.spreadsheet_id,
                queue.len()
            );
            return Ok(None);
        }
        if requests.is_empty() {
            return Ok(None);
        }
        self.execute(&requests).map(Some)
    }

    /// Send everything queued as one transaction.
    ///
    /// An absent or empty queue makes no remote call. Otherwise the queue is
    /// gone afterwards whether or not the transaction succeeded; on failure the
    /// remote state of the queued requests is unknown.
    pub fn flush(&mut self) -> Result<Option<BatchUpdateResponse>, BatchError> {
        let queue = match &mut self.state {
            BatchState::Batching(queue) if !queue.is_empty() => std::mem::take(queue),
            _ => return Ok(None),
        };
        self.state = BatchState::NotBatching;

        debug!(
            "Flushing {} requests for spreadsheet {}",
            queue.len(),
            self.spreadsheet_id
        );
        self.execute(&queue).map(Some)
    }

    /// Run `requests` as one transaction, retrying rate-limited attempts
    pub fn execute(&self, requests: &[Request]) -> Result<BatchUpdateResponse, BatchError> {
        self.policy.run(self.sleeper.as_ref(), || {
            self.transport.batch_update(&self.spreadsheet_id, requests)
        })
    }
}

impl<T> std::fmt::Debug for BatchExecutor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let pending = match &self.state {
            BatchState::Batching(queue) => Some(queue.len()),
            BatchState::NotBatching => None,
        };
        f.debug_struct("BatchExecutor")
            .field("spreadsheet_id", &self.spreadsheet_id)
            .field("policy", &self.policy)
            .field("pending", &pending)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::TransportFailure;
    use sheetlink_core::{parse_grid_range, ExtendedValue, MergeType};
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Records every transaction and replays scripted failures first
    #[derive(Default)]
    struct ScriptedTransport {
        calls: Mutex<Vec<Vec<Request>>>,
        failures: Mutex<VecDeque<TransportFailure>>,
    }

    impl ScriptedTransport {
        fn failing_with(failures: Vec<TransportFailure>) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                failures: Mutex::new(failures.into()),
            }
        }

        fn calls(&self) -> Vec<Vec<Request>> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl Transport for ScriptedTransport {
        fn batch_update(
            &self,
            spreadsheet_id: &str,
            requests: &[Request],
        ) -> Result<BatchUpdateResponse, TransportFailure> {
            self.calls.lock().unwrap().push(requests.to_vec());
            if let Some(failure) = self.failures.lock().unwrap().pop_front() {
                return Err(failure);
            }
            Ok(BatchUpdateResponse {
                spreadsheet_id: spreadsheet_id.to_string(),
                replies: vec![serde_json::json!({}); requests.len()],
            })
        }
    }

    fn value(cell: &str, n: f64) -> Request {
        Request::set_value(parse_grid_range(0, cell).unwrap(), ExtendedValue::Number(n))
    }

    fn executor(transport: &ScriptedTransport) -> BatchExecutor<&ScriptedTransport> {
        BatchExecutor::new("sheet-1", transport).with_sleeper(|_: Duration| {})
    }

    #[test]
    fn test_submit_without_batch_executes_immediately() {
        let transport = ScriptedTransport::default();
        let mut exec = executor(&transport);

        let response = exec.submit(value("A1", 1.0)).unwrap().unwrap();
        assert_eq!(response.spreadsheet_id, "sheet-1");
        assert_eq!(response.replies.len(), 1);
        assert_eq!(transport.calls(), vec![vec![value("A1", 1.0)]]);
    }

    #[test]
    fn test_submit_while_batching_makes_no_call() {
        let transport = ScriptedTransport::default();
        let mut exec = executor(&transport);

        exec.start_batch();
        assert_eq!(exec.submit(value("A1", 1.0)).unwrap(), None);
        assert_eq!(exec.submit(value("A2", 2.0)).unwrap(), None);

        assert!(transport.calls().is_empty());
        assert_eq!(exec.pending().len(), 2);
    }

    #[test]
    fn test_flush_sends_one_transaction_in_order() {
        let transport = ScriptedTransport::default();
        let mut exec = executor(&transport);
        let merge = Request::MergeCells {
            range: parse_grid_range(0, "A1:B2").unwrap(),
            merge_type: MergeType::MergeAll,
        };

        exec.start_batch();
        exec.submit(value("A1", 1.0)).unwrap();
        exec.submit(merge.clone()).unwrap();
        exec.submit(value("C3", 3.0)).unwrap();

        let response = exec.flush().unwrap().unwrap();
        assert_eq!(response.replies.len(), 3);
        assert_eq!(
            transport.calls(),
            vec![vec![value("A1", 1.0), merge, value("C3", 3.0)]]
        );
        assert!(!exec.is_batching());
        assert_eq!(exec.state(), &BatchState::NotBatching);
    }

    #[test]
    fn test_flush_without_queue_is_noop() {
        let transport = ScriptedTransport::default();
        let mut exec = executor(&transport);

        assert_eq!(exec.flush().unwrap(), None);

        exec.start_batch();
        assert_eq!(exec.flush().unwrap(), None);
        assert!(transport.calls().is_empty());
    }

    #[test]
    fn test_start_batch_is_idempotent() {
        let transport = ScriptedTransport::default();
        let mut exec = executor(&transport);

        exec.start_batch();
        exec.submit(value("A1", 1.0)).unwrap();
        exec.start_batch();

        assert_eq!(exec.pending(), &[value("A1", 1.0)]);
    }

    #[test]
    fn test_clear_batch_discards_and_restores_immediate_mode() {
        let transport = ScriptedTransport::default();
        let mut exec = executor(&transport);

        exec.start_batch();
        exec.submit(value("A1", 1.0)).unwrap();
        exec.clear_batch();

        assert!(!exec.is_batching());
        assert!(exec.pending().is_empty());
        assert_eq!(exec.flush().unwrap(), None);

        exec.submit(value("B1", 2.0)).unwrap();
        assert_eq!(transport.calls(), vec![vec![value("B1", 2.0)]]);
    }

    #[test]
    fn test_failed_flush_still_clears_queue() {
        let transport =
            ScriptedTransport::failing_with(vec![TransportFailure::status(400, "bad range")]);
        let mut exec = executor(&transport);

        exec.start_batch();
        exec.submit(value("A1", 1.0)).unwrap();
        let err = exec.flush().unwrap_err();

        assert_eq!(
            err,
            BatchError::Remote {
                status: 400,
                message: "bad range".to_string()
            }
        );
        assert!(!exec.is_batching());
        assert!(exec.pending().is_empty());
    }

    #[test]
    fn test_rate_limited_flush_is_retried_with_same_requests() {
        let transport = ScriptedTransport::failing_with(vec![
            TransportFailure::status(429, "quota"),
            TransportFailure::status(429, "quota"),
        ]);
        let slept = Arc::new(Mutex::new(Vec::new()));
        let recorder = Arc::clone(&slept);
        let mut exec = BatchExecutor::new("sheet-1", &transport)
            .with_sleeper(move |d: Duration| recorder.lock().unwrap().push(d));

        exec.start_batch();
        exec.submit(value("A1", 1.0)).unwrap();
        exec.submit(value("A2", 2.0)).unwrap();
        exec.flush().unwrap();

        let calls = transport.calls();
        assert_eq!(calls.len(), 3);
        assert!(calls.iter().all(|c| c == &calls[0]));

        let slept = slept.lock().unwrap();
        assert_eq!(slept.len(), 2);
        assert!(slept[0] >= Duration::from_secs(2) && slept[0] < Duration::from_secs(3));
        assert!(slept[1] >= Duration::from_secs(4) && slept[1] < Duration::from_secs(5));
    }

    #[test]
    fn test_network_failure_is_not_retried() {
        let transport =
            ScriptedTransport::failing_with(vec![TransportFailure::Network("reset".into())]);
        let mut exec = executor(&transport);

        let err = exec.submit(value("A1", 1.0)).unwrap_err();
        assert_eq!(err, BatchError::Transport("reset".to_string()));
        assert_eq!(transport.calls().len(), 1);
    }

    #[test]
    fn test_submit_all_shares_one_transaction() {
        let transport = ScriptedTransport::default();
        let mut exec = executor(&transport);

        exec.submit_all(vec![value("A1", 1.0), value("A2", 2.0)]).unwrap();
        assert_eq!(transport.calls().len(), 1);

        assert_eq!(exec.submit_all(Vec::new()).unwrap(), None);
        assert_eq!(transport.calls().len(), 1);
    }
}
