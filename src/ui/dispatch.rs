use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::api::{ApiError, TeacherClient};
use crate::models::{ExportFormat, FilterCriteria, Teacher, TeacherStatistics};

/// Work a screen asks the client to perform.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Request {
    LoadTeachers,
    LoadTeacher(i64),
    Create(Teacher),
    Update(i64, Teacher),
    Delete(i64),
    Search(String),
    Filter(FilterCriteria),
    LoadStatistics,
    Export(ExportFormat),
}

impl Request {
    /// Mutations are never aborted once sent.
    pub(crate) fn is_mutation(&self) -> bool {
        matches!(
            self,
            Request::Create(_) | Request::Update(..) | Request::Delete(_)
        )
    }
}

/// Successful payload of a request.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Response {
    Teachers(Vec<Teacher>),
    Teacher(Teacher),
    Created(Teacher),
    Updated(Teacher),
    Deleted(i64),
    SearchResults(Vec<Teacher>),
    FilterResults(Vec<Teacher>),
    Statistics(TeacherStatistics),
    Exported(ExportFormat, Vec<u8>),
}

/// Outcome of a request, tagged with the request that produced it so screens
/// can word their failure notices.
#[derive(Debug)]
pub(crate) struct Completion {
    pub(crate) generation: u64,
    pub(crate) request: Request,
    pub(crate) result: Result<Response, ApiError>,
}

pub(crate) async fn execute(client: &TeacherClient, request: &Request) -> Result<Response, ApiError> {
    match request {
        Request::LoadTeachers => client.list_all().await.map(Response::Teachers),
        Request::LoadTeacher(id) => client.get(*id).await.map(Response::Teacher),
        Request::Create(teacher) => client.create(teacher).await.map(Response::Created),
        Request::Update(id, teacher) => client.update(*id, teacher).await.map(Response::Updated),
        Request::Delete(id) => client.delete(*id).await.map(|_| Response::Deleted(*id)),
        Request::Search(query) => client.search(query).await.map(Response::SearchResults),
        Request::Filter(criteria) => client.filter(criteria).await.map(Response::FilterResults),
        Request::LoadStatistics => client.statistics().await.map(Response::Statistics),
        Request::Export(format) => client
            .export(*format)
            .await
            .map(|bytes| Response::Exported(*format, bytes)),
    }
}

/// Runs requests on the tokio runtime and hands completions back to the
/// synchronous UI loop. Each request carries the generation of the screen
/// that issued it; [`Dispatcher::teardown`] starts a new generation, aborts
/// outstanding reads and makes every older completion stale.
pub(crate) struct Dispatcher {
    client: Arc<TeacherClient>,
    handle: Handle,
    tx: UnboundedSender<Completion>,
    rx: UnboundedReceiver<Completion>,
    generation: u64,
    in_flight: Vec<(bool, JoinHandle<()>)>,
}

impl Dispatcher {
    pub(crate) fn new(client: Arc<TeacherClient>, handle: Handle) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            client,
            handle,
            tx,
            rx,
            generation: 0,
            in_flight: Vec::new(),
        }
    }

    pub(crate) fn client(&self) -> &TeacherClient {
        &self.client
    }

    pub(crate) fn dispatch(&mut self, request: Request) {
        self.in_flight.retain(|(_, task)| !task.is_finished());
        let client = Arc::clone(&self.client);
        let tx = self.tx.clone();
        let generation = self.generation;
        let mutation = request.is_mutation();
        let task = self.handle.spawn(async move {
            let result = execute(&client, &request).await;
            let _ = tx.send(Completion {
                generation,
                request,
                result,
            });
        });
        self.in_flight.push((mutation, task));
    }

    /// Release everything the current screen started.
    pub(crate) fn teardown(&mut self) {
        self.generation += 1;
        for (mutation, task) in self.in_flight.drain(..) {
            if !mutation {
                task.abort();
            }
        }
    }

    /// Number of requests that have not completed yet.
    pub(crate) fn pending(&self) -> usize {
        self.in_flight
            .iter()
            .filter(|(_, task)| !task.is_finished())
            .count()
    }

    /// A completion is current until the next teardown.
    pub(crate) fn is_current(&self, completion: &Completion) -> bool {
        completion.generation == self.generation
    }

    /// Collect completions for the current generation without blocking.
    pub(crate) fn drain(&mut self) -> Vec<Completion> {
        let mut ready = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(completion) if self.is_current(&completion) => ready.push(completion),
                Ok(stale) => {
                    debug!(
                        generation = stale.generation,
                        request = ?stale.request,
                        "discarding completion from a closed screen"
                    );
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    warn!("dispatcher channel closed");
                    break;
                }
            }
        }
        ready
    }
}
