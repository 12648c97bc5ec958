use tokio::task::JoinHandle;

#[derive(Default)]
pub struct BackgroundTasks {
    pub poller: Option<JoinHandle<()>>,
    pub engine: Option<JoinHandle<()>>,
}

impl BackgroundTasks {
    pub fn abort_all(&mut self) {
        if let Some(handle) = self.poller.take() {
            handle.abort();
        }
        if let Some(handle) = self.engine.take() {
            handle.abort();
        }
    }
}
