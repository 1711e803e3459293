//! In-memory printer for unit tests

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use comanda_printer::{PrintError, PrintResult, Printer};

/// Records every job; queued failures are returned before recording
#[derive(Debug, Default)]
pub struct RecordingPrinter {
    jobs: Mutex<Vec<Vec<u8>>>,
    failures: Mutex<VecDeque<PrintError>>,
}

impl RecordingPrinter {
    pub fn fail_next(&self, err: PrintError) {
        self.failures.lock().unwrap().push_back(err);
    }

    pub fn jobs(&self) -> Vec<Vec<u8>> {
        self.jobs.lock().unwrap().clone()
    }

    pub fn job_count(&self) -> usize {
        self.jobs.lock().unwrap().len()
    }
}

#[async_trait]
impl Printer for RecordingPrinter {
    async fn print(&self, data: &[u8]) -> PrintResult<()> {
        if let Some(err) = self.failures.lock().unwrap().pop_front() {
            return Err(err);
        }
        self.jobs.lock().unwrap().push(data.to_vec());
        Ok(())
    }

    async fn is_online(&self) -> bool {
        true
    }

    fn destination(&self) -> String {
        "recording:test".to_string()
    }
}
