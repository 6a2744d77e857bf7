use super::core::Runner;
use super::pump::core::DEFAULT_QUEUE_CAPACITY;

/// Builder for configuring a [`Runner`].
///
/// # Examples
///
/// ```rust,ignore
/// let runner = Builder::new()
///     .name("ui")
///     .queue_capacity(64)
///     .build();
///
/// let answer = runner.run_sync_with_result(|| async { Ok::<_, syncpump::Error>(42) })?;
/// ```
#[derive(Debug, Clone)]
pub struct Builder {
    /// Label attached to the tracing span of every run.
    name: Option<String>,

    /// Initial capacity of each pump's work queue.
    queue_capacity: usize,
}

impl Builder {
    /// Creates a builder with the default configuration: no name and a
    /// queue pre-sized for a few dozen items.
    pub fn new() -> Self {
        Self {
            name: None,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }

    /// Sets the name recorded on the tracing span of each run.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the initial capacity of the work queue.
    ///
    /// The queue still grows past this value when needed.
    ///
    /// # Panics
    ///
    /// Panics if `n == 0`.
    pub fn queue_capacity(mut self, n: usize) -> Self {
        assert!(n > 0, "queue_capacity must be > 0");

        self.queue_capacity = n;
        self
    }

    /// Builds the runner.
    pub fn build(self) -> Runner {
        Runner::new(self.name, self.queue_capacity)
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}
