//! Pipeline configuration.

/// Default number of metric workers when none is configured.
pub const DEFAULT_WORKERS: usize = 5;

/// Default bound on the work queue. Also caps the number of file handles
/// in flight between the walker and the pool.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// Configuration for the file-discovery-and-metrics pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    jobs: usize,
    queue_capacity: usize,
    extensions: Vec<String>,
    exclude_patterns: Vec<String>,
    git_ignore: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            jobs: DEFAULT_WORKERS,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            extensions: vec!["rs".to_string()],
            exclude_patterns: vec![],
            git_ignore: true,
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of worker threads. Zero selects the logical CPU count.
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity.max(1);
        self
    }

    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions;
        self
    }

    pub fn with_exclude_patterns(mut self, patterns: Vec<String>) -> Self {
        self.exclude_patterns = patterns;
        self
    }

    /// Whether discovery respects `.gitignore` files inside git repos.
    pub fn with_git_ignore(mut self, enabled: bool) -> Self {
        self.git_ignore = enabled;
        self
    }

    pub fn jobs(&self) -> usize {
        if self.jobs == 0 {
            num_cpus::get()
        } else {
            self.jobs
        }
    }

    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    pub fn exclude_patterns(&self) -> &[String] {
        &self.exclude_patterns
    }

    pub fn git_ignore(&self) -> bool {
        self.git_ignore
    }
}
