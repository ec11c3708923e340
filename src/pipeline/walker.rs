//! Directory traversal and file discovery.
//!
//! For every matching file the walker opens it, registers it in the
//! aggregator, then hands it to the pool with a blocking send, in that
//! order. Registration before enqueue guarantees no worker ever sees an
//! unregistered file; the blocking send guarantees no file is dropped when
//! the queue is momentarily full.
//!
//! Inside a git repository, files matched by `.gitignore` are excluded
//! from discovery by default and never appear in the report; disable via
//! `PipelineConfig::with_git_ignore(false)` (`--no-ignore` on the CLI).

use crate::config::PipelineConfig;
use crate::core::MetricsAggregator;
use crate::errors::CodequalError;
use crate::pipeline::cancel::CancellationToken;
use crate::pipeline::queue::{WorkItem, WorkSender};
use crossbeam::select;
use ignore::WalkBuilder;
use std::fs::File;
use std::path::{Path, PathBuf};

pub struct Walker {
    root: PathBuf,
    extensions: Vec<String>,
    exclude_patterns: Vec<glob::Pattern>,
    git_ignore: bool,
}

impl Walker {
    pub fn new(root: &Path, config: &PipelineConfig) -> Result<Self, CodequalError> {
        let exclude_patterns = config
            .exclude_patterns()
            .iter()
            .map(|raw| {
                glob::Pattern::new(raw).map_err(|e| {
                    CodequalError::walk(root, format!("invalid exclude pattern `{raw}`: {e}"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            root: root.to_path_buf(),
            extensions: config.extensions().to_vec(),
            exclude_patterns,
            git_ignore: config.git_ignore(),
        })
    }

    /// Traverses the tree, registering and enqueueing every match.
    ///
    /// Consumes the sender so the queue is closed exactly once on return,
    /// on success and on fatal traversal error alike. Returns the number
    /// of files enqueued.
    pub fn run(
        &self,
        aggregator: &MetricsAggregator,
        queue: WorkSender,
        cancel: &CancellationToken,
    ) -> Result<usize, CodequalError> {
        let mut enqueued = 0;
        let walker = WalkBuilder::new(&self.root)
            .hidden(false)
            .git_ignore(self.git_ignore)
            .build();

        for entry in walker {
            let entry = entry
                .map_err(|e| CodequalError::walk(&self.root, e.to_string()))?;
            let path = entry.path();
            if !path.is_file() || !self.should_process(path) {
                continue;
            }
            if cancel.is_cancelled() {
                return Err(CodequalError::Cancelled);
            }

            // Per-file open failure is not fatal to the traversal.
            let file = match File::open(path) {
                Ok(file) => file,
                Err(e) => {
                    log::warn!("skipping {}: {}", path.display(), e);
                    continue;
                }
            };

            let id = self.file_id(path);
            aggregator.register_file(&id);

            let item = WorkItem { id, file };
            select! {
                send(queue, item) -> result => {
                    // Receivers disappear before the sender only when the
                    // run is being torn down by cancellation.
                    if result.is_err() {
                        return Err(CodequalError::Cancelled);
                    }
                }
                recv(cancel.observer()) -> _ => {
                    return Err(CodequalError::Cancelled);
                }
            }
            enqueued += 1;
        }

        Ok(enqueued)
    }

    fn should_process(&self, path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        if !self.extensions.iter().any(|wanted| wanted == ext) {
            return false;
        }

        let path_str = path.to_string_lossy();
        !self
            .exclude_patterns
            .iter()
            .any(|pattern| pattern.matches(&path_str))
    }

    /// Normalized relative identifier: root-relative, forward slashes.
    fn file_id(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        relative.to_string_lossy().replace('\\', "/")
    }
}
