//! Task registry for creating tasks by name

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use flight_task_core::{Result, Task, TaskConfig, TaskError};

use crate::HeadingTask;

type TaskConstructor = Box<dyn Fn(TaskConfig) -> Result<Box<dyn Task>> + Send + Sync>;

lazy_static::lazy_static! {
    static ref REGISTRY: Arc<Mutex<TaskRegistry>> = Arc::new(Mutex::new(TaskRegistry::with_builtin()));
}

/// Named task constructors
pub struct TaskRegistry {
    tasks: HashMap<String, TaskConstructor>,
}

impl TaskRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self {
            tasks: HashMap::new(),
        }
    }

    /// Create a registry holding the tasks shipped with this crate
    #[must_use]
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(HeadingTask::NAME, |config| {
            Ok(Box::new(HeadingTask::new(config)?) as Box<dyn Task>)
        });
        registry
    }

    /// Register a task
    pub fn register<F>(&mut self, name: impl Into<String>, constructor: F)
    where
        F: Fn(TaskConfig) -> Result<Box<dyn Task>> + Send + Sync + 'static,
    {
        self.tasks.insert(name.into(), Box::new(constructor));
    }

    /// Create a task by name
    pub fn make(&self, name: &str, config: TaskConfig) -> Result<Box<dyn Task>> {
        self.tasks
            .get(name)
            .ok_or_else(|| TaskError::UnknownTask(name.to_string()))
            .and_then(|constructor| constructor(config))
    }

    /// List registered tasks, sorted by name
    #[must_use]
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tasks.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for TaskRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn global() -> Result<MutexGuard<'static, TaskRegistry>> {
    REGISTRY
        .lock()
        .map_err(|_| TaskError::Other(anyhow::anyhow!("task registry lock poisoned")))
}

/// Register a task globally
pub fn register_task<F>(name: impl Into<String>, constructor: F) -> Result<()>
where
    F: Fn(TaskConfig) -> Result<Box<dyn Task>> + Send + Sync + 'static,
{
    global()?.register(name, constructor);
    Ok(())
}

/// Create a task by name
pub fn make_task(name: &str, config: TaskConfig) -> Result<Box<dyn Task>> {
    global()?.make(name, config)
}

/// List all registered tasks
pub fn list_tasks() -> Result<Vec<String>> {
    Ok(global()?.list())
}
