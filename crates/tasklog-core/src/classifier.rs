use crate::ports::TaskKindClassifier;
use std::collections::HashSet;

/// Closed set of task types the master executes in-process.
#[derive(Debug, Clone)]
pub struct LogicTaskTypes {
    types: HashSet<String>,
}

impl LogicTaskTypes {
    pub fn new<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            types: types
                .into_iter()
                .map(|t| t.as_ref().trim().to_ascii_uppercase())
                .collect(),
        }
    }
}

impl TaskKindClassifier for LogicTaskTypes {
    fn is_logic_task(&self, task_type: &str) -> bool {
        self.types.contains(&task_type.trim().to_ascii_uppercase())
    }
}
