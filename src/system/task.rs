use std::fmt;

use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskState {
    Running,
    Sleeping,
    DiskSleep,
    Stopped,
    Zombie,
    Idle,
    Unknown,
}

impl TaskState {
    /// Map the single-letter state used by `/proc/<pid>/stat`.
    pub fn from_proc_code(code: char) -> Self {
        match code {
            'R' => TaskState::Running,
            'S' => TaskState::Sleeping,
            'D' => TaskState::DiskSleep,
            'T' | 't' => TaskState::Stopped,
            'Z' | 'X' => TaskState::Zombie,
            'I' => TaskState::Idle,
            _ => TaskState::Unknown,
        }
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TaskState::Running => "running",
            TaskState::Sleeping => "sleeping",
            TaskState::DiskSleep => "disk-sleep",
            TaskState::Stopped => "stopped",
            TaskState::Zombie => "zombie",
            TaskState::Idle => "idle",
            TaskState::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TaskInfo {
    pub id: u64,
    pub name: String,
    pub state: TaskState,
}

/// Order tasks by id so rows come out the same way on every run.
pub fn sorted_tasks(mut tasks: Vec<TaskInfo>) -> Vec<TaskInfo> {
    tasks.sort_unstable_by_key(|t| t.id);
    tasks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proc_codes_map_to_states() {
        assert_eq!(TaskState::from_proc_code('R'), TaskState::Running);
        assert_eq!(TaskState::from_proc_code('S'), TaskState::Sleeping);
        assert_eq!(TaskState::from_proc_code('D'), TaskState::DiskSleep);
        assert_eq!(TaskState::from_proc_code('t'), TaskState::Stopped);
        assert_eq!(TaskState::from_proc_code('Z'), TaskState::Zombie);
        assert_eq!(TaskState::from_proc_code('I'), TaskState::Idle);
        assert_eq!(TaskState::from_proc_code('?'), TaskState::Unknown);
    }

    #[test]
    fn display_is_lowercase() {
        assert_eq!(TaskState::DiskSleep.to_string(), "disk-sleep");
        assert_eq!(TaskState::Running.to_string(), "running");
    }

    #[test]
    fn tasks_sort_by_id() {
        let tasks = vec![
            TaskInfo {
                id: 12,
                name: "worker".into(),
                state: TaskState::Sleeping,
            },
            TaskInfo {
                id: 3,
                name: "main".into(),
                state: TaskState::Running,
            },
        ];
        let sorted = sorted_tasks(tasks);
        assert_eq!(sorted[0].id, 3);
        assert_eq!(sorted[1].id, 12);
    }
}
