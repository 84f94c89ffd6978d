use crate::error::LogError;
use crate::ports::{AccessControl, TaskDefinitionStore, TaskInstanceStore};
use crate::task::{
    Capability, Project, TaskDefinitionRef, TaskInstanceId, TaskInstanceRef, User,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Capabilities one user holds on one project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grant {
    pub user: String,
    pub project_code: i64,
    pub capabilities: Vec<Capability>,
}

/// Read-only snapshot of the orchestration store, loaded from YAML.
/// Backs the lookup and permission collaborators for the CLI and tests.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub task_definitions: Vec<TaskDefinitionRef>,
    #[serde(default)]
    pub task_instances: Vec<TaskInstanceRef>,
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub grants: Vec<Grant>,
}

impl Catalog {
    pub fn load_from(path: &Path) -> Result<Self, LogError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&contents)?)
    }

    pub fn user(&self, name: &str) -> Option<&User> {
        self.users.iter().find(|u| u.name == name)
    }

    pub fn project(&self, code: i64) -> Option<&Project> {
        self.projects.iter().find(|p| p.code == code)
    }

    fn task_instance(&self, id: TaskInstanceId) -> Option<&TaskInstanceRef> {
        self.task_instances.iter().find(|t| t.id == id)
    }

    fn task_definition(&self, code: i64) -> Option<&TaskDefinitionRef> {
        self.task_definitions.iter().find(|d| d.code == code)
    }

    fn holds(&self, user: &User, project_code: i64, capability: Capability) -> bool {
        user.admin
            || self.grants.iter().any(|g| {
                g.user == user.name
                    && g.project_code == project_code
                    && g.capabilities.contains(&capability)
            })
    }
}

#[async_trait::async_trait]
impl AccessControl for Catalog {
    async fn authorize(
        &self,
        user: &User,
        project: &Project,
        capability: Capability,
    ) -> Result<(), LogError> {
        self.authorize_code(user, project.code, capability).await
    }

    async fn authorize_code(
        &self,
        user: &User,
        project_code: i64,
        capability: Capability,
    ) -> Result<(), LogError> {
        if self.project(project_code).is_none() {
            return Err(LogError::ProjectNotFound(project_code));
        }
        if self.holds(user, project_code, capability) {
            Ok(())
        } else {
            Err(LogError::Unauthorized {
                user: user.name.clone(),
                project_code,
                capability,
            })
        }
    }
}

#[async_trait::async_trait]
impl TaskInstanceStore for Catalog {
    async fn query_by_id(&self, id: TaskInstanceId) -> Result<Option<TaskInstanceRef>, LogError> {
        Ok(self.task_instance(id).cloned())
    }

    async fn query_project_by_task_instance_id(
        &self,
        id: TaskInstanceId,
    ) -> Result<Option<Project>, LogError> {
        Ok(self
            .task_instance(id)
            .and_then(|t| self.task_definition(t.task_code))
            .and_then(|d| self.project(d.project_code))
            .cloned())
    }
}

#[async_trait::async_trait]
impl TaskDefinitionStore for Catalog {
    async fn query_by_code(&self, task_code: i64) -> Result<Option<TaskDefinitionRef>, LogError> {
        Ok(self.task_definition(task_code).cloned())
    }
}
