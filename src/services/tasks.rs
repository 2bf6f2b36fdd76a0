use super::{require_id, require_text};
use crate::backend::{Query, SupabaseClient};
use crate::constants::TASKS_TABLE;
use crate::error::{AppError, AppResult};
use crate::models::Task;

pub struct TaskService;

impl TaskService {
    /// Tasks owned by a user, soonest due first.
    pub async fn list_tasks(client: &SupabaseClient, user_id: &str) -> AppResult<Vec<Task>> {
        client
            .select(
                TASKS_TABLE,
                &Query::new().eq("user_id", user_id).order("due_date", true),
            )
            .await
    }

    pub async fn list_group_tasks(client: &SupabaseClient, group_id: &str) -> AppResult<Vec<Task>> {
        client
            .select(
                TASKS_TABLE,
                &Query::new().eq("group_id", group_id).order("due_date", true),
            )
            .await
    }

    pub async fn create_task(client: &SupabaseClient, task: &Task) -> AppResult<Task> {
        require_text(task.title.as_deref(), "Task title")?;
        require_id(task.user_id.as_deref(), "Task owner")?;

        let mut row = task.clone();
        row.id = None;
        row.created_at = None;
        if row.is_completed.is_none() {
            row.is_completed = Some(false);
        }
        let created = client.insert(TASKS_TABLE, &row).await?;
        log::info!("Created task {:?}", created.id);
        Ok(created)
    }

    pub async fn update_task(client: &SupabaseClient, task: &Task) -> AppResult<Task> {
        let id = require_id(task.id.as_deref(), "Task")?;
        require_text(task.title.as_deref(), "Task title")?;

        let mut patch = task.clone();
        patch.id = None;
        patch.created_at = None;
        let rows: Vec<Task> = client
            .update(TASKS_TABLE, &Query::new().eq("id", id), &patch)
            .await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound(format!("Task {}", id)))
    }

    pub async fn set_task_completed(
        client: &SupabaseClient,
        task_id: &str,
        completed: bool,
    ) -> AppResult<Task> {
        let rows: Vec<Task> = client
            .update(
                TASKS_TABLE,
                &Query::new().eq("id", task_id),
                &serde_json::json!({ "is_completed": completed }),
            )
            .await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound(format!("Task {}", task_id)))
    }

    pub async fn delete_task(client: &SupabaseClient, task_id: &str) -> AppResult<()> {
        client.delete(TASKS_TABLE, &Query::new().eq("id", task_id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::test_support::client_for;
    use httpmock::prelude::*;
    use httpmock::Method::PATCH;
    use serde_json::json;

    #[tokio::test]
    async fn test_create_task_validates_input() {
        let server = MockServer::start_async().await;
        let client = client_for(&server);

        let untitled = Task {
            user_id: Some("u1".to_string()),
            title: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            TaskService::create_task(&client, &untitled).await,
            Err(AppError::InvalidInput(_))
        ));

        let ownerless = Task {
            title: Some("Essay".to_string()),
            ..Default::default()
        };
        assert!(TaskService::create_task(&client, &ownerless).await.is_err());
    }

    #[tokio::test]
    async fn test_create_task_defaults_completion() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/rest/v1/tasks").json_body(json!({
                    "user_id": "u1",
                    "title": "Essay",
                    "is_completed": false
                }));
                then.status(201).json_body(json!([{
                    "id": "t1", "user_id": "u1", "title": "Essay", "is_completed": false
                }]));
            })
            .await;

        let client = client_for(&server);
        let task = Task {
            id: Some("client-side-id".to_string()),
            user_id: Some("u1".to_string()),
            title: Some("Essay".to_string()),
            ..Default::default()
        };
        let created = TaskService::create_task(&client, &task).await.unwrap();
        mock.assert_async().await;
        assert_eq!(created.id.as_deref(), Some("t1"));
    }

    #[tokio::test]
    async fn test_set_task_completed() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(PATCH)
                    .path("/rest/v1/tasks")
                    .query_param("id", "eq.t1")
                    .json_body(json!({ "is_completed": true }));
                then.status(200).json_body(json!([{ "id": "t1", "is_completed": true }]));
            })
            .await;

        let client = client_for(&server);
        let task = TaskService::set_task_completed(&client, "t1", true).await.unwrap();
        mock.assert_async().await;
        assert!(task.completed());
    }

    #[tokio::test]
    async fn test_update_missing_task() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(PATCH).path("/rest/v1/tasks");
                then.status(200).json_body(json!([]));
            })
            .await;

        let client = client_for(&server);
        let task = Task {
            id: Some("gone".to_string()),
            title: Some("Essay".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            TaskService::update_task(&client, &task).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_tasks_for_user() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/rest/v1/tasks")
                    .query_param("user_id", "eq.u1")
                    .query_param("order", "due_date.asc");
                then.status(200).json_body(json!([{ "id": "t1" }, { "id": "t2" }]));
            })
            .await;

        let client = client_for(&server);
        let tasks = TaskService::list_tasks(&client, "u1").await.unwrap();
        mock.assert_async().await;
        assert_eq!(tasks.len(), 2);
    }
}
