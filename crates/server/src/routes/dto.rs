use db::{
    ConnectionTrait, DbErr,
    models::{
        activity::Activity,
        notice::Notice,
        task::{SubTask, Task},
        user::User,
    },
};
use serde::Serialize;
use uuid::Uuid;

// Wire views keep the legacy client shape: camelCase keys and the
// identifier duplicated under both `_id` and `id`.

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUserView {
    #[serde(rename = "_id")]
    pub _id: Uuid,
    pub id: Uuid,
    pub name: String,
    pub title: String,
    pub role: String,
    pub email: String,
    pub is_active: bool,
    pub is_admin: bool,
}

impl From<&User> for AuthUserView {
    fn from(user: &User) -> Self {
        Self {
            _id: user.id,
            id: user.id,
            name: user.name.clone(),
            title: user.title.clone(),
            role: user.role.clone(),
            email: user.email.clone(),
            is_active: user.is_active,
            is_admin: user.is_admin,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMemberView {
    #[serde(rename = "_id")]
    pub _id: Uuid,
    pub id: Uuid,
    pub name: String,
    pub title: String,
    pub role: String,
    pub email: String,
    pub is_active: bool,
}

impl From<&User> for TeamMemberView {
    fn from(user: &User) -> Self {
        Self {
            _id: user.id,
            id: user.id,
            name: user.name.clone(),
            title: user.title.clone(),
            role: user.role.clone(),
            email: user.email.clone(),
            is_active: user.is_active,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ActivityView {
    #[serde(rename = "_id")]
    pub _id: Uuid,
    pub id: Uuid,
    #[serde(rename = "type")]
    pub activity_type: String,
    pub activity: String,
    pub by: String,
    pub date: String,
}

impl From<&Activity> for ActivityView {
    fn from(activity: &Activity) -> Self {
        Self {
            _id: activity.id,
            id: activity.id,
            activity_type: activity.activity_type.to_string(),
            activity: activity.body.clone(),
            by: activity.by.clone(),
            date: activity.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskView {
    #[serde(rename = "_id")]
    pub _id: Uuid,
    pub id: Uuid,
    pub title: String,
    pub date: String,
    pub priority: String,
    pub stage: String,
    pub is_trashed: bool,
    pub sub_tasks: Vec<SubTask>,
    pub assets: Vec<String>,
    pub team: Vec<TeamMemberView>,
    pub activities: Vec<ActivityView>,
}

impl TaskView {
    pub async fn load<C: ConnectionTrait>(db: &C, task: &Task) -> Result<Self, DbErr> {
        let team = Task::team(db, task.id).await?;
        let activities = Activity::for_task(db, task.id).await?;
        Ok(Self {
            _id: task.id,
            id: task.id,
            title: task.title.clone(),
            date: task.date.format("%Y-%m-%d").to_string(),
            priority: task.priority.to_string(),
            stage: task.stage.to_string(),
            is_trashed: task.is_trashed,
            sub_tasks: task.sub_tasks.clone(),
            assets: task.assets.clone(),
            team: team.iter().map(TeamMemberView::from).collect(),
            activities: activities.iter().map(ActivityView::from).collect(),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoticeTaskView {
    #[serde(rename = "_id")]
    pub _id: Uuid,
    pub id: Uuid,
    pub title: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoticeView {
    #[serde(rename = "_id")]
    pub _id: Uuid,
    pub id: Uuid,
    pub text: String,
    pub noti_type: String,
    pub task: NoticeTaskView,
    pub created_at: String,
}

impl NoticeView {
    pub async fn load<C: ConnectionTrait>(db: &C, notice: &Notice) -> Result<Self, DbErr> {
        let task = Task::find_by_id(db, notice.task_id)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound("Task not found".to_string()))?;
        Ok(Self {
            _id: notice.id,
            id: notice.id,
            text: notice.text.clone(),
            noti_type: notice.noti_type.to_string(),
            task: NoticeTaskView {
                _id: task.id,
                id: task.id,
                title: task.title,
            },
            created_at: notice.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        })
    }
}
