use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct ProjectsQuery {
    pub client_id: Option<i32>,
}
