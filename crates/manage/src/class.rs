//! Video category (class) management.

use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use vodsdk_protocol::{Action, VodError};
use vodsdk_transport::{Call, Dispatcher};

const CLASS_ID: &str = "classId";
const CLASS_NAME: &str = "className";
const PARENT_ID: &str = "parentId";

/// Layout of `create_time` and `update_time`.
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One category as reported by `DescribeAllClass`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassInfo {
    pub id: i64,
    #[serde(default)]
    pub parent_id: i64,
    pub name: String,
    #[serde(default)]
    pub level: i64,
    #[serde(default, rename = "file_num")]
    pub file_count: i64,
}

/// A category with its subcategories, in server order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassNode {
    pub info: ClassInfo,
    #[serde(default, rename = "subclass")]
    pub children: Vec<ClassNode>,
}

impl ClassNode {
    pub fn child(&self, name: &str) -> Option<&ClassNode> {
        self.children.iter().find(|c| c.info.name == name)
    }
}

/// The full category hierarchy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassTree {
    pub roots: Vec<ClassNode>,
}

impl ClassTree {
    /// Top-level category named `name`.
    pub fn get(&self, name: &str) -> Option<&ClassNode> {
        self.roots.iter().find(|c| c.info.name == name)
    }

    /// Follows `path` by name from the top level, e.g. `["sports", "football"]`.
    pub fn find_path<S: AsRef<str>>(&self, path: &[S]) -> Option<&ClassNode> {
        let (first, rest) = path.split_first()?;
        rest.iter()
            .try_fold(self.get(first.as_ref())?, |node, name| node.child(name.as_ref()))
    }

    /// Depth-first search for a category id.
    pub fn find_id(&self, id: i64) -> Option<&ClassNode> {
        fn walk(nodes: &[ClassNode], id: i64) -> Option<&ClassNode> {
            nodes
                .iter()
                .find_map(|n| (n.info.id == id).then_some(n).or_else(|| walk(&n.children, id)))
        }
        walk(&self.roots, id)
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

/// One entry of the flat category list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSummary {
    pub id: i64,
    pub name: String,
    #[serde(with = "standard_time")]
    pub create_time: NaiveDateTime,
    #[serde(with = "standard_time")]
    pub update_time: NaiveDateTime,
}

mod standard_time {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer, de};

    use super::TIME_FORMAT;

    pub fn serialize<S: Serializer>(t: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&t.format(TIME_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveDateTime::parse_from_str(&raw, TIME_FORMAT)
            .map_err(|e| de::Error::custom(format!("bad time {raw:?}: {e}")))
    }
}

#[derive(Deserialize)]
struct DataList<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewClass {
    new_class_id: i64,
}

/// Category operations.
pub struct ClassManager {
    dispatcher: Arc<Dispatcher>,
}

impl ClassManager {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }

    /// Creates a category, under `parent_id` when given, and returns its id.
    pub async fn create_class(&self, name: &str, parent_id: Option<i64>) -> Result<i64, VodError> {
        require_name(name)?;
        let call = Call::api(Action::CreateClass)
            .param(CLASS_NAME, name)
            .param_opt(PARENT_ID, parent_id);
        let created: NewClass = self.dispatcher.call_checked(&call).await?.into_body()?;
        info!(name, id = created.new_class_id, "class created");
        Ok(created.new_class_id)
    }

    pub async fn describe_all_class(&self) -> Result<ClassTree, VodError> {
        let reply = self
            .dispatcher
            .call_checked(&Call::api(Action::DescribeAllClass))
            .await?;
        let list: DataList<ClassNode> = reply.into_body()?;
        debug!(roots = list.data.len(), "class tree loaded");
        Ok(ClassTree { roots: list.data })
    }

    pub async fn describe_class(&self) -> Result<Vec<ClassSummary>, VodError> {
        let reply = self
            .dispatcher
            .call_checked(&Call::api(Action::DescribeClass))
            .await?;
        let list: DataList<ClassSummary> = reply.into_body()?;
        Ok(list.data)
    }

    pub async fn modify_class(&self, id: i64, new_name: &str) -> Result<(), VodError> {
        require_name(new_name)?;
        let call = Call::api(Action::ModifyClass)
            .param(CLASS_ID, id)
            .param(CLASS_NAME, new_name);
        self.dispatcher.call_checked(&call).await?;
        info!(id, new_name, "class renamed");
        Ok(())
    }

    pub async fn delete_class(&self, id: i64) -> Result<(), VodError> {
        let call = Call::api(Action::DeleteClass).param(CLASS_ID, id);
        self.dispatcher.call_checked(&call).await?;
        info!(id, "class deleted");
        Ok(())
    }
}

fn require_name(name: &str) -> Result<(), VodError> {
    if name.trim().is_empty() {
        return Err(VodError::param("class name is blank"));
    }
    Ok(())
}
