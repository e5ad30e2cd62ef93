//! Project item lookup and mutation.
//!
//! A "project item" is the association record linking a content node (issue
//! or pull request) to one project board; it has its own ID, distinct from
//! the content node's. Lookup is always fresh — board membership can change
//! between runs — and the add mutation is only issued when lookup found
//! nothing, since the API gives no idempotence guarantee for re-adds.

use serde::Deserialize;
use serde_json::json;

use crate::errors::{GatewayError, SyncError};
use crate::gateway::{Connection, GraphQlGateway, decode};
use crate::workflow;

/// Associations fetched per content node. No pagination beyond this; a node
/// on more than 20 boards is outside this action's scope.
pub const PROJECT_ITEMS_PAGE_SIZE: u32 = 20;

const GET_PROJECT_ITEM_QUERY: &str = r#"
fragment projectItemData on ProjectV2Item {
  id
  project {
    id
    title
  }
  fieldValueByName(name: "Status") {
    ... on ProjectV2ItemFieldSingleSelectValue {
      name
    }
  }
}

query getProjectItem($itemID: ID!, $pageSize: Int!) {
  node(id: $itemID) {
    ... on Issue {
      projectItems(first: $pageSize) {
        nodes {
          ...projectItemData
        }
      }
    }
    ... on PullRequest {
      projectItems(first: $pageSize) {
        nodes {
          ...projectItemData
        }
      }
    }
  }
}
"#;

const ADD_PROJECT_ITEM_MUTATION: &str = r#"
mutation addToProject($projectID: ID!, $itemID: ID!) {
  addProjectV2ItemById(input: {
    projectId: $projectID,
    contentId: $itemID
  }) {
    item {
      id
    }
  }
}
"#;

const UPDATE_ITEM_STATUS_MUTATION: &str = r#"
mutation updateItemStatus($projectID: ID!, $itemID: ID!, $fieldID: ID!, $optionID: String!) {
  updateProjectV2ItemFieldValue(input: {
    projectId: $projectID,
    itemId: $itemID,
    fieldId: $fieldID,
    value: {
      singleSelectOptionId: $optionID
    }
  }) {
    projectV2Item {
      id
    }
  }
}
"#;

/// A project on the remote side, as referenced by its items.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectRef {
    pub id: String,
    pub title: String,
}

/// A content node's existing association with one project.
#[derive(Debug, Clone)]
pub struct ProjectItemEntry {
    pub project_item_id: String,
    pub project: ProjectRef,
    /// Current value of the "Status" field, if one is set.
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NodeResponse {
    #[serde(default)]
    node: Option<ContentNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContentNode {
    // Absent when the node is neither an Issue nor a PullRequest.
    #[serde(default)]
    project_items: Option<Connection<ProjectItemNode>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectItemNode {
    id: String,
    project: ProjectRef,
    // Null when no status is set; the inline fragment also collapses
    // non-single-select values to an empty object.
    #[serde(default)]
    field_value_by_name: Option<StatusValue>,
}

#[derive(Debug, Deserialize)]
struct StatusValue {
    #[serde(default)]
    name: Option<String>,
}

/// Find a content node's association with the given project, if any.
///
/// Scans the node's first 20 project associations for one whose project ID
/// matches. Zero associations and no match are both expected, non-error
/// outcomes: the item simply is not on the board yet.
pub async fn get_project_item(
    gateway: &dyn GraphQlGateway,
    item_id: &str,
    project_id: &str,
) -> Result<Option<ProjectItemEntry>, GatewayError> {
    let data = gateway
        .execute(
            GET_PROJECT_ITEM_QUERY,
            json!({ "itemID": item_id, "pageSize": PROJECT_ITEMS_PAGE_SIZE }),
        )
        .await?;
    let response: NodeResponse = decode(data, "project item query")?;

    let nodes = match response.node.and_then(|node| node.project_items) {
        Some(connection) => connection.nodes,
        None => Vec::new(),
    };
    if nodes.is_empty() {
        workflow::debug(&format!("item {item_id} not associated with any project"));
        return Ok(None);
    }

    let Some(entry) = nodes.into_iter().find(|entry| entry.project.id == project_id) else {
        workflow::debug(&format!("item {item_id} not associated with project {project_id}"));
        return Ok(None);
    };

    let item = ProjectItemEntry {
        project_item_id: entry.id,
        project: entry.project,
        status: entry.field_value_by_name.and_then(|value| value.name),
    };
    workflow::debug(&format!(
        "item {item_id} project item {}, status: {:?}",
        item.project_item_id, item.status
    ));
    Ok(Some(item))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddItemResponse {
    add_project_v2_item_by_id: AddedItem,
}

#[derive(Debug, Deserialize)]
struct AddedItem {
    item: ItemId,
}

#[derive(Debug, Deserialize)]
struct ItemId {
    id: String,
}

/// Add a content node to a project, returning the new project-item ID.
///
/// Callers must have checked via [`get_project_item`] that no association
/// exists; the API may duplicate the item on a re-add.
pub async fn add_project_item(
    gateway: &dyn GraphQlGateway,
    item_id: &str,
    project_id: &str,
) -> Result<String, GatewayError> {
    let data = gateway
        .execute(
            ADD_PROJECT_ITEM_MUTATION,
            json!({ "projectID": project_id, "itemID": item_id }),
        )
        .await?;
    let response: AddItemResponse = decode(data, "add item mutation")?;
    Ok(response.add_project_v2_item_by_id.item.id)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateStatusResponse {
    update_project_v2_item_field_value: UpdatedItem,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdatedItem {
    project_v2_item: ItemId,
}

/// Set a single-select field value on a project item by option ID.
///
/// The mutation echoes the item it touched; anything other than an exact
/// echo of the target means the wrong item was mutated and is fatal.
pub async fn update_item_status(
    gateway: &dyn GraphQlGateway,
    project_id: &str,
    project_item_id: &str,
    field_id: &str,
    option_id: &str,
) -> Result<(), SyncError> {
    let data = gateway
        .execute(
            UPDATE_ITEM_STATUS_MUTATION,
            json!({
                "projectID": project_id,
                "itemID": project_item_id,
                "fieldID": field_id,
                "optionID": option_id,
            }),
        )
        .await?;
    let response: UpdateStatusResponse = decode(data, "status update mutation")?;

    let echoed = response.update_project_v2_item_field_value.project_v2_item.id;
    if echoed != project_item_id {
        return Err(SyncError::StatusUpdateMismatch {
            expected: project_item_id.to_string(),
            actual: echoed,
        });
    }
    Ok(())
}
