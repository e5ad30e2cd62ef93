//! Project orchestration: URL parsing, board discovery, and the
//! add-then-set-status flow.
//!
//! A `Project` binds immutable run configuration (gateway, board
//! coordinates, default statuses) to a cache of remote metadata that
//! `init()` fills exactly once per run. Item operations fail fast until
//! that has happened.

use regex::Regex;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use crate::errors::SyncError;
use crate::gateway::{Connection, GraphQlGateway, decode};
use crate::item;
use crate::workflow;

/// Single-select fields fetched per project. Status boards have a handful;
/// no pagination beyond this.
pub const PROJECT_FIELDS_PAGE_SIZE: u32 = 20;

/// The field holding an item's board column.
const STATUS_FIELD_NAME: &str = "Status";

static PROJECT_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/(?P<kind>orgs|users)/(?P<owner>[^/]+)/projects/(?P<number>\d+)").unwrap()
});

const PROJECT_QUERY: &str = r#"
fragment projectV2Fields on ProjectV2 {
  id
  title
  fields(first: $pageSize) {
    nodes {
      ... on ProjectV2SingleSelectField {
        id
        name
        options {
          id
          name
        }
      }
    }
  }
}

query getProject($owner: String!, $projectNumber: Int!, $isOrg: Boolean!, $pageSize: Int!) {
  organization(login: $owner) @include(if: $isOrg) {
    projectV2(number: $projectNumber) {
      ...projectV2Fields
    }
  }
  user(login: $owner) @skip(if: $isOrg) {
    projectV2(number: $projectNumber) {
      ...projectV2Fields
    }
  }
}
"#;

/// Board coordinates parsed from a project URL. Immutable for the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDescriptor {
    pub owner: String,
    pub number: u32,
    /// `true` for `/orgs/` URLs, `false` for `/users/`. Selects which of
    /// the two mutually exclusive query branches is issued.
    pub is_org: bool,
}

/// Default status names by content kind, as configured by the caller.
#[derive(Debug, Clone)]
pub struct DefaultStatus {
    pub issues: String,
    pub prs: String,
}

/// The project as known to the remote side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectIdentity {
    pub id: String,
    pub title: String,
}

/// One option of a single-select field.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectFieldOption {
    pub id: String,
    pub name: String,
}

/// A single-select field and its options. Option order is the board's;
/// the first option matching a name wins in lookups.
#[derive(Debug, Clone)]
pub struct ProjectField {
    pub id: String,
    pub name: String,
    pub options: Vec<ProjectFieldOption>,
}

/// Parse a project URL into board coordinates.
///
/// Accepts any URL containing `/orgs/<owner>/projects/<number>` or
/// `/users/<owner>/projects/<number>`; anything else is rejected here,
/// before any network call.
pub fn parse_project_url(url: &str) -> Result<ProjectDescriptor, SyncError> {
    let invalid = || SyncError::InvalidUrl {
        url: url.to_string(),
    };
    let captures = PROJECT_URL_REGEX.captures(url).ok_or_else(invalid)?;
    let number: u32 = captures["number"].parse().map_err(|_| invalid())?;
    Ok(ProjectDescriptor {
        owner: captures["owner"].to_string(),
        number,
        is_org: &captures["kind"] == "orgs",
    })
}

#[derive(Debug, Deserialize)]
struct ProjectQueryResponse {
    #[serde(default)]
    organization: Option<ProjectOwner>,
    #[serde(default)]
    user: Option<ProjectOwner>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectOwner {
    #[serde(default)]
    project_v2: Option<ProjectV2Node>,
}

#[derive(Debug, Deserialize)]
struct ProjectV2Node {
    id: String,
    title: String,
    fields: Connection<FieldNode>,
}

#[derive(Debug, Deserialize)]
struct FieldNode {
    // Non-single-select fields come back as empty objects from the inline
    // fragment, so everything is optional here.
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    options: Vec<ProjectFieldOption>,
}

/// Remote metadata cached by a successful `init()`.
#[derive(Debug)]
struct ProjectState {
    identity: ProjectIdentity,
    fields: HashMap<String, ProjectField>,
}

/// Orchestrates one board: discovers its identity and fields, then ensures
/// items are present with an appropriate status.
pub struct Project {
    gateway: Arc<dyn GraphQlGateway>,
    desc: ProjectDescriptor,
    default_status: DefaultStatus,
    state: Option<ProjectState>,
}

impl Project {
    /// Build an uninitialized orchestrator. Fails only on a malformed URL;
    /// nothing touches the network until [`Project::init`].
    pub fn new(
        gateway: Arc<dyn GraphQlGateway>,
        url: &str,
        default_status: DefaultStatus,
    ) -> Result<Self, SyncError> {
        Ok(Self {
            gateway,
            desc: parse_project_url(url)?,
            default_status,
            state: None,
        })
    }

    pub fn descriptor(&self) -> &ProjectDescriptor {
        &self.desc
    }

    /// Resolve the board from its owner and number, caching its ID and
    /// single-select fields for the rest of the run.
    ///
    /// Exactly one of the query's two branches matches `is_org`; that branch
    /// yielding nothing means the project does not exist or the token cannot
    /// see it.
    pub async fn init(&mut self) -> Result<ProjectIdentity, SyncError> {
        workflow::debug(&format!(
            "project init: owner: {}, number: {}, is org: {}",
            self.desc.owner, self.desc.number, self.desc.is_org
        ));

        let data = self
            .gateway
            .execute(
                PROJECT_QUERY,
                json!({
                    "owner": self.desc.owner,
                    "projectNumber": self.desc.number,
                    "isOrg": self.desc.is_org,
                    "pageSize": PROJECT_FIELDS_PAGE_SIZE,
                }),
            )
            .await?;
        let response: ProjectQueryResponse = decode(data, "project query")?;

        let owner = if self.desc.is_org {
            response.organization
        } else {
            response.user
        };
        let project = owner
            .and_then(|owner| owner.project_v2)
            .ok_or_else(|| SyncError::ProjectNotFound {
                owner: self.desc.owner.clone(),
                number: self.desc.number,
            })?;

        let identity = ProjectIdentity {
            id: project.id,
            title: project.title,
        };
        self.state = Some(ProjectState {
            identity: identity.clone(),
            fields: build_field_map(project.fields.nodes),
        });
        Ok(identity)
    }

    /// Ensure a content node is on the board with its default status set.
    ///
    /// Looks up the existing association first and only adds when none was
    /// found — running this twice for the same item must not create
    /// duplicates, as long as the lookup reflects true server state. (Two
    /// concurrent runs can still race between check and act; accepted.)
    /// Returns the project-item ID, freshly added or pre-existing.
    pub async fn add_to_project(
        &self,
        item_id: &str,
        is_pull_request: bool,
    ) -> Result<String, SyncError> {
        let state = self.state.as_ref().ok_or(SyncError::Uninitialized)?;
        let project_id = &state.identity.id;
        workflow::debug(&format!("addToProject item ID {item_id}"));

        let existing = item::get_project_item(self.gateway.as_ref(), item_id, project_id).await?;
        let project_item_id = match existing {
            Some(entry) => {
                workflow::info(&format!(
                    "Item already associated with project '{}'",
                    state.identity.title
                ));
                entry.project_item_id
            }
            None => {
                workflow::info(&format!(
                    "Adding item '{item_id}' to project '{}'",
                    state.identity.title
                ));
                item::add_project_item(self.gateway.as_ref(), item_id, project_id).await?
            }
        };

        let status_name = if is_pull_request {
            &self.default_status.prs
        } else {
            &self.default_status.issues
        };
        let (field_id, option_id) = resolve_status_option(&state.fields, status_name)?;
        item::update_item_status(
            self.gateway.as_ref(),
            project_id,
            &project_item_id,
            &field_id,
            &option_id,
        )
        .await?;
        workflow::info(&format!("Set status to '{status_name}'"));

        Ok(project_item_id)
    }
}

/// Build the field-name map from the query's field nodes.
///
/// Entries without an id (non-single-select fields, partial metadata) are
/// skipped. Duplicate names are a non-fatal upstream anomaly: last write
/// wins.
fn build_field_map(nodes: Vec<FieldNode>) -> HashMap<String, ProjectField> {
    let mut fields = HashMap::new();
    for node in nodes {
        let (Some(id), Some(name)) = (node.id, node.name) else {
            continue;
        };
        fields.insert(
            name.clone(),
            ProjectField {
                id,
                name,
                options: node.options,
            },
        );
    }
    fields
}

/// Resolve a configured status name to the "Status" field ID and the ID of
/// its first option with that name. Missing field or option is a user
/// configuration error, never silently ignored.
fn resolve_status_option(
    fields: &HashMap<String, ProjectField>,
    status_name: &str,
) -> Result<(String, String), SyncError> {
    let unknown = || SyncError::UnknownStatus {
        name: status_name.to_string(),
    };
    let field = fields.get(STATUS_FIELD_NAME).ok_or_else(unknown)?;
    let option = field
        .options
        .iter()
        .find(|option| option.name == status_name)
        .ok_or_else(unknown)?;
    Ok((field.id.clone(), option.id.clone()))
}
