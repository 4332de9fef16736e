//! Built-in portal scenarios
//!
//! The user lifecycle exercises create/read/update/delete against the
//! authenticated user's own record; the work lifecycle exercises the
//! parent/child relationship between a user and their works, including
//! the cascade delete. Both lead with a best-effort reset so a run is
//! idempotent regardless of leftover state.

use chrono::Utc;
use serde_json::{json, Value};

use super::expectation::FieldRule;
use super::runner::{Scenario, SUBJECT_ID_KEY};
use super::step::{CaptureSpec, StepSpec, VerifySpec};

const DELETE_USER: &str = "\
mutation ($id: ID!) {
    deleteUser(id: $id) {
        id
    }
}";

const CREATE_USER: &str = "\
mutation createUser($user: UserCreate!) {
    createUser(user: $user) {
        id
        email
        displayName
        career
        avatarUri
        message
    }
}";

const GET_USER: &str = "\
query ($id: ID!) {
    getUser(id: $id) {
        id
        email
        displayName
        career
        avatarUri
        message
    }
}";

const UPDATE_USER: &str = "\
mutation updateUser($id: ID!, $user: UserUpdate!) {
    updateUser(id: $id, user: $user) {
        id
        email
        displayName
        career
        avatarUri
        message
    }
}";

const GET_USER_WITH_WORKS: &str = "\
query ($id: ID!) {
    getUser(id: $id) {
        id
        email
        displayName
        works {
            items {
                id
                title
                description
            }
            exclusiveStartKey
        }
    }
}";

const CREATE_WORK: &str = "\
mutation createWork($work: WorkCreate!) {
    createWork(work: $work) {
        id
        userId
        title
        description
        createdAt
    }
}";

const GET_WORK: &str = "\
query ($id: ID!) {
    getWork(id: $id) {
        id
        userId
        title
        description
        createdAt
    }
}";

const UPDATE_WORK: &str = "\
mutation updateWork($id: ID!, $work: WorkUpdate!) {
    updateWork(id: $id, work: $work) {
        id
        userId
        title
        description
        createdAt
    }
}";

/// The suite that runs when no scenario file is supplied.
pub fn default_suite() -> Vec<Scenario> {
    vec![user_lifecycle(), work_lifecycle()]
}

/// Entity lifecycle against the caller's own user record:
/// reset → create → read → update → read → delete → read-absent.
pub fn user_lifecycle() -> Scenario {
    let user = user_payload("sample user");
    let updated = updated_user(&user);

    Scenario {
        name: "User Test".to_string(),
        steps: vec![
            reset_step(),
            StepSpec {
                label: "Mutation(createUser)".to_string(),
                query: CREATE_USER.to_string(),
                operation_name: Some("createUser".to_string()),
                variables: json!({ "user": user }),
                captures: vec![],
                verify: VerifySpec::Record {
                    field: "createUser".to_string(),
                    input: vec!["user".to_string()],
                    rules: echo_user(),
                },
                detail: Some(vec!["createUser".to_string(), "id".to_string()]),
            },
            StepSpec {
                label: "Query(getUser)".to_string(),
                query: GET_USER.to_string(),
                operation_name: None,
                variables: json!({ "id": { "$ctx": SUBJECT_ID_KEY } }),
                captures: vec![],
                verify: VerifySpec::Record {
                    field: "getUser".to_string(),
                    input: vec![],
                    rules: expect_user(&user),
                },
                detail: Some(vec!["getUser".to_string(), "id".to_string()]),
            },
            StepSpec {
                label: "Mutation(updateUser)".to_string(),
                query: UPDATE_USER.to_string(),
                operation_name: Some("updateUser".to_string()),
                variables: json!({ "id": { "$ctx": SUBJECT_ID_KEY }, "user": updated }),
                captures: vec![],
                verify: VerifySpec::Record {
                    field: "updateUser".to_string(),
                    input: vec!["user".to_string()],
                    rules: echo_user(),
                },
                detail: Some(vec!["updateUser".to_string(), "id".to_string()]),
            },
            StepSpec {
                label: "Query(getUser) after update".to_string(),
                query: GET_USER.to_string(),
                operation_name: None,
                variables: json!({ "id": { "$ctx": SUBJECT_ID_KEY } }),
                captures: vec![],
                verify: VerifySpec::Record {
                    field: "getUser".to_string(),
                    input: vec![],
                    rules: expect_user(&updated),
                },
                detail: Some(vec!["getUser".to_string(), "id".to_string()]),
            },
            delete_user_step(),
            StepSpec {
                label: "Query(getUser) after delete".to_string(),
                query: GET_USER.to_string(),
                operation_name: None,
                variables: json!({ "id": { "$ctx": SUBJECT_ID_KEY } }),
                captures: vec![],
                verify: VerifySpec::Absent {
                    field: "getUser".to_string(),
                },
                detail: None,
            },
        ],
    }
}

/// Parent/child lifecycle: a user and a work referencing it, updated and
/// read through both paths, then cascade-removed with the parent.
pub fn work_lifecycle() -> Scenario {
    let user = user_payload("test user");
    let stamp = timestamp();
    let work = json!({
        "userId": { "$ctx": SUBJECT_ID_KEY },
        "title": "AppSync-test test work",
        "description": format!("AppSync-test work {stamp}"),
    });
    let updated_work = json!({
        "title": "AppSync-test test work (updated)",
        "description": format!("AppSync-test work updated {stamp}"),
    });

    let works_path = vec!["works".to_string(), "items".to_string()];

    Scenario {
        name: "Work Test".to_string(),
        steps: vec![
            reset_step(),
            StepSpec {
                label: "Mutation(createUser)".to_string(),
                query: CREATE_USER.to_string(),
                operation_name: Some("createUser".to_string()),
                variables: json!({ "user": user }),
                captures: vec![],
                verify: VerifySpec::Record {
                    field: "createUser".to_string(),
                    input: vec!["user".to_string()],
                    rules: echo_user(),
                },
                detail: Some(vec!["createUser".to_string(), "id".to_string()]),
            },
            StepSpec {
                label: "Mutation(createWork)".to_string(),
                query: CREATE_WORK.to_string(),
                operation_name: Some("createWork".to_string()),
                variables: json!({ "work": work }),
                captures: vec![
                    CaptureSpec {
                        path: vec!["createWork".to_string(), "id".to_string()],
                        key: "work_id".to_string(),
                    },
                    CaptureSpec {
                        path: vec!["createWork".to_string(), "createdAt".to_string()],
                        key: "work_created_at".to_string(),
                    },
                ],
                verify: VerifySpec::Record {
                    field: "createWork".to_string(),
                    input: vec!["work".to_string()],
                    rules: vec![
                        captured("id", "work_id"),
                        echo("userId"),
                        echo("title"),
                        echo("description"),
                        captured("createdAt", "work_created_at"),
                    ],
                },
                detail: Some(vec!["createWork".to_string(), "id".to_string()]),
            },
            StepSpec {
                label: "Query(getUser) works".to_string(),
                query: GET_USER_WITH_WORKS.to_string(),
                operation_name: None,
                variables: json!({ "id": { "$ctx": SUBJECT_ID_KEY } }),
                captures: vec![],
                verify: VerifySpec::ListContains {
                    field: "getUser".to_string(),
                    path: works_path.clone(),
                    id_key: "work_id".to_string(),
                },
                detail: Some(vec!["getUser".to_string(), "id".to_string()]),
            },
            StepSpec {
                label: "Query(getWork)".to_string(),
                query: GET_WORK.to_string(),
                operation_name: None,
                variables: json!({ "id": { "$ctx": "work_id" } }),
                captures: vec![],
                verify: VerifySpec::Record {
                    field: "getWork".to_string(),
                    input: vec![],
                    rules: vec![
                        captured("id", "work_id"),
                        captured("userId", SUBJECT_ID_KEY),
                        equals("title", work["title"].clone()),
                        equals("description", work["description"].clone()),
                        captured("createdAt", "work_created_at"),
                    ],
                },
                detail: Some(vec!["getWork".to_string(), "id".to_string()]),
            },
            StepSpec {
                label: "Mutation(updateWork)".to_string(),
                query: UPDATE_WORK.to_string(),
                operation_name: Some("updateWork".to_string()),
                variables: json!({ "id": { "$ctx": "work_id" }, "work": updated_work }),
                captures: vec![],
                verify: VerifySpec::Record {
                    field: "updateWork".to_string(),
                    input: vec!["work".to_string()],
                    rules: vec![
                        captured("id", "work_id"),
                        captured("userId", SUBJECT_ID_KEY),
                        echo("title"),
                        echo("description"),
                        captured("createdAt", "work_created_at"),
                    ],
                },
                detail: Some(vec!["updateWork".to_string(), "id".to_string()]),
            },
            StepSpec {
                label: "Query(getWork) after update".to_string(),
                query: GET_WORK.to_string(),
                operation_name: None,
                variables: json!({ "id": { "$ctx": "work_id" } }),
                captures: vec![],
                verify: VerifySpec::Record {
                    field: "getWork".to_string(),
                    input: vec![],
                    rules: vec![
                        captured("id", "work_id"),
                        equals("title", updated_work["title"].clone()),
                        equals("description", updated_work["description"].clone()),
                        captured("createdAt", "work_created_at"),
                    ],
                },
                detail: Some(vec!["getWork".to_string(), "id".to_string()]),
            },
            StepSpec {
                label: "Query(getUser) works again".to_string(),
                query: GET_USER_WITH_WORKS.to_string(),
                operation_name: None,
                variables: json!({ "id": { "$ctx": SUBJECT_ID_KEY } }),
                captures: vec![],
                verify: VerifySpec::ListContains {
                    field: "getUser".to_string(),
                    path: works_path.clone(),
                    id_key: "work_id".to_string(),
                },
                detail: Some(vec!["getUser".to_string(), "id".to_string()]),
            },
            delete_user_step(),
            StepSpec {
                label: "Query(getWork) after cascade".to_string(),
                query: GET_WORK.to_string(),
                operation_name: None,
                variables: json!({ "id": { "$ctx": "work_id" } }),
                captures: vec![],
                verify: VerifySpec::Absent {
                    field: "getWork".to_string(),
                },
                detail: None,
            },
            StepSpec {
                label: "Query(getUser) after cascade".to_string(),
                query: GET_USER_WITH_WORKS.to_string(),
                operation_name: None,
                variables: json!({ "id": { "$ctx": SUBJECT_ID_KEY } }),
                captures: vec![],
                verify: VerifySpec::ListExcludes {
                    field: "getUser".to_string(),
                    path: works_path,
                    id_key: "work_id".to_string(),
                },
                detail: None,
            },
        ],
    }
}

/// Best-effort delete of a possibly pre-existing user; errors ignored so
/// a rerun starts clean.
fn reset_step() -> StepSpec {
    StepSpec {
        label: "Reset(deleteUser)".to_string(),
        query: DELETE_USER.to_string(),
        operation_name: None,
        variables: json!({ "id": { "$ctx": SUBJECT_ID_KEY } }),
        captures: vec![],
        verify: VerifySpec::Ignore,
        detail: Some(vec!["deleteUser".to_string(), "id".to_string()]),
    }
}

fn delete_user_step() -> StepSpec {
    StepSpec {
        label: "Mutation(deleteUser)".to_string(),
        query: DELETE_USER.to_string(),
        operation_name: None,
        variables: json!({ "id": { "$ctx": SUBJECT_ID_KEY } }),
        captures: vec![],
        verify: VerifySpec::Record {
            field: "deleteUser".to_string(),
            input: vec![],
            rules: vec![captured("id", SUBJECT_ID_KEY)],
        },
        detail: Some(vec!["deleteUser".to_string(), "id".to_string()]),
    }
}

fn timestamp() -> String {
    Utc::now().format("%Y-%m-%d %H:%M:%S%.6f").to_string()
}

fn user_payload(tag: &str) -> Value {
    json!({
        "displayName": format!("AppSync-test {tag} {}", timestamp()),
        "email": "AppSync-test@sample.xyz",
        "career": "AppSync-test test_user test",
        "avatarUri": "https://s3-ap-northeast-1.amazonaws.com/is09-portal-image/system/broken-image.png",
        // The server defaults a blank message to a single space.
        "message": "",
    })
}

fn updated_user(user: &Value) -> Value {
    let mut updated = user.clone();
    let name = user["displayName"].as_str().unwrap_or("");
    updated["displayName"] = json!(format!("{name} (updated)"));
    updated["career"] = json!("AppSync-test test_user updated");
    updated
}

/// Echo rules for the full user selection; `id` is the subject id and
/// `message` falls back to the server default for blank input.
fn echo_user() -> Vec<(String, FieldRule)> {
    vec![
        captured("id", SUBJECT_ID_KEY),
        echo("email"),
        echo("displayName"),
        echo("career"),
        echo("avatarUri"),
        echo_or("message", json!(" ")),
    ]
}

/// Literal expectations for a read of a user created from `user`.
fn expect_user(user: &Value) -> Vec<(String, FieldRule)> {
    let message = match user.get("message") {
        Some(Value::String(s)) if s.is_empty() => json!(" "),
        Some(v) => v.clone(),
        None => json!(" "),
    };
    vec![
        captured("id", SUBJECT_ID_KEY),
        equals("email", user["email"].clone()),
        equals("displayName", user["displayName"].clone()),
        equals("career", user["career"].clone()),
        equals("avatarUri", user["avatarUri"].clone()),
        equals("message", message),
    ]
}

fn echo(field: &str) -> (String, FieldRule) {
    (field.to_string(), FieldRule::Echo)
}

fn echo_or(field: &str, default: Value) -> (String, FieldRule) {
    (field.to_string(), FieldRule::EchoOr { default })
}

fn equals(field: &str, value: Value) -> (String, FieldRule) {
    (field.to_string(), FieldRule::Equals { value })
}

fn captured(field: &str, key: &str) -> (String, FieldRule) {
    (
        field.to_string(),
        FieldRule::Captured {
            key: key.to_string(),
        },
    )
}
